//! Event/function signature grammar: `Identifier(Type(,Type)*)`.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static SIGNATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*\((.*)\)\s*$").expect("static regex")
});

/// Parameter types accepted in event and function signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolType {
    Address,
    Bool,
    String,
    Bytes,
    Bytes32,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uint128,
    Uint160,
    Uint256,
    Int256,
}

impl SolType {
    pub const ALL: [SolType; 13] = [
        SolType::Address,
        SolType::Bool,
        SolType::String,
        SolType::Bytes,
        SolType::Bytes32,
        SolType::Uint8,
        SolType::Uint16,
        SolType::Uint32,
        SolType::Uint64,
        SolType::Uint128,
        SolType::Uint160,
        SolType::Uint256,
        SolType::Int256,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SolType::Address => "address",
            SolType::Bool => "bool",
            SolType::String => "string",
            SolType::Bytes => "bytes",
            SolType::Bytes32 => "bytes32",
            SolType::Uint8 => "uint8",
            SolType::Uint16 => "uint16",
            SolType::Uint32 => "uint32",
            SolType::Uint64 => "uint64",
            SolType::Uint128 => "uint128",
            SolType::Uint160 => "uint160",
            SolType::Uint256 => "uint256",
            SolType::Int256 => "int256",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = match s {
            "uint" => "uint256",
            "int" => "int256",
            other => other,
        };
        SolType::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Dynamically sized in the ABI encoding.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, SolType::String | SolType::Bytes)
    }
}

impl std::fmt::Display for SolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed signature such as `Transfer(address,address,uint256)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub name: String,
    pub params: Vec<SolType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// Not of the form `Name(...)`.
    Shape,
    /// `Name()` with no parameters.
    NoParams,
    /// An empty slot such as `Name(address,,uint256)`.
    EmptyParam(usize),
    /// A type outside the accepted vocabulary.
    UnknownType(String),
}

impl std::fmt::Display for SignatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignatureError::Shape => write!(f, "expected the form Name(type,type,...)"),
            SignatureError::NoParams => write!(f, "at least one parameter type is required"),
            SignatureError::EmptyParam(i) => write!(f, "parameter {} is empty", i),
            SignatureError::UnknownType(t) => write!(
                f,
                "unsupported parameter type '{}' (allowed: {})",
                t,
                SolType::ALL
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

impl Signature {
    pub fn parse(raw: &str) -> Result<Self, SignatureError> {
        let caps = SIGNATURE_RE.captures(raw).ok_or(SignatureError::Shape)?;
        let name = caps[1].to_string();
        let inner = caps[2].trim();
        if inner.is_empty() {
            return Err(SignatureError::NoParams);
        }

        let mut params = Vec::new();
        for (i, part) in inner.split(',').enumerate() {
            let part = part.trim();
            if part.is_empty() {
                return Err(SignatureError::EmptyParam(i));
            }
            let ty = SolType::parse(part)
                .ok_or_else(|| SignatureError::UnknownType(part.to_string()))?;
            params.push(ty);
        }

        Ok(Signature { name, params })
    }

    /// Whitespace-free form used for hashing and `abi.encodeWithSignature`.
    pub fn canonical(&self) -> String {
        format!(
            "{}({})",
            self.name,
            self.params
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(",")
        )
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl Serialize for Signature {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical())
    }
}
