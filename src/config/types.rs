//! Validated automation config types.
//!
//! Everything in here has already passed `config::validate`; the generator
//! consumes these types without re-checking shapes.

use std::collections::BTreeMap;

use serde::Serialize;

use super::signature::{Signature, SolType};

pub const DEFAULT_CONTRACT_NAME: &str = "ReactiveAutomation";
pub const DEFAULT_GAS_LIMIT: u64 = 1_000_000;
pub const DEFAULT_PRAGMA: &str = "^0.8.20";
/// Highest payload word a mapping may address with `data[N]`.
pub const MAX_DATA_WORD: usize = u16::MAX as usize;

// =============================================================================
// TOP-LEVEL CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationConfig {
    pub contract_name: String,
    /// Input order is significant: the first matching pair wins in `react`.
    pub pairs: Vec<EventFunctionPair>,
    pub origin_chain_id: u64,
    pub destination_chain_id: u64,
    pub origin_contract: Address,
    pub destination_contract: Address,
    pub owner_address: Option<Address>,
    pub is_pausable: bool,
    pub gas_limit: u64,
    pub pragma: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFunctionPair {
    pub event: Signature,
    pub function: Signature,
    /// User-supplied topic-0; computed from `event` when absent.
    pub topic0: Option<Topic>,
    /// Function parameter position → log field feeding it.
    pub mapping: BTreeMap<usize, LogSource>,
}

// =============================================================================
// ADDRESS
// =============================================================================

/// A 20-byte account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// Parse `0x` followed by exactly 40 hex digits (any case).
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix("0x")?;
        if digits.len() != 40 {
            return None;
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes).ok()?;
        Some(Address(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

/// Lowercase `0x`-prefixed form.
impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// =============================================================================
// TOPIC
// =============================================================================

/// A 32-byte event topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Topic(pub [u8; 32]);

impl Topic {
    /// Parse `0x` followed by exactly 64 hex digits (any case).
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix("0x")?;
        if digits.len() != 64 {
            return None;
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes).ok()?;
        Some(Topic(bytes))
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Topic {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// =============================================================================
// PARAMETER MAPPING
// =============================================================================

/// A field of the incoming log record that can feed a callback parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum LogSource {
    /// Indexed topic 1..=3.
    Topic(u8),
    ChainId,
    Contract,
    BlockNumber,
    TxHash,
    LogIndex,
    /// The raw, unindexed event payload.
    Data,
    /// The N-th 32-byte word of the payload.
    DataWord(usize),
}

impl LogSource {
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let source = match s {
            "topic_1" => LogSource::Topic(1),
            "topic_2" => LogSource::Topic(2),
            "topic_3" => LogSource::Topic(3),
            "chain_id" => LogSource::ChainId,
            "contract" => LogSource::Contract,
            "block_number" => LogSource::BlockNumber,
            "tx_hash" => LogSource::TxHash,
            "log_index" => LogSource::LogIndex,
            "data" => LogSource::Data,
            _ => {
                let index = s.strip_prefix("data[")?.strip_suffix(']')?;
                LogSource::DataWord(index.parse().ok()?)
            }
        };
        Some(source)
    }

    /// Whether a parameter of type `ty` can be bound from this source.
    pub fn can_bind(&self, ty: SolType) -> bool {
        match self {
            LogSource::Data => matches!(ty, SolType::Bytes | SolType::String),
            _ => ty != SolType::String,
        }
    }
}

impl std::fmt::Display for LogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogSource::Topic(i) => write!(f, "topic_{}", i),
            LogSource::ChainId => write!(f, "chain_id"),
            LogSource::Contract => write!(f, "contract"),
            LogSource::BlockNumber => write!(f, "block_number"),
            LogSource::TxHash => write!(f, "tx_hash"),
            LogSource::LogIndex => write!(f, "log_index"),
            LogSource::Data => write!(f, "data"),
            LogSource::DataWord(n) => write!(f, "data[{}]", n),
        }
    }
}

impl From<LogSource> for String {
    fn from(source: LogSource) -> Self {
        source.to_string()
    }
}
