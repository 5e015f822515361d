//! Raw config validation rules (C001–C012).
//!
//! Works on a loosely-typed `serde_json::Value` so a single pass can report
//! every problem at once instead of stopping at the first serde error.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::signature::{Signature, SolType};
use super::types::*;
use crate::error::{ConfigError, ConfigViolation};

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("static regex"));

static PRAGMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\^~><=]{0,2}\s*0\.\d+\.\d+(\s+[<>=]{1,2}\s*0\.\d+\.\d+)?$").expect("static regex"));

/// Declared by the shared prelude of every skeleton.
const PRELUDE_NAMES: &[&str] = &["AbstractReactive", "IReactive", "IPayer", "ISubscriptionService"];

/// Names solc refuses as a contract identifier.
const SOLIDITY_KEYWORDS: &[&str] = &[
    "abstract", "address", "after", "alias", "anonymous", "apply", "as", "assembly", "auto",
    "bool", "break", "byte", "bytes", "calldata", "case", "catch", "constant", "constructor",
    "continue", "contract", "copyof", "days", "default", "define", "delete", "do", "else", "emit",
    "enum", "ether", "event", "external", "fallback", "false", "final", "finney", "for",
    "function", "gwei", "hours", "if", "immutable", "implements", "import", "in", "indexed",
    "inline", "int", "interface", "internal", "is", "let", "library", "macro", "mapping", "match",
    "memory", "minutes", "modifier", "mutable", "new", "null", "of", "override", "partial",
    "payable", "pragma", "private", "promise", "public", "pure", "receive", "reference",
    "relocatable", "return", "returns", "revert", "sealed", "seconds", "sizeof", "static",
    "storage", "string", "struct", "super", "supports", "switch", "szabo", "this", "throw", "true",
    "try", "type", "typedef", "typeof", "uint", "unchecked", "unicode", "using", "var", "view",
    "virtual", "weeks", "wei", "while", "years",
];

/// Validate a raw automation config. Returns all violations found.
pub fn validate(raw: &Value) -> Result<AutomationConfig, ConfigError> {
    let mut errors = Vec::new();

    let Some(obj) = raw.as_object() else {
        return Err(ConfigError {
            violations: vec![ConfigViolation::new(
                "C011",
                "$",
                "automation config must be a JSON object",
            )],
        });
    };

    let contract_name = c009_contract_name(obj, &mut errors);
    let pairs = c001_pairs(obj, &mut errors);
    let origin_chain_id = c006_chain_id(obj, "originChainId", &mut errors);
    let destination_chain_id = c006_chain_id(obj, "destinationChainId", &mut errors);
    let origin_contract = c005_address(obj, "originContract", true, &mut errors);
    let destination_contract = c005_address(obj, "destinationContract", true, &mut errors);
    let owner_address = c005_address(obj, "ownerAddress", false, &mut errors);
    let is_pausable = c011_bool(obj, "isPausable", &mut errors);
    let gas_limit = c010_gas_limit(obj, &mut errors);
    let pragma = c011_pragma(obj, &mut errors);

    if !errors.is_empty() {
        return Err(ConfigError { violations: errors });
    }

    match (
        origin_chain_id,
        destination_chain_id,
        origin_contract,
        destination_contract,
    ) {
        (Some(origin_chain_id), Some(destination_chain_id), Some(origin), Some(destination)) => {
            Ok(AutomationConfig {
                contract_name,
                pairs,
                origin_chain_id,
                destination_chain_id,
                origin_contract: origin,
                destination_contract: destination,
                owner_address,
                is_pausable,
                gas_limit,
                pragma,
            })
        }
        // Every `None` above has already pushed a violation.
        _ => Err(ConfigError { violations: errors }),
    }
}

/// Parse a JSON string and validate it.
pub fn validate_json(json: &str) -> Result<AutomationConfig, ConfigError> {
    let raw: Value = serde_json::from_str(json).map_err(ConfigError::unparseable)?;
    validate(&raw)
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// Look a field up by its camelCase name, falling back to snake_case.
fn field<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    obj.get(name)
        .or_else(|| obj.get(&to_snake_case(name)))
        .filter(|v| !v.is_null())
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn describe(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

fn c001_pairs(obj: &Map<String, Value>, errors: &mut Vec<ConfigViolation>) -> Vec<EventFunctionPair> {
    if let Some(pairs) = field(obj, "pairs") {
        let Some(items) = pairs.as_array() else {
            errors.push(ConfigViolation::new(
                "C011",
                "pairs",
                format!("expected an array of event/function pairs, found {}", describe(pairs)),
            ));
            return Vec::new();
        };
        if items.is_empty() {
            errors.push(ConfigViolation::new(
                "C012",
                "pairs",
                "at least one event/function pair is required",
            ));
            return Vec::new();
        }
        return items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                let path = format!("pairs[{}]", i);
                match item.as_object() {
                    Some(pair) => validate_pair(pair, &path, errors),
                    None => {
                        errors.push(ConfigViolation::new(
                            "C011",
                            path,
                            format!("expected an object, found {}", describe(item)),
                        ));
                        None
                    }
                }
            })
            .collect();
    }

    // Single-pair shorthand: `event` / `function` at the top level.
    if field(obj, "event").is_some() || field(obj, "function").is_some() {
        return validate_pair(obj, "$", errors).into_iter().collect();
    }

    errors.push(ConfigViolation::new(
        "C001",
        "pairs",
        "missing required field: provide `pairs` or a single `event`/`function`",
    ));
    Vec::new()
}

fn validate_pair(
    pair: &Map<String, Value>,
    path: &str,
    errors: &mut Vec<ConfigViolation>,
) -> Option<EventFunctionPair> {
    let join = |name: &str| {
        if path == "$" {
            name.to_string()
        } else {
            format!("{}.{}", path, name)
        }
    };

    let event_raw = required_string(pair, &["event", "eventSignature"], &join("event"), errors);
    let function_raw =
        required_string(pair, &["function", "functionSignature"], &join("function"), errors);

    let event = event_raw.and_then(|raw| match Signature::parse(raw) {
        Ok(sig) => Some(sig),
        Err(e) => {
            errors.push(ConfigViolation::new(
                "C002",
                join("event"),
                format!("malformed event signature '{}': {}", raw, e),
            ));
            None
        }
    });

    let function = function_raw.and_then(|raw| match Signature::parse(raw) {
        Ok(sig) if sig.params[0] != SolType::Address => {
            errors.push(ConfigViolation::new(
                "C004",
                join("function"),
                format!(
                    "first parameter of '{}' must be `address` (the callback target), found `{}`",
                    sig.canonical(),
                    sig.params[0]
                ),
            ));
            None
        }
        Ok(sig) => Some(sig),
        Err(e) => {
            errors.push(ConfigViolation::new(
                "C003",
                join("function"),
                format!("malformed function signature '{}': {}", raw, e),
            ));
            None
        }
    });

    let topic0 = match field(pair, "topic0") {
        None => None,
        Some(Value::String(s)) => match Topic::parse(s.trim()) {
            Some(t) => Some(t),
            None => {
                errors.push(ConfigViolation::new(
                    "C007",
                    join("topic0"),
                    format!("topic0 '{}' must be 0x followed by 64 hex digits", s),
                ));
                None
            }
        },
        Some(other) => {
            errors.push(ConfigViolation::new(
                "C007",
                join("topic0"),
                format!("topic0 must be a hex string, found {}", describe(other)),
            ));
            None
        }
    };

    let mapping = c008_mapping(pair, function.as_ref(), &join("mapping"), errors);

    Some(EventFunctionPair {
        event: event?,
        function: function?,
        topic0,
        mapping: mapping?,
    })
}

fn required_string<'a>(
    obj: &'a Map<String, Value>,
    names: &[&str],
    path: &str,
    errors: &mut Vec<ConfigViolation>,
) -> Option<&'a str> {
    let value = names.iter().find_map(|n| field(obj, n));
    match value {
        None => {
            errors.push(ConfigViolation::new(
                "C001",
                path,
                format!("missing required field `{}`", names[0]),
            ));
            None
        }
        Some(Value::String(s)) => Some(s.as_str()),
        Some(other) => {
            errors.push(ConfigViolation::new(
                "C011",
                path,
                format!("expected a string, found {}", describe(other)),
            ));
            None
        }
    }
}

fn c008_mapping(
    pair: &Map<String, Value>,
    function: Option<&Signature>,
    path: &str,
    errors: &mut Vec<ConfigViolation>,
) -> Option<BTreeMap<usize, LogSource>> {
    let Some(raw) = field(pair, "mapping") else {
        return Some(BTreeMap::new());
    };
    let Some(entries) = raw.as_object() else {
        errors.push(ConfigViolation::new(
            "C008",
            path,
            format!("mapping must be an object, found {}", describe(raw)),
        ));
        return None;
    };

    let before = errors.len();
    let mut mapping = BTreeMap::new();
    for (key, value) in entries {
        let entry_path = format!("{}.{}", path, key);

        let Ok(position) = key.trim().parse::<usize>() else {
            errors.push(ConfigViolation::new(
                "C008",
                entry_path,
                format!("mapping key '{}' must be a parameter position", key),
            ));
            continue;
        };

        let Some(source) = value.as_str().and_then(LogSource::parse) else {
            errors.push(ConfigViolation::new(
                "C008",
                entry_path,
                format!(
                    "unknown log source {} (expected topic_1..topic_3, chain_id, contract, \
                     block_number, tx_hash, log_index, data or data[N])",
                    value
                ),
            ));
            continue;
        };

        if let LogSource::DataWord(n) = source {
            if n > MAX_DATA_WORD {
                errors.push(ConfigViolation::new(
                    "C008",
                    entry_path,
                    format!("payload word {} is out of range (at most data[{}])", n, MAX_DATA_WORD),
                ));
                continue;
            }
        }

        // Without a parsed function the position/type checks cannot run;
        // the function itself already has a violation.
        if let Some(function) = function {
            if position == 0 {
                errors.push(ConfigViolation::new(
                    "C008",
                    entry_path,
                    "parameter 0 is the callback target and cannot be mapped",
                ));
                continue;
            }
            let Some(&ty) = function.params.get(position) else {
                errors.push(ConfigViolation::new(
                    "C008",
                    entry_path,
                    format!(
                        "'{}' has no parameter at position {}",
                        function.canonical(),
                        position
                    ),
                ));
                continue;
            };
            if !source.can_bind(ty) {
                errors.push(ConfigViolation::new(
                    "C008",
                    entry_path,
                    format!("cannot bind a `{}` parameter from {}", ty, source),
                ));
                continue;
            }
        }

        mapping.insert(position, source);
    }

    (errors.len() == before).then_some(mapping)
}

fn c005_address(
    obj: &Map<String, Value>,
    name: &str,
    required: bool,
    errors: &mut Vec<ConfigViolation>,
) -> Option<Address> {
    match field(obj, name) {
        None => {
            if required {
                errors.push(ConfigViolation::new(
                    "C001",
                    name,
                    format!("missing required field `{}`", name),
                ));
            }
            None
        }
        Some(Value::String(s)) => {
            let parsed = Address::parse(s.trim());
            if parsed.is_none() {
                errors.push(ConfigViolation::new(
                    "C005",
                    name,
                    format!("'{}' is not an address (expected 0x followed by 40 hex digits)", s),
                ));
            }
            parsed
        }
        Some(other) => {
            errors.push(ConfigViolation::new(
                "C005",
                name,
                format!("expected an address string, found {}", describe(other)),
            ));
            None
        }
    }
}

fn c006_chain_id(obj: &Map<String, Value>, name: &str, errors: &mut Vec<ConfigViolation>) -> Option<u64> {
    let Some(value) = field(obj, name) else {
        errors.push(ConfigViolation::new(
            "C001",
            name,
            format!("missing required field `{}`", name),
        ));
        return None;
    };

    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        // Form inputs often arrive as decimal strings.
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    match parsed {
        Some(0) => {
            errors.push(ConfigViolation::new(
                "C006",
                name,
                "chain id must be a positive integer, found 0",
            ));
            None
        }
        Some(id) => Some(id),
        None => {
            errors.push(ConfigViolation::new(
                "C006",
                name,
                format!("chain id must be an unsigned integer, found {}", value),
            ));
            None
        }
    }
}

fn c009_contract_name(obj: &Map<String, Value>, errors: &mut Vec<ConfigViolation>) -> String {
    match field(obj, "contractName") {
        None => DEFAULT_CONTRACT_NAME.to_string(),
        Some(Value::String(s)) if PRELUDE_NAMES.contains(&s.as_str()) => {
            errors.push(ConfigViolation::new(
                "C009",
                "contractName",
                format!("contract name '{}' collides with a declaration in the generated prelude", s),
            ));
            DEFAULT_CONTRACT_NAME.to_string()
        }
        Some(Value::String(s)) if is_reserved_word(s) => {
            errors.push(ConfigViolation::new(
                "C009",
                "contractName",
                format!("contract name '{}' is a reserved Solidity keyword", s),
            ));
            DEFAULT_CONTRACT_NAME.to_string()
        }
        Some(Value::String(s)) if IDENTIFIER_RE.is_match(s) => s.clone(),
        Some(other) => {
            errors.push(ConfigViolation::new(
                "C009",
                "contractName",
                format!("contract name {} is not a valid identifier", other),
            ));
            DEFAULT_CONTRACT_NAME.to_string()
        }
    }
}

/// Keywords plus the sized integer and bytes type names.
fn is_reserved_word(name: &str) -> bool {
    if SOLIDITY_KEYWORDS.contains(&name) {
        return true;
    }
    let sized = |prefix: &str, max: u32, step: u32| {
        name.strip_prefix(prefix)
            .and_then(|bits| bits.parse::<u32>().ok())
            .is_some_and(|n| (1..=max).contains(&n) && n % step == 0 && !name[prefix.len()..].starts_with('0'))
    };
    sized("uint", 256, 8) || sized("int", 256, 8) || sized("bytes", 32, 1)
}

fn c010_gas_limit(obj: &Map<String, Value>, errors: &mut Vec<ConfigViolation>) -> u64 {
    let Some(value) = field(obj, "gasLimit") else {
        return DEFAULT_GAS_LIMIT;
    };
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    // Range is the structural validator's call, not ours.
    parsed.unwrap_or_else(|| {
        errors.push(ConfigViolation::new(
            "C010",
            "gasLimit",
            format!("gas limit must be an unsigned integer, found {}", value),
        ));
        DEFAULT_GAS_LIMIT
    })
}

fn c011_bool(obj: &Map<String, Value>, name: &str, errors: &mut Vec<ConfigViolation>) -> bool {
    match field(obj, name) {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            errors.push(ConfigViolation::new(
                "C011",
                name,
                format!("expected a boolean, found {}", describe(other)),
            ));
            false
        }
    }
}

fn c011_pragma(obj: &Map<String, Value>, errors: &mut Vec<ConfigViolation>) -> String {
    match field(obj, "pragma") {
        None => DEFAULT_PRAGMA.to_string(),
        Some(Value::String(s)) if PRAGMA_RE.is_match(s.trim()) => s.trim().to_string(),
        Some(other) => {
            errors.push(ConfigViolation::new(
                "C011",
                "pragma",
                format!("unrecognized compiler version constraint {}", other),
            ));
            DEFAULT_PRAGMA.to_string()
        }
    }
}
