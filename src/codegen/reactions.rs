//! The body of `react`: optional guard plus one `if`/`else if` branch per pair.
//!
//! Each branch ABI-encodes a call to the pair's target function and emits a
//! `Callback` toward the destination chain.

use super::PlannedPair;
use super::writer::CodeWriter;
use crate::config::{AutomationConfig, LogSource, SolType};
use crate::error::GenerationError;

/// Guard statements placed ahead of the branches.
pub fn emit_react_guard(config: &AutomationConfig) -> String {
    let mut w = CodeWriter::at_indent(2);
    if config.owner_address.is_some() {
        w.line("require(msg.sender == OWNER || log._contract == OWNER, \"Unauthorized trigger\");");
    }
    if config.is_pausable {
        w.line("require(!done, \"Reaction already completed\");");
    }
    w.finish_fragment()
}

/// Branches are chained with `else if` in pair order, so the first match wins.
pub fn emit_react_logic(
    pairs: &[PlannedPair<'_>],
    config: &AutomationConfig,
) -> Result<String, GenerationError> {
    let mut w = CodeWriter::at_indent(2);

    for (i, planned) in pairs.iter().enumerate() {
        let cond = format!("log.topic_0 == {}", planned.constant);
        if i == 0 {
            w.block_open(&format!("if ({})", cond));
        } else {
            w.block_else_if(&cond);
        }

        let args = callback_arguments(planned)?;
        w.line("bytes memory payload = abi.encodeWithSignature(");
        w.indent();
        w.line(&format!("\"{}\",", planned.pair.function.canonical()));
        let last = args.len() - 1;
        for (j, arg) in args.iter().enumerate() {
            if j == last {
                w.line(arg);
            } else {
                w.line(&format!("{},", arg));
            }
        }
        w.dedent();
        w.line(");");

        if config.is_pausable {
            w.line("triggered = true;");
        }
        w.line("emit Callback(DESTINATION_CHAIN_ID, DESTINATION_CONTRACT, CALLBACK_GAS_LIMIT, payload);");
        if config.is_pausable {
            w.line("done = true;");
        }
    }
    if !pairs.is_empty() {
        w.block_close();
    }

    Ok(w.finish_fragment())
}

/// One Solidity expression per function parameter.
///
/// Position 0 is the callback target; the reactive runtime overwrites it with
/// its own id, so it is always `address(0)`.
fn callback_arguments(planned: &PlannedPair<'_>) -> Result<Vec<String>, GenerationError> {
    let params = &planned.pair.function.params;
    let mut args = Vec::with_capacity(params.len());
    args.push("address(0)".to_string());

    for (position, &ty) in params.iter().enumerate().skip(1) {
        let source = planned
            .pair
            .mapping
            .get(&position)
            .copied()
            .or_else(|| default_source(position, ty));

        let expr = match source {
            Some(source) => bind(source, ty).ok_or_else(|| GenerationError::UnbindableParameter {
                pair: planned.index,
                position,
                ty: ty.to_string(),
                source_name: source.to_string(),
            })?,
            None => zero_value(ty),
        };
        args.push(expr);
    }

    Ok(args)
}

/// Unmapped parameters 1..=3 follow the indexed topics of the same position.
fn default_source(position: usize, ty: SolType) -> Option<LogSource> {
    match position {
        1..=3 if !ty.is_dynamic() => Some(LogSource::Topic(position as u8)),
        _ => None,
    }
}

fn bind(source: LogSource, ty: SolType) -> Option<String> {
    match (source, ty) {
        (LogSource::Data, SolType::Bytes) => Some("log.data".into()),
        (LogSource::Data, SolType::String) => Some("string(log.data)".into()),
        (LogSource::Data, _) | (_, SolType::String) => None,
        (LogSource::Contract, SolType::Address) => Some("log._contract".into()),
        (source, ty) => Some(convert_word(&word_expr(source)?, ty)),
    }
}

/// `uint256` expression reading `source` from the log record. `None` when a
/// payload word lies past the addressable range.
fn word_expr(source: LogSource) -> Option<String> {
    let expr = match source {
        LogSource::Topic(i) => format!("log.topic_{}", i),
        LogSource::ChainId => "log.chain_id".into(),
        LogSource::Contract => "uint256(uint160(log._contract))".into(),
        LogSource::BlockNumber => "log.block_number".into(),
        LogSource::TxHash => "log.tx_hash".into(),
        LogSource::LogIndex => "log.log_index".into(),
        LogSource::DataWord(n) => {
            let start = n.checked_mul(32)?;
            let end = start.checked_add(32)?;
            format!("uint256(bytes32(log.data[{}:{}]))", start, end)
        }
        LogSource::Data => "uint256(bytes32(log.data[0:32]))".into(),
    };
    Some(expr)
}

fn convert_word(word: &str, ty: SolType) -> String {
    match ty {
        SolType::Uint256 => word.to_string(),
        SolType::Address => format!("address(uint160({}))", word),
        SolType::Bool => format!("{} != 0", word),
        SolType::Bytes => format!("abi.encodePacked({})", word),
        SolType::String => "string(\"\")".into(),
        SolType::Bytes32
        | SolType::Uint8
        | SolType::Uint16
        | SolType::Uint32
        | SolType::Uint64
        | SolType::Uint128
        | SolType::Uint160
        | SolType::Int256 => format!("{}({})", ty, word),
    }
}

fn zero_value(ty: SolType) -> String {
    match ty {
        SolType::Bool => "false".into(),
        SolType::String => "string(\"\")".into(),
        SolType::Bytes => "bytes(\"\")".into(),
        other => format!("{}(0)", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_conversions() {
        assert_eq!(bind(LogSource::Topic(1), SolType::Address).unwrap(), "address(uint160(log.topic_1))");
        assert_eq!(bind(LogSource::Topic(2), SolType::Uint256).unwrap(), "log.topic_2");
        assert_eq!(bind(LogSource::Topic(3), SolType::Bool).unwrap(), "log.topic_3 != 0");
        assert_eq!(bind(LogSource::ChainId, SolType::Uint64).unwrap(), "uint64(log.chain_id)");
        assert_eq!(
            bind(LogSource::DataWord(1), SolType::Bytes32).unwrap(),
            "bytes32(uint256(bytes32(log.data[32:64])))"
        );
    }

    #[test]
    fn special_sources() {
        assert_eq!(bind(LogSource::Contract, SolType::Address).unwrap(), "log._contract");
        assert_eq!(bind(LogSource::Data, SolType::Bytes).unwrap(), "log.data");
        assert_eq!(bind(LogSource::Data, SolType::String).unwrap(), "string(log.data)");
        assert!(bind(LogSource::Data, SolType::Uint256).is_none());
        assert!(bind(LogSource::Topic(1), SolType::String).is_none());
    }

    #[test]
    fn oversized_data_word_does_not_bind() {
        assert!(bind(LogSource::DataWord(usize::MAX), SolType::Uint256).is_none());
        assert!(bind(LogSource::DataWord(usize::MAX / 32), SolType::Uint256).is_none());
    }

    #[test]
    fn defaults_follow_topic_positions() {
        assert_eq!(default_source(1, SolType::Uint256), Some(LogSource::Topic(1)));
        assert_eq!(default_source(3, SolType::Address), Some(LogSource::Topic(3)));
        assert_eq!(default_source(2, SolType::String), None);
        assert_eq!(default_source(4, SolType::Uint256), None);
    }

    #[test]
    fn zero_values_are_typed() {
        assert_eq!(zero_value(SolType::Uint8), "uint8(0)");
        assert_eq!(zero_value(SolType::Address), "address(0)");
        assert_eq!(zero_value(SolType::Bytes), "bytes(\"\")");
        assert_eq!(zero_value(SolType::Bool), "false");
    }
}
