//! Contract-level declarations: chain ids, addresses, topics, state flags.

use super::PlannedPair;
use super::topic::checksum_address;
use super::writer::CodeWriter;
use crate::config::AutomationConfig;

pub fn emit_chain_constants(config: &AutomationConfig) -> String {
    let mut w = CodeWriter::at_indent(1);
    w.line(&format!(
        "uint256 private constant ORIGIN_CHAIN_ID = {};",
        config.origin_chain_id
    ));
    w.line(&format!(
        "uint256 private constant DESTINATION_CHAIN_ID = {};",
        config.destination_chain_id
    ));
    w.finish_fragment()
}

pub fn emit_address_constants(config: &AutomationConfig) -> String {
    let mut w = CodeWriter::at_indent(1);
    w.line(&format!(
        "address private constant ORIGIN_CONTRACT = {};",
        checksum_address(&config.origin_contract)
    ));
    w.line(&format!(
        "address private constant DESTINATION_CONTRACT = {};",
        checksum_address(&config.destination_contract)
    ));
    w.finish_fragment()
}

/// The owner is baked in as a constant so it can never be reassigned.
pub fn emit_owner_constant(config: &AutomationConfig) -> String {
    let Some(owner) = &config.owner_address else {
        return String::new();
    };
    let mut w = CodeWriter::at_indent(1);
    w.line(&format!(
        "address private constant OWNER = {};",
        checksum_address(owner)
    ));
    w.finish_fragment()
}

pub fn emit_event_constants(pairs: &[PlannedPair<'_>]) -> String {
    let mut w = CodeWriter::at_indent(1);
    for (i, planned) in pairs.iter().enumerate() {
        if i > 0 {
            w.blank();
        }
        w.line(&format!("// {}", planned.pair.event.canonical()));
        w.line(&format!(
            "uint256 private constant {} = {};",
            planned.constant, planned.topic
        ));
    }
    w.finish_fragment()
}

pub fn emit_state_variables() -> String {
    let mut w = CodeWriter::at_indent(1);
    w.line("bool public triggered;");
    w.line("bool public done;");
    w.finish_fragment()
}

pub fn emit_constructor_logic() -> String {
    let mut w = CodeWriter::at_indent(2);
    w.line("triggered = false;");
    w.line("done = false;");
    w.finish_fragment()
}
