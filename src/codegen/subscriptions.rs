//! Subscription statements, one per pair.

use super::PlannedPair;
use super::writer::CodeWriter;

/// Unused topic slots get `REACTIVE_IGNORE` rather than zero, since zero is
/// a legitimate topic value.
pub fn emit_subscriptions(pairs: &[PlannedPair<'_>], method: &str) -> String {
    let mut w = CodeWriter::at_indent(2);
    for planned in pairs {
        w.line(&format!(
            "SERVICE.{}(ORIGIN_CHAIN_ID, ORIGIN_CONTRACT, {}, REACTIVE_IGNORE, REACTIVE_IGNORE, REACTIVE_IGNORE);",
            method, planned.constant
        ));
    }
    w.finish_fragment()
}
