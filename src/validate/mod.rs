//! Structural validation phase.
//!
//! Runs the fixed rule table over any source text, generated or hand-edited,
//! without compiling it.

pub mod report;
pub mod rules;

pub use report::{Severity, StructuralFinding, ValidationReport};
pub use rules::{RuleContext, StructuralRule, RULES};

/// Check `source` with the default rule context.
pub fn check(source: &str) -> ValidationReport {
    check_with(source, &RuleContext::default())
}

/// Run every rule in `RULES` and collect all findings.
pub fn check_with(source: &str, ctx: &RuleContext) -> ValidationReport {
    let stripped = rules::strip_comments(source);
    let findings: Vec<StructuralFinding> = RULES
        .iter()
        .flat_map(|rule| (rule.check)(&stripped, ctx))
        .collect();

    let report = ValidationReport::from_findings(findings);
    tracing::debug!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "structural check finished"
    );
    report
}
