//! Structural findings and the per-call report.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One rule outcome, tagged with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuralFinding {
    pub code: &'static str,
    pub rule: &'static str,
    pub severity: Severity,
    pub message: String,
}

impl StructuralFinding {
    pub fn error(code: &'static str, rule: &'static str, message: impl Into<String>) -> Self {
        StructuralFinding {
            code,
            rule,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(code: &'static str, rule: &'static str, message: impl Into<String>) -> Self {
        StructuralFinding {
            code,
            rule,
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StructuralFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}:{}] {}", self.code, self.rule, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<StructuralFinding>,
    pub warnings: Vec<StructuralFinding>,
}

impl ValidationReport {
    pub fn from_findings(findings: Vec<StructuralFinding>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = findings
            .into_iter()
            .partition(|f| f.severity == Severity::Error);
        ValidationReport {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.errors
            .iter()
            .chain(&self.warnings)
            .any(|f| f.code == code)
    }

    /// Errors first, then warnings.
    pub fn findings(&self) -> impl Iterator<Item = &StructuralFinding> {
        self.errors.iter().chain(&self.warnings)
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} error(s), {} warning(s)",
            self.errors.len(),
            self.warnings.len()
        )?;
        for finding in self.findings() {
            write!(f, "\n  {}", finding)?;
        }
        Ok(())
    }
}
