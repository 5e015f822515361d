//! Stage-tagged error types used across the pipeline.

use serde::Serialize;

use crate::compile::CompilerDiagnostic;
use crate::validate::ValidationReport;

/// The pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Config,
    Generation,
    Structural,
    Compilation,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Config => write!(f, "Config"),
            Stage::Generation => write!(f, "Generation"),
            Stage::Structural => write!(f, "Structural"),
            Stage::Compilation => write!(f, "Compilation"),
        }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// One problem found in a raw automation config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigViolation {
    pub code: &'static str,
    /// JSON path of the offending field, e.g. `pairs[1].event`.
    pub field: String,
    pub message: String,
}

impl ConfigViolation {
    pub fn new(code: &'static str, field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigViolation {
            code,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.field, self.message)
    }
}

/// Every violation found in a config, never just the first one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid automation config ({} violation(s)){}", .violations.len(), list_violations(.violations))]
pub struct ConfigError {
    pub violations: Vec<ConfigViolation>,
}

impl ConfigError {
    pub fn unparseable(err: serde_json::Error) -> Self {
        ConfigError {
            violations: vec![ConfigViolation::new(
                "C011",
                "$",
                format!("failed to parse automation config JSON: {}", err),
            )],
        }
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.violations.iter().any(|v| v.code == code)
    }
}

fn list_violations(violations: &[ConfigViolation]) -> String {
    violations.iter().map(|v| format!("\n  {}", v)).collect()
}

// =============================================================================
// GENERATION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("automation config has no event/function pairs")]
    NoPairs,

    #[error(
        "pairs {first} and {second} share topic-0 {topic}; the reaction branch for pair {second} would never run"
    )]
    DuplicateTopic {
        topic: String,
        first: usize,
        second: usize,
    },

    #[error("pair {pair}: cannot bind parameter {position} ({ty}) from {source_name}")]
    UnbindableParameter {
        pair: usize,
        position: usize,
        ty: String,
        source_name: String,
    },

    #[error("template '{template}' references placeholder {{{{{placeholder}}}}} with no supplied value")]
    MissingPlaceholder {
        template: &'static str,
        placeholder: String,
    },
}

impl GenerationError {
    pub fn code(&self) -> &'static str {
        match self {
            GenerationError::NoPairs => "G001",
            GenerationError::DuplicateTopic { .. } => "G002",
            GenerationError::UnbindableParameter { .. } => "G003",
            GenerationError::MissingPlaceholder { .. } => "G004",
        }
    }
}

// =============================================================================
// COMPILATION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompilationErrorKind {
    /// The compiler reported at least one diagnostic with severity `error`.
    Diagnostics,
    /// No error diagnostics, but the requested contract was not in the output.
    MissingContract,
    /// The compiler did not finish within the allotted time.
    Timeout,
    /// The toolchain could not be launched or produced unreadable output.
    Toolchain,
}

impl std::fmt::Display for CompilationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompilationErrorKind::Diagnostics => write!(f, "diagnostics"),
            CompilationErrorKind::MissingContract => write!(f, "missing-contract"),
            CompilationErrorKind::Timeout => write!(f, "timeout"),
            CompilationErrorKind::Toolchain => write!(f, "toolchain"),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("compilation failed ({kind}): {message}")]
pub struct CompilationError {
    pub kind: CompilationErrorKind,
    pub message: String,
    /// Everything the compiler reported, warnings included.
    pub diagnostics: Vec<CompilerDiagnostic>,
}

impl CompilationError {
    pub fn diagnostics(diagnostics: Vec<CompilerDiagnostic>) -> Self {
        let errors = diagnostics.iter().filter(|d| d.is_error()).count();
        CompilationError {
            kind: CompilationErrorKind::Diagnostics,
            message: format!("compiler reported {} error(s)", errors),
            diagnostics,
        }
    }

    pub fn missing_contract(
        contract: &str,
        source_unit: &str,
        diagnostics: Vec<CompilerDiagnostic>,
    ) -> Self {
        CompilationError {
            kind: CompilationErrorKind::MissingContract,
            message: format!(
                "target contract '{}' not found in output for source unit '{}'",
                contract, source_unit
            ),
            diagnostics,
        }
    }

    pub fn timeout(limit_ms: u128) -> Self {
        CompilationError {
            kind: CompilationErrorKind::Timeout,
            message: format!("compiler did not finish within {}ms", limit_ms),
            diagnostics: Vec::new(),
        }
    }

    pub fn toolchain(message: impl Into<String>) -> Self {
        CompilationError {
            kind: CompilationErrorKind::Toolchain,
            message: message.into(),
            diagnostics: Vec::new(),
        }
    }

    /// Raw compiler text for every diagnostic, for debugging.
    pub fn raw_diagnostics(&self) -> String {
        self.diagnostics
            .iter()
            .map(|d| d.raw_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// =============================================================================
// PIPELINE
// =============================================================================

/// A failure from any stage, tagged with where it came from.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    #[error("[Config] {0}")]
    Config(#[from] ConfigError),
    #[error("[Generation:{}] {}", .0.code(), .0)]
    Generation(#[from] GenerationError),
    #[error("[Structural] {0}")]
    Structural(ValidationReport),
    #[error("[Compilation] {0}")]
    Compilation(#[from] CompilationError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Config(_) => Stage::Config,
            PipelineError::Generation(_) => Stage::Generation,
            PipelineError::Structural(_) => Stage::Structural,
            PipelineError::Compilation(_) => Stage::Compilation,
        }
    }
}
