//! Compilation adapter: source text → ABI + bytecode through an external
//! Solidity compiler.
//!
//! The compiler itself sits behind `SolidityCompiler` so tests and hosts can
//! substitute it; `SolcCompiler` drives a local `solc` binary.

mod cache;
#[cfg(not(target_arch = "wasm32"))]
mod solc;
pub mod standard_json;

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::error::CompilationError;
use crate::options::PipelineOptions;

pub use cache::CachingCompiler;
#[cfg(not(target_arch = "wasm32"))]
pub use solc::SolcCompiler;
pub use standard_json::{CompilerDiagnostic, CompilerInput, CompilerOutput, DiagnosticSeverity};

/// An external Solidity compiler speaking standard JSON.
pub trait SolidityCompiler: Send + Sync {
    /// Version string identifying the compiler build.
    fn version(&self) -> Result<String, CompilationError>;

    /// Compile `input`, giving up after `timeout`.
    fn compile(
        &self,
        input: &CompilerInput,
        timeout: Duration,
    ) -> Result<CompilerOutput, CompilationError>;
}

impl<C: SolidityCompiler + ?Sized> SolidityCompiler for &C {
    fn version(&self) -> Result<String, CompilationError> {
        (**self).version()
    }

    fn compile(
        &self,
        input: &CompilerInput,
        timeout: Duration,
    ) -> Result<CompilerOutput, CompilationError> {
        (**self).compile(input, timeout)
    }
}

/// ABI and creation bytecode, exactly as the compiler produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompilationArtifact {
    pub abi: Value,
    pub bytecode: String,
}

/// A successful compilation plus any non-error diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledContract {
    pub artifact: CompilationArtifact,
    pub warnings: Vec<CompilerDiagnostic>,
}

/// Compile `source` and extract `contract_name` from the output.
///
/// Any error-severity diagnostic fails the call with the full diagnostic list.
/// A missing target contract fails even when the compiler reported no errors.
pub fn compile(
    compiler: &dyn SolidityCompiler,
    source: &str,
    contract_name: &str,
    options: &PipelineOptions,
) -> Result<CompiledContract, CompilationError> {
    let input = CompilerInput::single_source(source, options);
    tracing::debug!(
        contract = contract_name,
        source_unit = %options.source_unit_name,
        timeout_ms = options.compiler_timeout_ms,
        "invoking compiler"
    );

    let output = compiler.compile(&input, options.timeout())?;
    extract(output, &options.source_unit_name, contract_name)
}

fn extract(
    output: CompilerOutput,
    source_unit: &str,
    contract_name: &str,
) -> Result<CompiledContract, CompilationError> {
    if output.errors.iter().any(CompilerDiagnostic::is_error) {
        return Err(CompilationError::diagnostics(output.errors));
    }

    let Some(contract) = output.contract(source_unit, contract_name) else {
        return Err(CompilationError::missing_contract(
            contract_name,
            source_unit,
            output.errors,
        ));
    };

    let artifact = CompilationArtifact {
        abi: contract.abi.clone(),
        bytecode: contract.bytecode().unwrap_or_default().to_string(),
    };
    for warning in &output.errors {
        tracing::warn!(diagnostic = %warning.raw_text(), "compiler warning");
    }

    Ok(CompiledContract {
        artifact,
        warnings: output.errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompilationErrorKind;

    fn output(json: &str) -> CompilerOutput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn warnings_do_not_fail() {
        let result = extract(
            output(
                r#"{
                    "errors": [{"severity": "warning", "type": "Warning", "message": "unused"}],
                    "contracts": {"Contract.sol": {"A": {"abi": [], "evm": {"bytecode": {"object": "60806040"}}}}}
                }"#,
            ),
            "Contract.sol",
            "A",
        )
        .unwrap();
        assert_eq!(result.artifact.bytecode, "60806040");
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn any_error_fails_with_every_diagnostic() {
        let err = extract(
            output(
                r#"{
                    "errors": [
                        {"severity": "warning", "type": "Warning", "message": "unused"},
                        {"severity": "error", "type": "TypeError", "message": "bad"}
                    ],
                    "contracts": {"Contract.sol": {"A": {"abi": []}}}
                }"#,
            ),
            "Contract.sol",
            "A",
        )
        .unwrap_err();
        assert_eq!(err.kind, CompilationErrorKind::Diagnostics);
        assert_eq!(err.diagnostics.len(), 2);
        assert_eq!(err.raw_diagnostics(), "Warning: unused\nTypeError: bad");
    }

    #[test]
    fn missing_target_without_errors_still_fails() {
        let err = extract(
            output(r#"{"contracts": {"Contract.sol": {"Other": {"abi": []}}}}"#),
            "Contract.sol",
            "A",
        )
        .unwrap_err();
        assert_eq!(err.kind, CompilationErrorKind::MissingContract);
    }
}
