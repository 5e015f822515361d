//! Solidity standard-JSON input and output shapes.
//!
//! Only the fields this crate reads or writes are modelled; unknown output
//! fields are ignored on deserialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::options::PipelineOptions;

// =============================================================================
// INPUT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompilerInput {
    pub language: &'static str,
    pub sources: BTreeMap<String, SourceUnit>,
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceUnit {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub optimizer: OptimizerSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evm_version: Option<String>,
    /// file → contract → requested outputs.
    pub output_selection: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptimizerSettings {
    pub enabled: bool,
    pub runs: u32,
}

impl CompilerInput {
    /// A single-source input requesting the ABI and creation bytecode of
    /// every contract.
    pub fn single_source(source: &str, options: &PipelineOptions) -> Self {
        let mut sources = BTreeMap::new();
        sources.insert(
            options.source_unit_name.clone(),
            SourceUnit {
                content: source.to_string(),
            },
        );

        let mut per_contract = BTreeMap::new();
        per_contract.insert(
            "*".to_string(),
            vec!["abi".to_string(), "evm.bytecode.object".to_string()],
        );
        let mut output_selection = BTreeMap::new();
        output_selection.insert("*".to_string(), per_contract);

        CompilerInput {
            language: "Solidity",
            sources,
            settings: Settings {
                optimizer: OptimizerSettings {
                    enabled: options.optimizer.enabled,
                    runs: options.optimizer.runs,
                },
                evm_version: options.evm_version.clone(),
                output_selection,
            },
        }
    }
}

// =============================================================================
// OUTPUT
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompilerOutput {
    #[serde(default)]
    pub errors: Vec<CompilerDiagnostic>,
    /// source unit → contract name → output.
    #[serde(default)]
    pub contracts: BTreeMap<String, BTreeMap<String, ContractOutput>>,
}

impl CompilerOutput {
    pub fn contract(&self, source_unit: &str, name: &str) -> Option<&ContractOutput> {
        self.contracts.get(source_unit)?.get(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
    #[serde(other)]
    Unknown,
}

/// One entry of the compiler's `errors` array, warnings included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerDiagnostic {
    pub severity: DiagnosticSeverity,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub component: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CompilerDiagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }

    /// The compiler's own rendering when present, else `kind: message`.
    pub fn raw_text(&self) -> String {
        match &self.formatted_message {
            Some(text) => text.trim_end().to_string(),
            None if self.kind.is_empty() => self.message.clone(),
            None => format!("{}: {}", self.kind, self.message),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContractOutput {
    #[serde(default)]
    pub abi: Value,
    #[serde(default)]
    pub evm: Option<EvmOutput>,
}

impl ContractOutput {
    pub fn bytecode(&self) -> Option<&str> {
        self.evm
            .as_ref()?
            .bytecode
            .as_ref()
            .map(|b| b.object.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EvmOutput {
    #[serde(default)]
    pub bytecode: Option<BytecodeOutput>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BytecodeOutput {
    #[serde(default)]
    pub object: String,
}
