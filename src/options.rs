//! Caller-tunable pipeline settings.
//!
//! Everything here has a default, so `PipelineOptions::default()` is a working
//! configuration and a JSON options object may name any subset of fields.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_GAS_MIN: u64 = 100_000;
pub const DEFAULT_GAS_MAX: u64 = 3_000_000;
pub const DEFAULT_COMPILER_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_SOURCE_UNIT: &str = "Contract.sol";
pub const DEFAULT_OPTIMIZER_RUNS: u32 = 200;

/// Inclusive range a callback gas limit is expected to fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasEnvelope {
    pub min: u64,
    pub max: u64,
}

impl GasEnvelope {
    pub fn contains(&self, value: u64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl Default for GasEnvelope {
    fn default() -> Self {
        GasEnvelope {
            min: DEFAULT_GAS_MIN,
            max: DEFAULT_GAS_MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerOptions {
    pub enabled: bool,
    pub runs: u32,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        OptimizerOptions {
            enabled: false,
            runs: DEFAULT_OPTIMIZER_RUNS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineOptions {
    pub gas_limit_envelope: GasEnvelope,
    pub compiler_timeout_ms: u64,
    /// Name the source is registered under in the compiler input.
    pub source_unit_name: String,
    pub optimizer: OptimizerOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evm_version: Option<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            gas_limit_envelope: GasEnvelope::default(),
            compiler_timeout_ms: DEFAULT_COMPILER_TIMEOUT_MS,
            source_unit_name: DEFAULT_SOURCE_UNIT.to_string(),
            optimizer: OptimizerOptions::default(),
            evm_version: None,
        }
    }
}

impl PipelineOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.compiler_timeout_ms)
    }

    pub fn rule_context(&self) -> crate::validate::RuleContext {
        crate::validate::RuleContext {
            gas_envelope: self.gas_limit_envelope,
        }
    }
}
