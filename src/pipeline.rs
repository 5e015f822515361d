//! Orchestration: config → source → structural check → compiled artifact.
//!
//! Two entry points share the back half of the pipeline:
//!
//! - `run` starts from a raw automation config. Structural findings on
//!   generated source are advisory and ride along with the result.
//! - `run_edited` starts from user-supplied source. Structural errors there
//!   block compilation.

use serde::Serialize;
use serde_json::Value;

use crate::codegen;
use crate::compile::{self, CompilerDiagnostic, SolidityCompiler};
use crate::config;
use crate::error::{ConfigError, PipelineError, Stage};
use crate::options::PipelineOptions;
use crate::template::TemplateId;
use crate::validate::{self, ValidationReport};

/// Everything a successful run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSuccess {
    pub source: String,
    pub contract_name: String,
    /// `None` when the source was supplied rather than generated.
    pub template: Option<TemplateId>,
    pub abi: Value,
    pub bytecode: String,
    /// Structural findings; only warnings survive a `run_edited` call.
    pub structural: ValidationReport,
    pub compiler_warnings: Vec<CompilerDiagnostic>,
}

#[derive(Debug, Clone)]
pub enum PipelineResult {
    Success(Box<PipelineSuccess>),
    Failure(PipelineError),
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineResult::Success(_))
    }

    /// Stage that stopped the run, if any.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            PipelineResult::Success(_) => None,
            PipelineResult::Failure(err) => Some(err.stage()),
        }
    }

    pub fn into_result(self) -> Result<PipelineSuccess, PipelineError> {
        match self {
            PipelineResult::Success(success) => Ok(*success),
            PipelineResult::Failure(err) => Err(err),
        }
    }
}

impl From<Result<PipelineSuccess, PipelineError>> for PipelineResult {
    fn from(result: Result<PipelineSuccess, PipelineError>) -> Self {
        match result {
            Ok(success) => PipelineResult::Success(Box::new(success)),
            Err(err) => PipelineResult::Failure(err),
        }
    }
}

/// Runs the stages in order and stops at the first failure. Holds no state
/// between runs, so one instance may serve concurrent callers.
pub struct Pipeline<'c> {
    compiler: &'c dyn SolidityCompiler,
    options: PipelineOptions,
}

impl<'c> Pipeline<'c> {
    pub fn new(compiler: &'c dyn SolidityCompiler) -> Self {
        Self::with_options(compiler, PipelineOptions::default())
    }

    pub fn with_options(compiler: &'c dyn SolidityCompiler, options: PipelineOptions) -> Self {
        Pipeline { compiler, options }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn run(&self, raw: &Value) -> PipelineResult {
        self.try_run(raw).into()
    }

    pub fn run_json(&self, json: &str) -> PipelineResult {
        match serde_json::from_str::<Value>(json) {
            Ok(raw) => self.run(&raw),
            Err(e) => PipelineResult::Failure(ConfigError::unparseable(e).into()),
        }
    }

    pub fn run_edited(&self, source: &str, contract_name: &str) -> PipelineResult {
        self.try_run_edited(source, contract_name).into()
    }

    fn try_run(&self, raw: &Value) -> Result<PipelineSuccess, PipelineError> {
        tracing::debug!(stage = %Stage::Config, "pipeline stage");
        let automation = config::validate(raw)?;

        tracing::debug!(stage = %Stage::Generation, "pipeline stage");
        let generated = codegen::generate(&automation)?;

        tracing::debug!(stage = %Stage::Structural, "pipeline stage");
        let structural = validate::check_with(generated.as_str(), &self.options.rule_context());
        for finding in structural.findings() {
            tracing::warn!(finding = %finding, "advisory structural finding on generated source");
        }

        let success = self.compile_stage(
            generated.as_str(),
            generated.contract_name(),
            Some(generated.template()),
            structural,
        )?;
        tracing::info!(
            contract = %success.contract_name,
            template = %generated.template(),
            warnings = success.structural.warnings.len() + success.compiler_warnings.len(),
            "pipeline run finished"
        );
        Ok(success)
    }

    fn try_run_edited(
        &self,
        source: &str,
        contract_name: &str,
    ) -> Result<PipelineSuccess, PipelineError> {
        tracing::debug!(stage = %Stage::Structural, "pipeline stage (edited source)");
        let structural = validate::check_with(source, &self.options.rule_context());
        if !structural.is_valid {
            return Err(PipelineError::Structural(structural));
        }
        for warning in &structural.warnings {
            tracing::warn!(finding = %warning, "structural warning on edited source");
        }

        let success = self.compile_stage(source, contract_name, None, structural)?;
        tracing::info!(contract = contract_name, "edited-source run finished");
        Ok(success)
    }

    fn compile_stage(
        &self,
        source: &str,
        contract_name: &str,
        template: Option<TemplateId>,
        structural: ValidationReport,
    ) -> Result<PipelineSuccess, PipelineError> {
        tracing::debug!(stage = %Stage::Compilation, "pipeline stage");
        let compiled = compile::compile(self.compiler, source, contract_name, &self.options)?;

        Ok(PipelineSuccess {
            source: source.to_string(),
            contract_name: contract_name.to_string(),
            template,
            abi: compiled.artifact.abi,
            bytecode: compiled.artifact.bytecode,
            structural,
            compiler_warnings: compiled.warnings,
        })
    }
}
