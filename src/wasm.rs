//! WASM entry points for the browser editor.
//!
//! Compilation needs a subprocess and is not exposed here; the editor calls
//! back to a host for that step.

use wasm_bindgen::prelude::*;

use crate::config::AutomationConfig;
use crate::error::{ConfigError, GenerationError, Stage};
use crate::options::PipelineOptions;
use crate::validate::ValidationReport;

/// Validate an automation config JSON.
/// Returns `{status: "valid", config}` or `{status: "errors", errors}`.
#[wasm_bindgen]
pub fn validate_config(json: &str) -> JsValue {
    let result = validate_config_inner(json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn validate_config_inner(json: &str) -> ValidateResult {
    match crate::config::validate_json(json) {
        Ok(config) => ValidateResult::Valid(config),
        Err(err) => ValidateResult::Errors {
            errors: ErrorDto::from_config(err),
        },
    }
}

/// Config JSON → contract source, without compiling.
/// Returns `{status: "success", template, contractName, source, structural}`
/// or `{status: "errors", errors}`.
#[wasm_bindgen]
pub fn generate_contract(json: &str) -> JsValue {
    let result = generate_contract_inner(json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn generate_contract_inner(json: &str) -> GenerateResult {
    let config = match crate::config::validate_json(json) {
        Ok(c) => c,
        Err(err) => {
            return GenerateResult::Errors {
                errors: ErrorDto::from_config(err),
            };
        }
    };

    let generated = match crate::codegen::generate(&config) {
        Ok(g) => g,
        Err(err) => {
            return GenerateResult::Errors {
                errors: vec![ErrorDto::from(err)],
            };
        }
    };

    let structural = crate::validate::check(generated.as_str());
    GenerateResult::Success(SourceDto {
        template: generated.template().as_str().to_string(),
        contract_name: generated.contract_name().to_string(),
        source: generated.into_string(),
        structural,
    })
}

/// Structural check of arbitrary source text. An empty or unparseable
/// `options_json` falls back to the default gas envelope.
/// Returns a `ValidationReport` object.
#[wasm_bindgen]
pub fn check_source(source: &str, options_json: &str) -> JsValue {
    let result = check_source_inner(source, options_json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn check_source_inner(source: &str, options_json: &str) -> ValidationReport {
    let options = if options_json.trim().is_empty() {
        PipelineOptions::default()
    } else {
        serde_json::from_str(options_json).unwrap_or_default()
    };
    crate::validate::check_with(source, &options.rule_context())
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: String,
    stage: Stage,
    message: String,
    field: Option<String>,
}

impl ErrorDto {
    fn from_config(err: ConfigError) -> Vec<ErrorDto> {
        err.violations
            .into_iter()
            .map(|v| ErrorDto {
                code: v.code.to_string(),
                stage: Stage::Config,
                message: v.message,
                field: Some(v.field),
            })
            .collect()
    }
}

impl From<GenerationError> for ErrorDto {
    fn from(e: GenerationError) -> Self {
        ErrorDto {
            code: e.code().to_string(),
            stage: Stage::Generation,
            message: e.to_string(),
            field: None,
        }
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceDto {
    template: String,
    contract_name: String,
    source: String,
    structural: ValidationReport,
}

#[derive(Debug, serde::Serialize)]
#[serde(tag = "status")]
enum ValidateResult {
    #[serde(rename = "valid")]
    Valid(AutomationConfig),
    #[serde(rename = "errors")]
    Errors { errors: Vec<ErrorDto> },
}

#[derive(Debug, serde::Serialize)]
#[serde(tag = "status")]
enum GenerateResult {
    #[serde(rename = "success")]
    Success(SourceDto),
    #[serde(rename = "errors")]
    Errors { errors: Vec<ErrorDto> },
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "event": "Transfer(address,address,uint256)",
        "function": "onTransfer(address,uint256)",
        "originChainId": 1,
        "destinationChainId": 1,
        "originContract": "0x1111111111111111111111111111111111111111",
        "destinationContract": "0x2222222222222222222222222222222222222222"
    }"#;

    #[test]
    fn generate_reports_config_errors_with_fields() {
        let GenerateResult::Errors { errors } = generate_contract_inner(r#"{"originChainId": "x"}"#)
        else {
            panic!("expected errors");
        };
        assert!(errors.iter().all(|e| e.stage == Stage::Config));
        assert!(errors.iter().any(|e| e.field.as_deref() == Some("originChainId")));
    }

    #[test]
    fn generate_success_carries_clean_report() {
        let GenerateResult::Success(dto) = generate_contract_inner(CONFIG) else {
            panic!("expected success");
        };
        assert_eq!(dto.template, "basic-single-pair");
        assert!(dto.structural.is_valid);
    }

    #[test]
    fn validate_result_is_status_tagged() {
        let json = serde_json::to_value(validate_config_inner("[]")).unwrap();
        assert_eq!(json["status"], "errors");
        assert_eq!(json["errors"][0]["stage"], "config");
    }

    #[test]
    fn check_source_uses_supplied_envelope() {
        let source = "uint64 private constant CALLBACK_GAS_LIMIT = 500000;";
        assert!(!check_source_inner(source, "").has_code("S007"));
        let narrow = check_source_inner(source, r#"{"gasLimitEnvelope": {"min": 1, "max": 10}}"#);
        assert!(narrow.has_code("S007"));
    }
}
