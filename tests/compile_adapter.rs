//! Integration tests for the compilation adapter against recorded compiler output.

mod helpers;

use helpers::FakeCompiler;
use reactive_compiler::compile::{self, CachingCompiler, SolidityCompiler};
use reactive_compiler::error::{CompilationError, CompilationErrorKind};
use reactive_compiler::options::{OptimizerOptions, PipelineOptions};

const SOURCE: &str = "contract ReactiveAutomation {}";

#[test]
fn extracts_target_contract_unmodified() {
    let compiler = FakeCompiler::from_fixture("reactive_automation.json");
    let compiled =
        compile::compile(&compiler, SOURCE, "ReactiveAutomation", &PipelineOptions::default()).unwrap();

    assert!(compiled.artifact.bytecode.starts_with("6080604052"));
    assert!(!compiled.artifact.bytecode.starts_with("0x"));
    let names: Vec<&str> = compiled
        .artifact
        .abi
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Callback", "pay", "react", "subscribe"]);
    assert!(compiled.warnings.is_empty());
}

#[test]
fn request_packages_one_source_unit() {
    let compiler = FakeCompiler::from_fixture("reactive_automation.json");
    let options = PipelineOptions {
        optimizer: OptimizerOptions {
            enabled: true,
            runs: 1000,
        },
        ..PipelineOptions::default()
    };
    compile::compile(&compiler, SOURCE, "ReactiveAutomation", &options).unwrap();

    let input = compiler.last_input().unwrap();
    assert_eq!(input.language, "Solidity");
    assert_eq!(input.sources.len(), 1);
    assert_eq!(input.sources["Contract.sol"].content, SOURCE);
    assert!(input.settings.optimizer.enabled);
    assert_eq!(input.settings.optimizer.runs, 1000);
}

#[test]
fn warnings_pass_through() {
    let compiler = FakeCompiler::from_fixture("with_warnings.json");
    let compiled =
        compile::compile(&compiler, SOURCE, "ReactiveAutomation", &PipelineOptions::default()).unwrap();
    assert_eq!(compiled.warnings.len(), 1);
    assert_eq!(
        compiled.warnings[0].raw_text(),
        "Warning: Unused local variable.\n  --> Contract.sol:148:9:"
    );
}

#[test]
fn error_diagnostic_fails_with_full_list() {
    let compiler = FakeCompiler::from_fixture("type_error.json");
    let err = compile::compile(&compiler, SOURCE, "ReactiveAutomation", &PipelineOptions::default())
        .unwrap_err();
    assert_eq!(err.kind, CompilationErrorKind::Diagnostics);
    assert_eq!(err.diagnostics.len(), 2);
    insta::assert_snapshot!(err.raw_diagnostics(), @r"
    Warning: Unused local variable.
      --> Contract.sol:148:9:
    DeclarationError: Undeclared identifier.
      --> Contract.sol:151:13:
    ");
    assert_eq!(
        err.to_string(),
        "compilation failed (diagnostics): compiler reported 1 error(s)"
    );
}

#[test]
fn missing_target_is_an_error_without_diagnostics() {
    let compiler = FakeCompiler::from_fixture("missing_contract.json");
    let err = compile::compile(&compiler, SOURCE, "ReactiveAutomation", &PipelineOptions::default())
        .unwrap_err();
    assert_eq!(err.kind, CompilationErrorKind::MissingContract);
    assert!(err.diagnostics.is_empty());
    assert_eq!(
        err.message,
        "target contract 'ReactiveAutomation' not found in output for source unit 'Contract.sol'"
    );
}

#[test]
fn source_unit_name_is_configurable() {
    let compiler = FakeCompiler::from_fixture("reactive_automation.json");
    let options = PipelineOptions {
        source_unit_name: "Automation.sol".into(),
        ..PipelineOptions::default()
    };
    // The fixture only has `Contract.sol`, so the target is not found.
    let err = compile::compile(&compiler, SOURCE, "ReactiveAutomation", &options).unwrap_err();
    assert_eq!(err.kind, CompilationErrorKind::MissingContract);
    assert!(compiler.last_input().unwrap().sources.contains_key("Automation.sol"));
}

#[test]
fn timeout_propagates_kind() {
    let compiler = FakeCompiler::failing(CompilationError::timeout(30_000));
    let err = compile::compile(&compiler, SOURCE, "ReactiveAutomation", &PipelineOptions::default())
        .unwrap_err();
    assert_eq!(err.kind, CompilationErrorKind::Timeout);
}

#[test]
fn cache_serves_identical_requests() {
    let cache = CachingCompiler::new(FakeCompiler::from_fixture("reactive_automation.json"));
    let options = PipelineOptions::default();
    let first = compile::compile(&cache, SOURCE, "ReactiveAutomation", &options).unwrap();
    let second = compile::compile(&cache, SOURCE, "ReactiveAutomation", &options).unwrap();
    assert_eq!(first, second);
    assert_eq!(cache.inner().calls(), 1);

    compile::compile(&cache, "contract ReactiveAutomation { }", "ReactiveAutomation", &options).unwrap();
    assert_eq!(cache.inner().calls(), 2);
    assert_eq!(cache.version().unwrap(), "0.8.24+commit.e11b9ed9.Linux.g++");
}
