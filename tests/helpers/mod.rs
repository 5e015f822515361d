#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reactive_compiler::compile::{CompilerInput, CompilerOutput, SolidityCompiler};
use reactive_compiler::error::CompilationError;
use serde_json::{Value, json};

// =============================================================================
// Fake compiler
// =============================================================================

enum Reply {
    Output(CompilerOutput),
    Fail(CompilationError),
}

/// Stands in for `solc`: replays one recorded standard-JSON output (or one
/// error) for every call and remembers what it was asked to compile.
pub struct FakeCompiler {
    reply: Reply,
    calls: AtomicUsize,
    last_input: Mutex<Option<CompilerInput>>,
}

impl FakeCompiler {
    /// Replay `tests/fixtures/<name>`.
    pub fn from_fixture(name: &str) -> Self {
        let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
        let text = std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", path, e));
        let output = serde_json::from_str(&text)
            .unwrap_or_else(|e| panic!("fixture {} is not compiler output: {}", path, e));
        Self::with_reply(Reply::Output(output))
    }

    pub fn failing(err: CompilationError) -> Self {
        Self::with_reply(Reply::Fail(err))
    }

    fn with_reply(reply: Reply) -> Self {
        FakeCompiler {
            reply,
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_input(&self) -> Option<CompilerInput> {
        self.last_input.lock().unwrap().clone()
    }

    /// Content of the single source unit in the last request.
    pub fn last_source(&self) -> Option<String> {
        self.last_input()
            .and_then(|input| input.sources.into_values().next())
            .map(|unit| unit.content)
    }
}

impl SolidityCompiler for FakeCompiler {
    fn version(&self) -> Result<String, CompilationError> {
        Ok("0.8.24+commit.e11b9ed9.Linux.g++".into())
    }

    fn compile(
        &self,
        input: &CompilerInput,
        _timeout: Duration,
    ) -> Result<CompilerOutput, CompilationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_input.lock().unwrap() = Some(input.clone());
        match &self.reply {
            Reply::Output(output) => Ok(output.clone()),
            Reply::Fail(err) => Err(err.clone()),
        }
    }
}

// =============================================================================
// Config builders
// =============================================================================

pub fn origin() -> String {
    format!("0x{}", "11".repeat(20))
}

pub fn destination() -> String {
    format!("0x{}", "22".repeat(20))
}

pub fn owner() -> String {
    format!("0x{}", "33".repeat(20))
}

pub fn pair(event: &str, function: &str) -> Value {
    json!({ "event": event, "function": function })
}

pub fn transfer_pair() -> Value {
    pair("Transfer(address,address,uint256)", "onTransfer(address,uint256)")
}

pub fn approval_pair() -> Value {
    pair("Approval(address,address,uint256)", "onApproval(address,address)")
}

/// A config with the given pairs and origin/destination on chain 1.
pub fn config_with_pairs(pairs: Vec<Value>) -> Value {
    json!({
        "pairs": pairs,
        "originChainId": 1,
        "destinationChainId": 1,
        "originContract": origin(),
        "destinationContract": destination(),
    })
}

/// The single Transfer → onTransfer automation.
pub fn transfer_config() -> Value {
    config_with_pairs(vec![transfer_pair()])
}

/// `base` with `key` set to `value`.
pub fn with(mut base: Value, key: &str, value: Value) -> Value {
    base[key] = value;
    base
}
