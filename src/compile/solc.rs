//! `solc --standard-json` as a child process.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::OnceLock;
use std::thread;
use std::time::Duration;

use wait_timeout::ChildExt;

use super::SolidityCompiler;
use super::standard_json::{CompilerInput, CompilerOutput};
use crate::error::CompilationError;

/// Environment variable naming the compiler binary.
pub const SOLC_PATH_ENV: &str = "SOLC_PATH";

/// Budget for `solc --version`.
pub const DEFAULT_VERSION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SolcCompiler {
    binary: PathBuf,
    version_timeout: Duration,
    /// Resolved on first successful `version()`; the binary does not change.
    version: OnceLock<String>,
}

impl SolcCompiler {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        SolcCompiler {
            binary: binary.into(),
            version_timeout: DEFAULT_VERSION_TIMEOUT,
            version: OnceLock::new(),
        }
    }

    /// `$SOLC_PATH` if set, else `solc` from `PATH`.
    pub fn from_env() -> Self {
        Self::new(std::env::var_os(SOLC_PATH_ENV).unwrap_or_else(|| "solc".into()))
    }

    pub fn with_version_timeout(mut self, timeout: Duration) -> Self {
        self.version_timeout = timeout;
        self
    }

    pub fn binary(&self) -> &std::path::Path {
        &self.binary
    }

    fn spawn(&self, args: &[&str]) -> Result<Child, CompilationError> {
        Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                CompilationError::toolchain(format!(
                    "failed to launch {}: {}",
                    self.binary.display(),
                    e
                ))
            })
    }

    /// Run the binary with `args`, feed it `stdin`, and wait at most `timeout`.
    /// The child is killed on every early return.
    fn run(
        &self,
        args: &[&str],
        stdin: Vec<u8>,
        timeout: Duration,
    ) -> Result<Finished, CompilationError> {
        let mut guard = ChildGuard {
            child: self.spawn(args)?,
            reaped: false,
        };
        let child = &mut guard.child;

        let (Some(mut input), Some(stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            return Err(CompilationError::toolchain("compiler stdio was not captured"));
        };

        // Feed and drain on separate threads so a large output can't deadlock
        // against a full input pipe.
        let writer = thread::spawn(move || input.write_all(&stdin));
        let stdout = read_to_end(stdout);
        let stderr = read_to_end(stderr);

        let status = child
            .wait_timeout(timeout)
            .map_err(|e| CompilationError::toolchain(format!("failed to wait for compiler: {}", e)))?;
        let Some(status) = status else {
            tracing::warn!(
                binary = %self.binary.display(),
                timeout_ms = timeout.as_millis() as u64,
                "compiler timed out"
            );
            return Err(CompilationError::timeout(timeout.as_millis()));
        };
        guard.reaped = true;

        let _ = writer.join();
        Ok(Finished {
            status,
            stdout: stdout.join().unwrap_or_default(),
            stderr: stderr.join().unwrap_or_default(),
        })
    }
}

struct Finished {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// Kills the child unless it was reaped, so a timeout never leaks a process.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

fn read_to_end(mut pipe: impl Read + Send + 'static) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

impl SolidityCompiler for SolcCompiler {
    fn version(&self) -> Result<String, CompilationError> {
        if let Some(version) = self.version.get() {
            return Ok(version.clone());
        }

        let finished = self.run(&["--version"], Vec::new(), self.version_timeout)?;
        let stdout = String::from_utf8_lossy(&finished.stdout);
        let version = stdout
            .lines()
            .find_map(|line| line.strip_prefix("Version:"))
            .map(|v| v.trim().to_string())
            .ok_or_else(|| {
                CompilationError::toolchain(format!(
                    "unrecognized `--version` output: {}",
                    stdout.trim()
                ))
            })?;
        Ok(self.version.get_or_init(|| version).clone())
    }

    fn compile(
        &self,
        input: &CompilerInput,
        timeout: Duration,
    ) -> Result<CompilerOutput, CompilationError> {
        let payload = serde_json::to_vec(input)
            .map_err(|e| CompilationError::toolchain(format!("failed to encode input: {}", e)))?;

        let finished = self.run(&["--standard-json"], payload, timeout)?;
        if finished.stdout.is_empty() {
            return Err(CompilationError::toolchain(format!(
                "compiler exited with {} and no output: {}",
                finished.status,
                String::from_utf8_lossy(&finished.stderr).trim()
            )));
        }

        serde_json::from_slice(&finished.stdout).map_err(|e| {
            CompilationError::toolchain(format!("unreadable compiler output: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompilationErrorKind;
    use crate::options::PipelineOptions;

    #[test]
    fn missing_binary_is_a_toolchain_error() {
        let solc = SolcCompiler::new("/nonexistent/solc-binary");
        let input = CompilerInput::single_source("", &PipelineOptions::default());
        let err = solc.compile(&input, Duration::from_secs(1)).unwrap_err();
        assert_eq!(err.kind, CompilationErrorKind::Toolchain);
        assert!(err.message.contains("/nonexistent/solc-binary"));
        assert_eq!(solc.version().unwrap_err().kind, CompilationErrorKind::Toolchain);
    }

    /// Writes an executable shell script standing in for the compiler.
    #[cfg(unix)]
    fn fake_solc(name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = std::env::temp_dir().join(format!("{}-{}", name, std::process::id()));
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn hung_compiler_is_killed_at_the_deadline() {
        let script = fake_solc("solc-hang", "exec sleep 30");
        let solc = SolcCompiler::new(&script).with_version_timeout(Duration::from_millis(200));
        let input = CompilerInput::single_source("contract A {}", &PipelineOptions::default());

        let started = std::time::Instant::now();
        let err = solc.compile(&input, Duration::from_millis(200)).unwrap_err();
        assert_eq!(err.kind, CompilationErrorKind::Timeout);
        assert_eq!(err.message, "compiler did not finish within 200ms");

        let err = solc.version().unwrap_err();
        assert_eq!(err.kind, CompilationErrorKind::Timeout);
        assert!(started.elapsed() < Duration::from_secs(5), "{:?}", started.elapsed());

        let _ = std::fs::remove_file(script);
    }

    #[cfg(unix)]
    #[test]
    fn version_is_parsed_once() {
        let marker = std::env::temp_dir().join(format!("solc-version-calls-{}", std::process::id()));
        let _ = std::fs::remove_file(&marker);
        let script = fake_solc(
            "solc-version",
            &format!(
                "echo x >> {}\necho 'solc, the solidity compiler commandline interface'\necho 'Version: 0.8.24+commit.e11b9ed9.Linux.g++'",
                marker.display()
            ),
        );
        let solc = SolcCompiler::new(&script);

        assert_eq!(solc.version().unwrap(), "0.8.24+commit.e11b9ed9.Linux.g++");
        assert_eq!(solc.version().unwrap(), "0.8.24+commit.e11b9ed9.Linux.g++");
        assert_eq!(std::fs::read_to_string(&marker).unwrap().lines().count(), 1);

        let _ = std::fs::remove_file(script);
        let _ = std::fs::remove_file(marker);
    }
}
