//! Read-through cache in front of any `SolidityCompiler`.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::Duration;

use super::SolidityCompiler;
use super::standard_json::{CompilerInput, CompilerOutput};
use crate::codegen::topic::keccak256;
use crate::error::CompilationError;

/// Entries kept by `CachingCompiler::new`.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

type Key = [u8; 32];

/// Caches compiler output keyed by Keccak-256 of compiler version plus the
/// serialized input. Failed compilations are never cached. Once full, the
/// oldest entry is evicted first.
pub struct CachingCompiler<C> {
    inner: C,
    capacity: usize,
    /// The inner compiler's version, asked for once.
    version: OnceLock<String>,
    entries: Mutex<Entries>,
}

#[derive(Default)]
struct Entries {
    outputs: HashMap<Key, CompilerOutput>,
    order: VecDeque<Key>,
}

impl<C: SolidityCompiler> CachingCompiler<C> {
    pub fn new(inner: C) -> Self {
        Self::with_capacity(inner, DEFAULT_CACHE_CAPACITY)
    }

    /// A capacity of zero disables caching.
    pub fn with_capacity(inner: C, capacity: usize) -> Self {
        CachingCompiler {
            inner,
            capacity,
            version: OnceLock::new(),
            entries: Mutex::new(Entries::default()),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .outputs
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.outputs.clear();
        entries.order.clear();
    }

    fn resolved_version(&self) -> Result<&str, CompilationError> {
        if let Some(version) = self.version.get() {
            return Ok(version.as_str());
        }
        let version = self.inner.version()?;
        Ok(self.version.get_or_init(|| version).as_str())
    }

    fn key(&self, input: &CompilerInput) -> Result<Key, CompilationError> {
        let version = self.resolved_version()?;
        let encoded = serde_json::to_vec(input)
            .map_err(|e| CompilationError::toolchain(format!("failed to encode input: {}", e)))?;
        let mut material = Vec::with_capacity(version.len() + 1 + encoded.len());
        material.extend_from_slice(version.as_bytes());
        material.push(0);
        material.extend_from_slice(&encoded);
        Ok(keccak256(&material))
    }

    fn insert(&self, key: Key, output: CompilerOutput) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.outputs.insert(key, output).is_some() {
            return;
        }
        entries.order.push_back(key);
        while entries.order.len() > self.capacity {
            if let Some(oldest) = entries.order.pop_front() {
                entries.outputs.remove(&oldest);
            }
        }
    }
}

impl<C: SolidityCompiler> SolidityCompiler for CachingCompiler<C> {
    fn version(&self) -> Result<String, CompilationError> {
        self.resolved_version().map(str::to_string)
    }

    fn compile(
        &self,
        input: &CompilerInput,
        timeout: Duration,
    ) -> Result<CompilerOutput, CompilationError> {
        let key = self.key(input)?;
        if let Some(hit) = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .outputs
            .get(&key)
        {
            tracing::debug!(key = %hex::encode(&key[..8]), "compiler cache hit");
            return Ok(hit.clone());
        }

        // The lock is not held across the compile; concurrent misses on the
        // same key both compile and the first insert is kept.
        let output = self.inner.compile(input, timeout)?;
        self.insert(key, output.clone());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::PipelineOptions;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
        versions: AtomicUsize,
        fail: bool,
    }

    impl Counting {
        fn new(fail: bool) -> Self {
            Counting {
                calls: AtomicUsize::new(0),
                versions: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl SolidityCompiler for Counting {
        fn version(&self) -> Result<String, CompilationError> {
            self.versions.fetch_add(1, Ordering::SeqCst);
            Ok("0.8.24+commit.e11b9ed9".into())
        }

        fn compile(&self, _: &CompilerInput, _: Duration) -> Result<CompilerOutput, CompilationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(CompilationError::toolchain("boom"))
            } else {
                Ok(CompilerOutput::default())
            }
        }
    }

    fn input(source: &str) -> CompilerInput {
        CompilerInput::single_source(source, &PipelineOptions::default())
    }

    #[test]
    fn identical_inputs_compile_once() {
        let cache = CachingCompiler::new(Counting::new(false));
        let timeout = Duration::from_secs(1);
        cache.compile(&input("contract A {}"), timeout).unwrap();
        cache.compile(&input("contract A {}"), timeout).unwrap();
        cache.compile(&input("contract B {}"), timeout).unwrap();
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.inner().versions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn oldest_entry_is_evicted_at_capacity() {
        let cache = CachingCompiler::with_capacity(Counting::new(false), 2);
        let timeout = Duration::from_secs(1);
        for source in ["contract A {}", "contract B {}", "contract C {}"] {
            cache.compile(&input(source), timeout).unwrap();
        }
        assert_eq!(cache.len(), 2);

        // B and C are still cached; A was evicted and compiles again.
        cache.compile(&input("contract C {}"), timeout).unwrap();
        cache.compile(&input("contract B {}"), timeout).unwrap();
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 3);
        cache.compile(&input("contract A {}"), timeout).unwrap();
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 4);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn zero_capacity_never_stores() {
        let cache = CachingCompiler::with_capacity(Counting::new(false), 0);
        let timeout = Duration::from_secs(1);
        cache.compile(&input("contract A {}"), timeout).unwrap();
        cache.compile(&input("contract A {}"), timeout).unwrap();
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = CachingCompiler::new(Counting::new(true));
        let timeout = Duration::from_secs(1);
        assert!(cache.compile(&input("x"), timeout).is_err());
        assert!(cache.compile(&input("x"), timeout).is_err());
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }
}
