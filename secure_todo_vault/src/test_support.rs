//! Test doubles for platform collaborators

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::biometrics::{BiometricCapability, BiometricKind, PromptOutcome, PromptRequest};
use crate::error::PlatformError;
use crate::storage::{FallbackStore, MemoryStore, MemoryVault, SecureVault};

#[derive(Default)]
struct ScriptState {
    hardware: bool,
    enrolled: bool,
    kinds: HashSet<BiometricKind>,
    probe_error: Option<String>,
    outcomes: VecDeque<Result<PromptOutcome, PlatformError>>,
    last_request: Option<PromptRequest>,
    prompt_calls: usize,
}

/// Biometric capability that replays queued prompt outcomes.
///
/// An empty queue answers with a plain failure.
pub struct ScriptedBiometrics {
    state: Mutex<ScriptState>,
}

impl ScriptedBiometrics {
    pub fn with_kinds(kinds: &[BiometricKind]) -> Self {
        Self {
            state: Mutex::new(ScriptState {
                hardware: true,
                enrolled: true,
                kinds: kinds.iter().copied().collect(),
                ..Default::default()
            }),
        }
    }

    pub fn set_kinds(&self, kinds: &[BiometricKind]) {
        self.state.lock().kinds = kinds.iter().copied().collect();
    }

    pub fn set_hardware(&self, present: bool) {
        self.state.lock().hardware = present;
    }

    pub fn set_enrolled(&self, enrolled: bool) {
        self.state.lock().enrolled = enrolled;
    }

    /// Make every capability probe fail
    pub fn fail_probes(&self, message: &str) {
        self.state.lock().probe_error = Some(message.to_string());
    }

    pub fn push_outcome(&self, outcome: Result<PromptOutcome, PlatformError>) {
        self.state.lock().outcomes.push_back(outcome);
    }

    pub fn prompt_calls(&self) -> usize {
        self.state.lock().prompt_calls
    }

    pub fn last_request(&self) -> Option<PromptRequest> {
        self.state.lock().last_request.clone()
    }

    fn probe<T>(&self, read: impl FnOnce(&ScriptState) -> T) -> Result<T, PlatformError> {
        let state = self.state.lock();
        match &state.probe_error {
            Some(message) => Err(PlatformError::new(message.clone())),
            None => Ok(read(&state)),
        }
    }
}

#[async_trait]
impl BiometricCapability for ScriptedBiometrics {
    async fn has_hardware(&self) -> Result<bool, PlatformError> {
        self.probe(|s| s.hardware)
    }

    async fn is_enrolled(&self) -> Result<bool, PlatformError> {
        self.probe(|s| s.enrolled)
    }

    async fn supported_kinds(&self) -> Result<HashSet<BiometricKind>, PlatformError> {
        self.probe(|s| s.kinds.clone())
    }

    async fn authenticate(&self, request: &PromptRequest) -> Result<PromptOutcome, PlatformError> {
        let mut state = self.state.lock();
        state.prompt_calls += 1;
        state.last_request = Some(request.clone());
        state
            .outcomes
            .pop_front()
            .unwrap_or_else(|| Ok(PromptOutcome::failure("authentication_failed")))
    }
}

/// Vault whose first `failures` calls fail, then behaves like [`MemoryVault`]
pub struct FlakyVault {
    inner: MemoryVault,
    failures: AtomicUsize,
    calls: AtomicUsize,
    message: String,
}

impl FlakyVault {
    pub fn failing(failures: usize, message: &str) -> Self {
        Self {
            inner: MemoryVault::new(),
            failures: AtomicUsize::new(failures),
            calls: AtomicUsize::new(0),
            message: message.to_string(),
        }
    }

    /// Fail every call from now on
    pub fn fail_always(&self) {
        self.failures.store(usize::MAX, Ordering::SeqCst);
    }

    pub fn recover(&self) {
        self.failures.store(0, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.raw(key)
    }

    fn tick(&self) -> Result<(), PlatformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining == 0 {
            return Ok(());
        }
        if remaining != usize::MAX {
            self.failures.store(remaining - 1, Ordering::SeqCst);
        }
        Err(PlatformError::new(self.message.clone()))
    }
}

#[async_trait]
impl SecureVault for FlakyVault {
    async fn set_item(&self, key: &str, value: &str) -> Result<(), PlatformError> {
        self.tick()?;
        self.inner.set_item(key, value).await
    }

    async fn get_item(&self, key: &str) -> Result<Option<String>, PlatformError> {
        self.tick()?;
        self.inner.get_item(key).await
    }

    async fn delete_item(&self, key: &str) -> Result<(), PlatformError> {
        self.tick()?;
        self.inner.delete_item(key).await
    }
}

/// Fallback store that counts reads and writes
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl FallbackStore for CountingStore {
    fn get(&self, key: &str) -> Result<Option<String>, PlatformError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PlatformError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), PlatformError> {
        self.inner.remove(key)
    }
}
