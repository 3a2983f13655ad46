//! Secure TODO Vault - Secure Key-Value Storage
//!
//! Uniform async get/set/delete over either the platform secure vault or an
//! encrypted fallback store. The backend is chosen once, when the
//! [`SecureStorage`] is built; every operation then goes through the same
//! retry policy.

pub mod backend;
pub mod memory;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::crypto::Digest;
use crate::error::{PlatformError, TodoError, TodoResult};

pub use backend::{FallbackBackend, VaultBackend};
pub use memory::{MemoryStore, MemoryVault};

/// Platform secure vault (hardware-backed credential storage)
#[async_trait]
pub trait SecureVault: Send + Sync {
    async fn set_item(&self, key: &str, value: &str) -> Result<(), PlatformError>;
    async fn get_item(&self, key: &str) -> Result<Option<String>, PlatformError>;
    async fn delete_item(&self, key: &str) -> Result<(), PlatformError>;
}

/// Plain synchronous persistent store, used only when no vault exists
pub trait FallbackStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PlatformError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PlatformError>;
    fn remove(&self, key: &str) -> Result<(), PlatformError>;
}

/// One concrete storage strategy
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> TodoResult<()>;
    async fn get(&self, key: &str) -> TodoResult<Option<String>>;
    async fn delete(&self, key: &str) -> TodoResult<()>;
}

/// Retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Base delay; the wait before retry `n` is `retry_delay_ms * (n + 1)`
    pub retry_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            retry_delay_ms: 300,
        }
    }
}

impl RetryPolicy {
    /// No waiting between attempts
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            retry_delay_ms: 0,
        }
    }

    /// Delay after the given zero-based failed attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_delay_ms.saturating_mul(u64::from(attempt) + 1))
    }
}

/// Secure key-value storage with retry and error wrapping
pub struct SecureStorage {
    backend: Arc<dyn StorageBackend>,
    retry: RetryPolicy,
}

impl SecureStorage {
    /// Build over an arbitrary backend
    pub fn new(backend: Arc<dyn StorageBackend>, retry: RetryPolicy) -> Self {
        Self { backend, retry }
    }

    /// Platform with a native secure vault
    pub fn with_vault(vault: Arc<dyn SecureVault>, retry: RetryPolicy) -> Self {
        Self::new(Arc::new(VaultBackend::new(vault)), retry)
    }

    /// Platform without a secure vault
    pub fn with_fallback(
        store: Arc<dyn FallbackStore>,
        digest: Arc<dyn Digest>,
        key_slot: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self::new(Arc::new(FallbackBackend::new(store, digest, key_slot)), retry)
    }

    /// Store a value
    pub async fn set(&self, key: &str, value: &str) -> TodoResult<()> {
        self.retry_operation("setItem", || self.backend.set(key, value))
            .await
            .map_err(TodoError::save_failed)
    }

    /// Read a value; `None` when absent
    pub async fn get(&self, key: &str) -> TodoResult<Option<String>> {
        self.retry_operation("getItem", || self.backend.get(key))
            .await
            .map_err(TodoError::retrieve_failed)
    }

    /// Remove a value
    pub async fn delete(&self, key: &str) -> TodoResult<()> {
        self.retry_operation("deleteItem", || self.backend.delete(key))
            .await
            .map_err(TodoError::delete_failed)
    }

    async fn retry_operation<T, F, Fut>(&self, operation: &str, mut run: F) -> TodoResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = TodoResult<T>>,
    {
        let total = self.retry.max_retries.saturating_add(1);
        let mut attempt = 0;

        loop {
            match run().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_transient() => {
                    log::error!("[SecureStorage] {} failed (not retryable): {}", operation, e);
                    return Err(e);
                }
                Err(e) if attempt + 1 < total => {
                    log::warn!(
                        "[SecureStorage] {} (attempt {}/{}) failed: {}",
                        operation,
                        attempt + 1,
                        total,
                        e
                    );
                    tokio::time::sleep(self.retry.delay_for(attempt)).await;
                    attempt += 1;
                }
                Err(e) => {
                    log::error!("[SecureStorage] {} (all retries exhausted) failed: {}", operation, e);
                    return Err(e);
                }
            }
        }
    }
}
