//! In-memory vault and fallback store

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{FallbackStore, SecureVault};
use crate::error::PlatformError;

/// Process-local stand-in for a platform secure vault
#[derive(Debug, Default)]
pub struct MemoryVault {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a value without going through the async API
    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.lock().get(key).cloned()
    }
}

#[async_trait]
impl SecureVault for MemoryVault {
    async fn set_item(&self, key: &str, value: &str) -> Result<(), PlatformError> {
        self.items.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_item(&self, key: &str) -> Result<Option<String>, PlatformError> {
        Ok(self.raw(key))
    }

    async fn delete_item(&self, key: &str) -> Result<(), PlatformError> {
        self.items.lock().remove(key);
        Ok(())
    }
}

/// Process-local fallback store
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FallbackStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PlatformError> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PlatformError> {
        self.items.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PlatformError> {
        self.items.lock().remove(key);
        Ok(())
    }
}
