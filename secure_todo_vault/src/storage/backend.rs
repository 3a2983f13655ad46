//! Secure TODO Vault - Storage Backends
//!
//! `VaultBackend` passes straight through to the platform vault.
//! `FallbackBackend` stores `<sha256(key:plaintext)>:<base64(plaintext)>` in a
//! plain store. The hash prefix is an integrity tag that is written but never
//! checked, and base64 is an encoding, not a cipher: this path only keeps
//! values from sitting in the store as readable text.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::sync::Mutex;
use zeroize::Zeroize;

use super::{FallbackStore, SecureVault, StorageBackend};
use crate::crypto::{Digest, DigestAlgorithm, FallbackKey};
use crate::error::{TodoError, TodoResult};

/// Native secure vault backend
pub struct VaultBackend {
    vault: Arc<dyn SecureVault>,
}

impl VaultBackend {
    pub fn new(vault: Arc<dyn SecureVault>) -> Self {
        Self { vault }
    }
}

#[async_trait]
impl StorageBackend for VaultBackend {
    async fn set(&self, key: &str, value: &str) -> TodoResult<()> {
        Ok(self.vault.set_item(key, value).await?)
    }

    async fn get(&self, key: &str) -> TodoResult<Option<String>> {
        Ok(self.vault.get_item(key).await?)
    }

    async fn delete(&self, key: &str) -> TodoResult<()> {
        Ok(self.vault.delete_item(key).await?)
    }
}

/// Hash-tagged base64 backend for platforms without a vault
pub struct FallbackBackend {
    store: Arc<dyn FallbackStore>,
    digest: Arc<dyn Digest>,
    /// Slot the persistent key lives under
    key_slot: String,
    /// Key cached after first load or derivation; locked across load-or-generate
    cached_key: Mutex<Option<Arc<FallbackKey>>>,
}

impl FallbackBackend {
    pub fn new(
        store: Arc<dyn FallbackStore>,
        digest: Arc<dyn Digest>,
        key_slot: impl Into<String>,
    ) -> Self {
        Self {
            store,
            digest,
            key_slot: key_slot.into(),
            cached_key: Mutex::new(None),
        }
    }

    /// Load the persistent key, deriving and storing it on first use
    async fn encryption_key(&self) -> TodoResult<Arc<FallbackKey>> {
        let mut cached = self.cached_key.lock().await;
        if let Some(key) = cached.as_ref() {
            return Ok(Arc::clone(key));
        }

        let key = match self.store.get(&self.key_slot)?.filter(|k| !k.is_empty()) {
            Some(existing) => FallbackKey::new(existing),
            None => {
                let now = chrono::Utc::now().timestamp_millis();
                let key = FallbackKey::generate(self.digest.as_ref(), now).await?;
                self.store.set(&self.key_slot, key.expose())?;
                log::debug!("[SecureStorage] generated fallback encryption key");
                key
            }
        };

        let key = Arc::new(key);
        *cached = Some(Arc::clone(&key));
        Ok(key)
    }

    async fn seal(&self, key: &FallbackKey, plaintext: &str) -> TodoResult<String> {
        let mut combined = format!("{}:{}", key.expose(), plaintext);
        let tag = self.digest.digest(DigestAlgorithm::Sha256, &combined).await;
        combined.zeroize();

        Ok(format!("{}:{}", tag?, STANDARD.encode(plaintext.as_bytes())))
    }
}

/// Decode a `<tag>:<base64>` value; the tag is not verified
pub fn open_sealed(encrypted: &str) -> TodoResult<String> {
    let mut parts = encrypted.split(':');

    match (parts.next(), parts.next(), parts.next()) {
        (Some(_tag), Some(payload), None) => {
            let bytes = STANDARD.decode(payload)?;
            Ok(String::from_utf8(bytes)?)
        }
        _ => Err(TodoError::InvalidEncryptedFormat),
    }
}

#[async_trait]
impl StorageBackend for FallbackBackend {
    async fn set(&self, key: &str, value: &str) -> TodoResult<()> {
        let encryption_key = self.encryption_key().await?;
        let sealed = self.seal(&encryption_key, value).await?;
        self.store.set(key, &sealed)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> TodoResult<Option<String>> {
        match self.store.get(key)? {
            Some(sealed) if !sealed.is_empty() => open_sealed(&sealed).map(Some),
            _ => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> TodoResult<()> {
        self.store.remove(key)?;
        Ok(())
    }
}
