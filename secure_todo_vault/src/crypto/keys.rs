//! Secure TODO Vault - Fallback Key Management
//!
//! The fallback path has no secure enclave, so its key is a hash of
//! `timestamp-random`, generated once and persisted in the plain store.

use rand::Rng;
use secrecy::{ExposeSecret, SecretString};

use super::digest::{Digest, DigestAlgorithm};
use crate::error::PlatformError;

/// Key wrapper that zeroizes on drop
pub struct FallbackKey {
    inner: SecretString,
}

impl FallbackKey {
    pub fn new(key: String) -> Self {
        Self {
            inner: SecretString::new(key),
        }
    }

    /// Expose the key text (use with caution)
    pub fn expose(&self) -> &str {
        self.inner.expose_secret()
    }

    /// Derive a fresh key from the current time and a random value
    pub async fn generate(digest: &dyn Digest, now_millis: i64) -> Result<Self, PlatformError> {
        let random: f64 = rand::thread_rng().gen();
        let seed = format!("{}-{}", now_millis, random);
        let key = digest.digest(DigestAlgorithm::Sha256, &seed).await?;
        Ok(Self::new(key))
    }
}

impl std::fmt::Debug for FallbackKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FallbackKey([REDACTED])")
    }
}
