//! Secure TODO Vault - One-Way Hash Capability

use async_trait::async_trait;
use sha2::{Digest as _, Sha256};

use crate::error::PlatformError;

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha256,
}

/// Opaque one-way hash function returning a hex string
#[async_trait]
pub trait Digest: Send + Sync {
    async fn digest(&self, algorithm: DigestAlgorithm, input: &str) -> Result<String, PlatformError>;
}

/// In-process SHA-256
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Digest;

#[async_trait]
impl Digest for Sha256Digest {
    async fn digest(&self, algorithm: DigestAlgorithm, input: &str) -> Result<String, PlatformError> {
        match algorithm {
            DigestAlgorithm::Sha256 => Ok(hex::encode(Sha256::digest(input.as_bytes()))),
        }
    }
}
