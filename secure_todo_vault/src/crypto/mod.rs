//! Secure TODO Vault - Cryptographic Primitives
//!
//! One-way hashing behind a capability trait, and the persistent key used by
//! the fallback storage scheme.

pub mod digest;
pub mod keys;

pub use digest::*;
pub use keys::*;
