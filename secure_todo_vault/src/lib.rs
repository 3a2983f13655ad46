//! # Secure TODO Vault
//!
//! TODO list gated behind device authentication.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                   SECURE TODO VAULT                      │
//! │  ┌──────────────────────┐  ┌──────────────────────────┐  │
//! │  │  TodoListStore       │  │  AuthSessionStore        │  │
//! │  │  write-through list  │  │  session + timeout flag  │  │
//! │  └──────────┬───────────┘  └────────────┬─────────────┘  │
//! │             │                           │                │
//! │  ┌──────────┴───────────┐  ┌────────────┴─────────────┐  │
//! │  │  TodoRepository      │  │  AuthGatekeeper          │  │
//! │  │  JSON + first launch │  │  prompt + 3-strike lock  │  │
//! │  └──────────┬───────────┘  └────────────┬─────────────┘  │
//! │             │                           │                │
//! │  ┌──────────┴───────────┐  ┌────────────┴─────────────┐  │
//! │  │  SecureStorage       │  │  BiometricCapability     │  │
//! │  │  vault | fallback    │  │  (platform prompt)       │  │
//! │  └──────────────────────┘  └──────────────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Model
//!
//! - Values live in the platform secure vault when one exists
//! - Otherwise a hash-tagged base64 fallback keeps them out of plain sight;
//!   it is not encryption and the tag is not verified
//! - Three failed prompts lock authentication for 30 seconds
//! - Platform error text never reaches the UI

pub mod app;
pub mod biometrics;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod error;
pub mod models;
pub mod repository;
pub mod sanitize;
pub mod secure_fs;
pub mod storage;
pub mod store;

#[cfg(test)]
mod test_support;

pub use app::{PlatformStorage, TodoApp};
pub use biometrics::{AuthGatekeeper, AuthOptions, AuthResult, BiometricAvailability, BiometricKind};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use error::{PlatformError, TodoError, TodoResult};
pub use models::{AuthSession, TodoItem};
pub use repository::TodoRepository;
pub use secure_fs::SecureFs;
pub use storage::SecureStorage;
pub use store::{AuthSessionStore, TodoListStore};

/// Secure TODO Vault version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
