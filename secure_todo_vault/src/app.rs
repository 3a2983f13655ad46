//! Secure TODO Vault - Application Context
//!
//! Builds every service once and hands out shared handles. There are no
//! module-level singletons: a fresh `TodoApp` means fresh lockout state and a
//! fresh fallback-key cache.

use std::sync::Arc;

use crate::biometrics::{AuthGatekeeper, BiometricCapability};
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::crypto::Digest;
use crate::error::TodoResult;
use crate::repository::TodoRepository;
use crate::storage::{FallbackStore, SecureStorage, SecureVault};
use crate::store::{AuthSessionStore, TodoListStore};

/// Where values are kept on this platform
pub enum PlatformStorage {
    /// Native secure vault
    Vault(Arc<dyn SecureVault>),
    /// Plain store plus hash function, for platforms without a vault
    Fallback {
        store: Arc<dyn FallbackStore>,
        digest: Arc<dyn Digest>,
    },
}

/// TODO App - single entry point
///
/// # Example
///
/// ```rust,ignore
/// let app = TodoApp::new(config, PlatformStorage::Vault(vault), biometrics)?;
///
/// if app.auth().login().await {
///     app.todos().initialize_with_sample_data().await?;
///     app.todos().add_todo("Buy milk").await?;
/// }
/// ```
pub struct TodoApp {
    config: AppConfig,
    repository: Arc<TodoRepository>,
    gatekeeper: Arc<AuthGatekeeper>,
    todos: Arc<TodoListStore>,
    auth: Arc<AuthSessionStore>,
}

impl TodoApp {
    /// Create with the system clock
    pub fn new(
        config: AppConfig,
        platform: PlatformStorage,
        biometrics: Arc<dyn BiometricCapability>,
    ) -> TodoResult<Self> {
        Self::with_clock(config, platform, biometrics, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: AppConfig,
        platform: PlatformStorage,
        biometrics: Arc<dyn BiometricCapability>,
        clock: Arc<dyn Clock>,
    ) -> TodoResult<Self> {
        config.validate()?;
        let keys = config.storage_keys();

        let storage = Arc::new(match platform {
            PlatformStorage::Vault(vault) => SecureStorage::with_vault(vault, config.storage),
            PlatformStorage::Fallback { store, digest } => SecureStorage::with_fallback(
                store,
                digest,
                keys.encryption_key.clone(),
                config.storage,
            ),
        });

        let repository = Arc::new(TodoRepository::new(Arc::clone(&storage), keys));
        let gatekeeper = Arc::new(AuthGatekeeper::new(
            biometrics,
            Arc::clone(&clock),
            config.auth.clone(),
        ));
        let todos = Arc::new(TodoListStore::new(Arc::clone(&repository), Arc::clone(&clock)));
        let auth = Arc::new(AuthSessionStore::new(Arc::clone(&gatekeeper), clock));

        Ok(Self {
            config,
            repository,
            gatekeeper,
            todos,
            auth,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn repository(&self) -> &Arc<TodoRepository> {
        &self.repository
    }

    pub fn gatekeeper(&self) -> &Arc<AuthGatekeeper> {
        &self.gatekeeper
    }

    pub fn todos(&self) -> &Arc<TodoListStore> {
        &self.todos
    }

    pub fn auth(&self) -> &Arc<AuthSessionStore> {
        &self.auth
    }
}
