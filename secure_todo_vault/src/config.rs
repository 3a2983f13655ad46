//! Secure TODO Vault - Configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::biometrics::AuthConfig;
use crate::error::{TodoError, TodoResult};
use crate::repository::StorageKeys;
use crate::storage::RetryPolicy;

/// Longest accepted lockout window (one day)
pub const MAX_LOCKOUT_DURATION_MS: u64 = 86_400_000;

/// Most retries accepted for a single storage operation
pub const MAX_STORAGE_RETRIES: u32 = 10;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Prefix for every storage key
    pub namespace: String,
    /// Secure storage retry policy
    pub storage: RetryPolicy,
    /// Lockout policy and prompt copy
    pub auth: AuthConfig,
    /// PIN accepted by the desktop device-credential prompt
    pub device_pin: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            namespace: "secure_todo_app".into(),
            storage: RetryPolicy::default(),
            auth: AuthConfig::default(),
            device_pin: None,
        }
    }
}

impl AppConfig {
    /// Load from a JSON file; defaults when the file does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> TodoResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::debug!("config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| TodoError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;

        Ok(config)
    }

    /// Save as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> TodoResult<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    pub fn validate(&self) -> TodoResult<()> {
        if self.namespace.trim().is_empty() {
            return Err(TodoError::Config("namespace must not be empty".into()));
        }
        if self.auth.max_attempts == 0 {
            return Err(TodoError::Config("auth.max_attempts must be at least 1".into()));
        }
        if self.auth.lockout_duration_ms > MAX_LOCKOUT_DURATION_MS {
            return Err(TodoError::Config(format!(
                "auth.lockout_duration_ms must not exceed {}",
                MAX_LOCKOUT_DURATION_MS
            )));
        }
        if self.storage.max_retries > MAX_STORAGE_RETRIES {
            return Err(TodoError::Config(format!(
                "storage.max_retries must not exceed {}",
                MAX_STORAGE_RETRIES
            )));
        }
        Ok(())
    }

    pub fn storage_keys(&self) -> StorageKeys {
        StorageKeys::new(&self.namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.storage.max_retries, 1);
        assert_eq!(config.storage.retry_delay_ms, 300);
        assert_eq!(config.auth.max_attempts, 3);
        assert_eq!(config.auth.lockout_duration_ms, 30_000);
        assert_eq!(config.storage_keys().todos, "secure_todo_app.todos");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"namespace":"work","auth":{"max_attempts":5}}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.namespace, "work");
        assert_eq!(config.auth.max_attempts, 5);
        assert_eq!(config.auth.lockout_duration_ms, 30_000);
        assert_eq!(config.storage, RetryPolicy::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = AppConfig {
            device_pin: Some("2468".into()),
            ..Default::default()
        };

        config.save(&path).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_rejects_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        std::fs::write(&path, r#"{"namespace":"  "}"#).unwrap();
        assert!(matches!(AppConfig::load(&path), Err(TodoError::Config(_))));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(TodoError::Config(_))));
    }

    #[test]
    fn test_rejects_out_of_range_policy() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        std::fs::write(&path, r#"{"auth":{"lockout_duration_ms":100000000000000000}}"#).unwrap();
        assert!(matches!(AppConfig::load(&path), Err(TodoError::Config(_))));

        std::fs::write(&path, r#"{"storage":{"max_retries":4294967295}}"#).unwrap();
        assert!(matches!(AppConfig::load(&path), Err(TodoError::Config(_))));

        let at_limit = AppConfig {
            storage: RetryPolicy {
                max_retries: MAX_STORAGE_RETRIES,
                retry_delay_ms: 0,
            },
            auth: AuthConfig {
                lockout_duration_ms: MAX_LOCKOUT_DURATION_MS,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());
    }
}
