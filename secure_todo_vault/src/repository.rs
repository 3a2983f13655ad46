//! Secure TODO Vault - TODO Repository
//!
//! Serializes the TODO collection and the first-launch marker through
//! [`SecureStorage`].

use std::sync::Arc;

use crate::error::{TodoError, TodoResult};
use crate::models::TodoItem;
use crate::storage::SecureStorage;

/// Value written to the first-launch slot; only its presence matters
const FIRST_LAUNCH_SENTINEL: &str = "false";

/// Fixed storage keys under a namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub todos: String,
    pub first_launch: String,
    pub encryption_key: String,
}

impl StorageKeys {
    pub fn new(namespace: &str) -> Self {
        Self {
            todos: format!("{}.todos", namespace),
            first_launch: format!("{}.first_launch", namespace),
            encryption_key: format!("{}.encryption_key", namespace),
        }
    }
}

/// Persistence for the TODO list
pub struct TodoRepository {
    storage: Arc<SecureStorage>,
    keys: StorageKeys,
}

impl TodoRepository {
    pub fn new(storage: Arc<SecureStorage>, keys: StorageKeys) -> Self {
        Self { storage, keys }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Write the whole collection
    pub async fn save_todos(&self, todos: &[TodoItem]) -> TodoResult<()> {
        let result = match serde_json::to_string(todos) {
            Ok(json) => self.storage.set(&self.keys.todos, &json).await,
            Err(e) => Err(e.into()),
        };

        result.map_err(|e| {
            log::error!("[TodoRepository] saveTodos failed: {}", e);
            TodoError::save_todos_failed(e)
        })
    }

    /// Read the whole collection; empty when nothing is stored
    pub async fn load_todos(&self) -> TodoResult<Vec<TodoItem>> {
        let json = match self.storage.get(&self.keys.todos).await? {
            Some(json) if !json.is_empty() => json,
            _ => return Ok(Vec::new()),
        };

        serde_json::from_str(&json).map_err(|e| {
            log::error!("[TodoRepository] loadTodos - JSON parse failed: {}", e);
            TodoError::ParseFailed
        })
    }

    /// True until [`set_first_launch_complete`](Self::set_first_launch_complete) has run
    pub async fn is_first_launch(&self) -> TodoResult<bool> {
        Ok(self.storage.get(&self.keys.first_launch).await?.is_none())
    }

    pub async fn set_first_launch_complete(&self) -> TodoResult<()> {
        self.storage
            .set(&self.keys.first_launch, FIRST_LAUNCH_SENTINEL)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Sha256Digest;
    use crate::storage::{MemoryStore, MemoryVault, RetryPolicy, SecureVault};
    use crate::test_support::FlakyVault;

    fn repository(vault: Arc<dyn SecureVault>) -> TodoRepository {
        let storage = SecureStorage::with_vault(vault, RetryPolicy::immediate(1));
        TodoRepository::new(Arc::new(storage), StorageKeys::new("secure_todo_app"))
    }

    fn sample() -> Vec<TodoItem> {
        vec![
            TodoItem {
                id: "1".into(),
                description: "First".into(),
                is_completed: false,
                created_at: 1_700_000_000_000,
            },
            TodoItem {
                id: "2".into(),
                description: "Zażółć gęślą jaźń".into(),
                is_completed: true,
                created_at: 1_700_000_000_001,
            },
        ]
    }

    #[test]
    fn test_storage_keys() {
        let keys = StorageKeys::new("secure_todo_app");
        assert_eq!(keys.todos, "secure_todo_app.todos");
        assert_eq!(keys.first_launch, "secure_todo_app.first_launch");
        assert_eq!(keys.encryption_key, "secure_todo_app.encryption_key");
    }

    #[tokio::test]
    async fn test_round_trip() {
        let repo = repository(Arc::new(MemoryVault::new()));
        let todos = sample();

        repo.save_todos(&todos).await.unwrap();
        assert_eq!(repo.load_todos().await.unwrap(), todos);
    }

    #[tokio::test]
    async fn test_round_trip_through_fallback() {
        let storage = SecureStorage::with_fallback(
            Arc::new(MemoryStore::new()),
            Arc::new(Sha256Digest),
            "secure_todo_app.encryption_key",
            RetryPolicy::immediate(1),
        );
        let repo = TodoRepository::new(Arc::new(storage), StorageKeys::new("secure_todo_app"));
        let todos = sample();

        repo.save_todos(&todos).await.unwrap();
        assert_eq!(repo.load_todos().await.unwrap(), todos);
    }

    #[tokio::test]
    async fn test_load_empty_when_absent() {
        let repo = repository(Arc::new(MemoryVault::new()));
        assert!(repo.load_todos().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let vault = Arc::new(MemoryVault::new());
        vault.set_item("secure_todo_app.todos", "invalid-json{]").await.unwrap();
        let repo = repository(vault);

        let err = repo.load_todos().await.unwrap_err();
        assert!(matches!(err, TodoError::ParseFailed));
        assert_eq!(err.to_string(), "Failed to parse stored TODO items");
    }

    #[tokio::test]
    async fn test_save_failure_is_wrapped() {
        let repo = repository(Arc::new(FlakyVault::failing(2, "Storage full")));

        let err = repo.save_todos(&sample()).await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to save TODO items"));
        assert!(err.to_string().contains("Storage full"));
    }

    #[tokio::test]
    async fn test_first_launch_flag() {
        let repo = repository(Arc::new(MemoryVault::new()));

        assert!(repo.is_first_launch().await.unwrap());
        repo.set_first_launch_complete().await.unwrap();
        assert!(!repo.is_first_launch().await.unwrap());
    }
}
