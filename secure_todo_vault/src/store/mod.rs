//! Secure TODO Vault - UI State Containers

pub mod auth_store;
pub mod todo_store;

pub use auth_store::{AuthSessionState, AuthSessionStore};
pub use todo_store::{TodoListState, TodoListStore, SAMPLE_TODOS};
