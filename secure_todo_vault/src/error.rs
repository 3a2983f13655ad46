//! Secure TODO Vault - Error Types

use thiserror::Error;

/// Result type for vault operations
pub type TodoResult<T> = Result<T, TodoError>;

/// Failure reported by an opaque platform collaborator
/// (secure vault, fallback store, digest, biometric prompt).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct PlatformError(pub String);

impl PlatformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Vault error types
#[derive(Error, Debug)]
pub enum TodoError {
    // ═══════════════════════════════════════════════════════════════
    // SECURE STORAGE ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Failed to save item: {source}")]
    SaveFailed {
        #[source]
        source: Box<TodoError>,
    },

    #[error("Failed to retrieve item: {source}")]
    RetrieveFailed {
        #[source]
        source: Box<TodoError>,
    },

    #[error("Failed to delete item: {source}")]
    DeleteFailed {
        #[source]
        source: Box<TodoError>,
    },

    #[error("Invalid encrypted data format")]
    InvalidEncryptedFormat,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Stored payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("{0}")]
    Platform(#[from] PlatformError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ═══════════════════════════════════════════════════════════════
    // REPOSITORY ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Failed to save TODO items: {source}")]
    SaveTodosFailed {
        #[source]
        source: Box<TodoError>,
    },

    #[error("Failed to parse stored TODO items")]
    ParseFailed,

    #[error("Serialization error: {0}")]
    Serialization(String),

    // ═══════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Description cannot be empty")]
    EmptyDescription,

    #[error("Description cannot exceed {max} characters")]
    DescriptionTooLong { max: usize },

    // ═══════════════════════════════════════════════════════════════
    // CONFIG ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TodoError {
    pub(crate) fn save_failed(source: TodoError) -> Self {
        TodoError::SaveFailed { source: Box::new(source) }
    }

    pub(crate) fn retrieve_failed(source: TodoError) -> Self {
        TodoError::RetrieveFailed { source: Box::new(source) }
    }

    pub(crate) fn delete_failed(source: TodoError) -> Self {
        TodoError::DeleteFailed { source: Box::new(source) }
    }

    pub(crate) fn save_todos_failed(source: TodoError) -> Self {
        TodoError::SaveTodosFailed { source: Box::new(source) }
    }

    /// Check if a retry could plausibly succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, TodoError::Platform(_) | TodoError::Io(_))
    }

    /// Check if stored data is malformed (never retried)
    pub fn is_corruption(&self) -> bool {
        match self {
            TodoError::InvalidEncryptedFormat
            | TodoError::Base64(_)
            | TodoError::Utf8(_)
            | TodoError::ParseFailed => true,
            TodoError::SaveFailed { source }
            | TodoError::RetrieveFailed { source }
            | TodoError::DeleteFailed { source }
            | TodoError::SaveTodosFailed { source } => source.is_corruption(),
            _ => false,
        }
    }

    /// Check if input was rejected before any I/O
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TodoError::EmptyDescription | TodoError::DescriptionTooLong { .. }
        )
    }
}

impl From<serde_json::Error> for TodoError {
    fn from(e: serde_json::Error) -> Self {
        TodoError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_messages() {
        let err = TodoError::save_failed(PlatformError::new("Storage quota exceeded").into());
        assert_eq!(err.to_string(), "Failed to save item: Storage quota exceeded");

        let err = TodoError::save_todos_failed(err);
        assert_eq!(
            err.to_string(),
            "Failed to save TODO items: Failed to save item: Storage quota exceeded"
        );
    }

    #[test]
    fn test_classification() {
        assert!(TodoError::Platform(PlatformError::new("denied")).is_transient());
        assert!(!TodoError::InvalidEncryptedFormat.is_transient());
        assert!(TodoError::retrieve_failed(TodoError::InvalidEncryptedFormat).is_corruption());
        assert!(TodoError::DescriptionTooLong { max: 500 }.is_validation());
        assert!(!TodoError::ParseFailed.is_validation());
    }
}
