//! Secure TODO Vault - Data Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TodoError, TodoResult};

/// Longest accepted description, counted in characters after trimming
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// A single TODO entry.
///
/// The whole collection is the unit of persistence; field names are kept in
/// camelCase on the wire so stored lists round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    /// Unique ID
    pub id: String,
    /// Non-empty, trimmed description
    pub description: String,
    /// Completion flag
    pub is_completed: bool,
    /// Creation time (epoch milliseconds)
    pub created_at: i64,
}

impl TodoItem {
    /// Create a fresh, incomplete item with a new unique ID.
    ///
    /// `description` must already be validated.
    pub fn new(description: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            is_completed: false,
            created_at,
        }
    }
}

/// Trim and validate a description before it may enter the collection
pub fn validate_description(raw: &str) -> TodoResult<String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(TodoError::EmptyDescription);
    }

    if trimmed.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(TodoError::DescriptionTooLong {
            max: MAX_DESCRIPTION_LENGTH,
        });
    }

    Ok(trimmed.to_string())
}

/// Authentication session as seen by the UI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Is authenticated
    pub is_authenticated: bool,
    /// Most recent attempt (success or failure)
    pub last_auth_time: Option<DateTime<Utc>>,
    /// Failed attempts since the last success or logout
    pub failed_attempts: u32,
}
