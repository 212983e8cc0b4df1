//! Command registry types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-defined command of one conversation.
///
/// Unique on `(token, command)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDefinition {
    /// Auto-increment id, 0 until stored.
    #[serde(default)]
    pub id: u64,
    /// Conversation token.
    pub token: String,
    /// Lowercase keyword including its `!`/`?` prefix.
    pub command: String,
    /// Response template, may be empty.
    #[serde(default)]
    pub message: String,
    /// How often `{count}` was expanded.
    #[serde(default)]
    pub count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommandDefinition {
    /// Create an unsaved definition.
    pub fn new(token: &str, command: &str, message: &str) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            token: token.to_string(),
            command: command.to_string(),
            message: message.to_string(),
            count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the response template.
    pub fn set_message(&mut self, message: &str) {
        self.message = message.to_string();
        self.updated_at = Utc::now();
    }

    pub(crate) fn key(&self) -> (String, String) {
        (self.token.clone(), self.command.clone())
    }
}
