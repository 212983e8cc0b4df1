//! Bot command handlers.

mod custom;
mod list;
mod set;
mod unset;

pub use custom::CustomHandler;
pub use list::ListHandler;
pub use set::SetHandler;
pub use unset::UnsetHandler;

use crate::error::AppResult;
use crate::permissions;
use async_trait::async_trait;
use talk_client::{ChatEvent, Parameters, ParticipantType};

/// Reaction for a command that did what it was asked to.
pub const REACTION_SUCCESS: &str = "👍";
/// Reaction for a malformed or unknown command.
pub const REACTION_FAILURE: &str = "👎";

/// A recognized command in a chat event.
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    pub event: &'a ChatEvent,
    pub participant_type: ParticipantType,
    /// Lowercase command word.
    pub command: String,
    /// Text after the command word.
    pub remainder: &'a str,
    pub parameters: &'a Parameters,
}

impl Invocation<'_> {
    /// Conversation token.
    pub fn token(&self) -> &str {
        self.event.token()
    }

    pub fn is_moderator(&self) -> bool {
        permissions::is_moderator(self.participant_type)
    }
}

/// What a handler wants posted back to the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Nothing at all.
    Silent,
    Reaction(&'static str),
    Answer(String),
}

/// Command handler trait.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Handler name (e.g., "set", "list").
    fn name(&self) -> &str;

    /// Command words handled (e.g., "!set").
    fn triggers(&self) -> &[&str] {
        &[]
    }

    /// Whether this handler takes every command no other handler claims.
    fn is_default(&self) -> bool {
        false
    }

    /// Check if this handler matches the command word.
    fn matches(&self, command: &str) -> bool {
        let triggers = self.triggers();
        if triggers.is_empty() {
            self.is_default()
        } else {
            triggers.contains(&command)
        }
    }

    /// Execute the command.
    async fn execute(&self, invocation: &Invocation<'_>) -> AppResult<Reply>;
}
