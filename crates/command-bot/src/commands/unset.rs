//! Unset command - removes a command of the conversation.

use crate::commands::{CommandHandler, Invocation, Reply, REACTION_FAILURE, REACTION_SUCCESS};
use crate::error::AppResult;
use crate::parser;
use async_trait::async_trait;
use command_store::CommandRegistry;
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub struct UnsetHandler {
    registry: Arc<dyn CommandRegistry>,
}

impl UnsetHandler {
    pub fn new(registry: Arc<dyn CommandRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl CommandHandler for UnsetHandler {
    fn name(&self) -> &str {
        "unset"
    }

    fn triggers(&self) -> &[&str] {
        &["!unset"]
    }

    #[instrument(skip(self, invocation), fields(token = %invocation.token()))]
    async fn execute(&self, invocation: &Invocation<'_>) -> AppResult<Reply> {
        if !invocation.is_moderator() {
            debug!("Can not use !unset unless being a moderator");
            return Ok(Reply::Silent);
        }

        let keyword = parser::normalize_keyword(invocation.remainder.trim());
        if keyword.is_empty() {
            return Ok(Reply::Reaction(REACTION_FAILURE));
        }

        let Some(definition) = self.registry.get(invocation.token(), &keyword).await? else {
            debug!("No command {} to unset", keyword);
            return Ok(Reply::Reaction(REACTION_FAILURE));
        };

        if !self.registry.delete(&definition).await? {
            return Ok(Reply::Reaction(REACTION_FAILURE));
        }

        info!("Command {} unset by {}", keyword, invocation.event.actor.id);
        Ok(Reply::Reaction(REACTION_SUCCESS))
    }
}
