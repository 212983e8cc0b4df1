//! Set command - creates or replaces a command of the conversation.

use crate::commands::{CommandHandler, Invocation, Reply, REACTION_FAILURE, REACTION_SUCCESS};
use crate::error::AppResult;
use crate::parser;
use async_trait::async_trait;
use command_store::{CommandDefinition, CommandRegistry};
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub struct SetHandler {
    registry: Arc<dyn CommandRegistry>,
}

impl SetHandler {
    pub fn new(registry: Arc<dyn CommandRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl CommandHandler for SetHandler {
    fn name(&self) -> &str {
        "set"
    }

    fn triggers(&self) -> &[&str] {
        &["!set"]
    }

    #[instrument(skip(self, invocation), fields(token = %invocation.token()))]
    async fn execute(&self, invocation: &Invocation<'_>) -> AppResult<Reply> {
        if !invocation.is_moderator() {
            debug!("Can not use !set unless being a moderator");
            return Ok(Reply::Silent);
        }

        let Some(argument) = parser::parse_set_argument(invocation.remainder) else {
            debug!("Malformed !set argument");
            return Ok(Reply::Reaction(REACTION_FAILURE));
        };

        let token = invocation.token();
        let definition = match self.registry.get(token, &argument.keyword).await? {
            Some(mut existing) => {
                existing.set_message(argument.template);
                existing
            }
            None => CommandDefinition::new(token, &argument.keyword, argument.template),
        };

        let stored = self.registry.upsert(definition).await?;
        info!("Command {} set by {}", stored.command, invocation.event.actor.id);

        Ok(Reply::Reaction(REACTION_SUCCESS))
    }
}
