//! Custom command - answers with a stored template.

use crate::commands::{CommandHandler, Invocation, Reply, REACTION_FAILURE};
use crate::error::AppResult;
use crate::placeholders::{Substitution, TemplateContext};
use async_trait::async_trait;
use command_store::{CommandRegistry, StoreError};
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct CustomHandler {
    registry: Arc<dyn CommandRegistry>,
}

impl CustomHandler {
    pub fn new(registry: Arc<dyn CommandRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl CommandHandler for CustomHandler {
    fn name(&self) -> &str {
        "custom"
    }

    fn is_default(&self) -> bool {
        true
    }

    #[instrument(skip(self, invocation), fields(token = %invocation.token(), command = %invocation.command))]
    async fn execute(&self, invocation: &Invocation<'_>) -> AppResult<Reply> {
        let Some(definition) = self
            .registry
            .get(invocation.token(), &invocation.command)
            .await?
        else {
            debug!("Unknown command");
            return Ok(Reply::Reaction(REACTION_FAILURE));
        };

        let context = TemplateContext {
            text: invocation.remainder.trim(),
            parameters: invocation.parameters,
            actor_id: &invocation.event.actor.id,
        };

        let Some(substitution) = Substitution::prepare(&definition.message, &context) else {
            debug!("Template needs a mention but the message has none");
            return Ok(Reply::Silent);
        };

        let count = if substitution.needs_count() {
            match self.registry.increment_count(&definition).await {
                Ok(count) => Some(count),
                Err(StoreError::NotFound { .. }) => {
                    debug!("Command removed while being answered");
                    return Ok(Reply::Reaction(REACTION_FAILURE));
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            None
        };

        Ok(Reply::Answer(substitution.render(count)))
    }
}
