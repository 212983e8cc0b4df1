//! List command - shows the commands of the conversation.

use crate::commands::{CommandHandler, Invocation, Reply};
use crate::error::AppResult;
use crate::listing;
use async_trait::async_trait;
use command_store::CommandRegistry;
use std::sync::Arc;

pub struct ListHandler {
    registry: Arc<dyn CommandRegistry>,
}

impl ListHandler {
    pub fn new(registry: Arc<dyn CommandRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl CommandHandler for ListHandler {
    fn name(&self) -> &str {
        "list"
    }

    fn triggers(&self) -> &[&str] {
        &["!command", "!commands"]
    }

    async fn execute(&self, invocation: &Invocation<'_>) -> AppResult<Reply> {
        let definitions = self.registry.list_all(invocation.token()).await?;
        Ok(Reply::Answer(listing::render_listing(
            &definitions,
            invocation.is_moderator(),
        )))
    }
}
