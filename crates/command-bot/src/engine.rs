//! Turns one chat event into the actions to post back.

use crate::commands::*;
use crate::error::AppResult;
use crate::parser;
use crate::placeholders::{is_bot, sender_mention};
use command_store::CommandRegistry;
use serde::Serialize;
use std::sync::Arc;
use talk_client::ChatEvent;
use tracing::{debug, instrument};

/// Action to deliver to the conversation an event came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OutboundAction {
    /// React to the triggering message.
    Reaction { emoji: String },
    /// Post a message, optionally as a reply to an earlier one.
    Answer {
        text: String,
        reply_to: Option<String>,
    },
}

pub struct CommandEngine {
    handlers: Vec<Box<dyn CommandHandler>>,
}

impl CommandEngine {
    /// Engine with the built-in handlers on top of `registry`.
    pub fn new(registry: Arc<dyn CommandRegistry>) -> Self {
        Self::with_handlers(vec![
            Box::new(SetHandler::new(registry.clone())),
            Box::new(UnsetHandler::new(registry.clone())),
            Box::new(ListHandler::new(registry.clone())),
            Box::new(CustomHandler::new(registry)),
        ])
    }

    /// Handlers are tried in order; the first match wins.
    pub fn with_handlers(handlers: Vec<Box<dyn CommandHandler>>) -> Self {
        Self { handlers }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Process one chat event.
    ///
    /// Events that are not commands yield no actions. Registry failures are
    /// returned to the caller.
    #[instrument(skip(self, event), fields(token = %event.token(), message = %event.message_id()))]
    pub async fn handle(&self, event: &ChatEvent) -> AppResult<Vec<OutboundAction>> {
        if !event.is_create() {
            debug!("Not an event from creating a chat message: {}", event.kind);
            return Ok(Vec::new());
        }

        let Some(participant_type) = event.actor.participant_type else {
            debug!("Missing participant type in data");
            return Ok(Vec::new());
        };

        let content = match event.object.message_content() {
            Ok(content) => content,
            Err(e) => {
                debug!("Undecodable message content: {}", e);
                return Ok(Vec::new());
            }
        };

        if !parser::is_command(&content.message) {
            return Ok(Vec::new());
        }

        let (command, remainder) = parser::split_first_word(&content.message);
        let invocation = Invocation {
            event,
            participant_type,
            command: parser::normalize_keyword(command),
            remainder,
            parameters: &content.parameters,
        };

        let Some(handler) = self.handlers.iter().find(|h| h.matches(&invocation.command)) else {
            return Ok(Vec::new());
        };

        debug!("Dispatching {} to {} handler", invocation.command, handler.name());
        let reply = handler.execute(&invocation).await?;

        Ok(actions_for(event, reply))
    }
}

fn actions_for(event: &ChatEvent, reply: Reply) -> Vec<OutboundAction> {
    match reply {
        Reply::Silent => Vec::new(),
        Reply::Reaction(emoji) => vec![OutboundAction::Reaction {
            emoji: emoji.to_string(),
        }],
        Reply::Answer(text) if text.is_empty() => Vec::new(),
        Reply::Answer(text) => vec![address_answer(event, text)],
    }
}

/// Answers to a reply are themselves a reply to the same earlier message,
/// mentioning its author, unless that author is a bot.
fn address_answer(event: &ChatEvent, text: String) -> OutboundAction {
    match &event.object.in_reply_to {
        Some(parent) if !is_bot(&parent.actor.id) => OutboundAction::Answer {
            text: format!("{} {}", sender_mention(&parent.actor.id), text),
            reply_to: Some(parent.object.id.clone()),
        },
        _ => OutboundAction::Answer {
            text,
            reply_to: None,
        },
    }
}
