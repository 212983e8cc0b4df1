//! Common test utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use command_bot::CommandEngine;
use command_store::{CommandDefinition, CommandRegistry, CommandStore, StoreError};
use mockall::mock;
use serde_json::{json, Value};
use std::sync::Arc;
use talk_client::ChatEvent;

/// Conversation token used by all test events.
pub const TOKEN: &str = "n3xtc10ud";
/// Id of the message carried by all test events.
pub const MESSAGE_ID: &str = "1567";

pub const OWNER: i32 = 1;
pub const MODERATOR: i32 = 2;
pub const USER: i32 = 3;

mock! {
    pub Registry {}

    #[async_trait]
    impl CommandRegistry for Registry {
        async fn get(
            &self,
            token: &str,
            command: &str,
        ) -> Result<Option<CommandDefinition>, StoreError>;
        async fn list_all(&self, token: &str) -> Result<Vec<CommandDefinition>, StoreError>;
        async fn upsert(
            &self,
            definition: CommandDefinition,
        ) -> Result<CommandDefinition, StoreError>;
        async fn delete(&self, definition: &CommandDefinition) -> Result<bool, StoreError>;
        async fn increment_count(&self, definition: &CommandDefinition) -> Result<u64, StoreError>;
    }
}

/// Registry error standing in for an unavailable backend.
pub fn unavailable() -> StoreError {
    StoreError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        "registry unavailable",
    ))
}

/// Engine over a fresh in-memory store.
pub fn engine() -> (CommandEngine, CommandStore) {
    let store = CommandStore::memory();
    let registry: Arc<dyn CommandRegistry> = Arc::new(store.clone());
    (CommandEngine::new(registry), store)
}

/// Builder for chat events in the wire format of the Talk server.
pub struct EventBuilder {
    kind: String,
    actor_id: String,
    participant_type: Option<Value>,
    message: String,
    parameters: Vec<(String, Value)>,
    in_reply_to: Option<Value>,
}

impl EventBuilder {
    pub fn new(message: &str) -> Self {
        Self {
            kind: "Create".into(),
            actor_id: "users/alice".into(),
            participant_type: Some(json!(USER.to_string())),
            message: message.into(),
            parameters: Vec::new(),
            in_reply_to: None,
        }
    }

    pub fn kind(mut self, kind: &str) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn actor(mut self, actor_id: &str) -> Self {
        self.actor_id = actor_id.into();
        self
    }

    pub fn participant_type(mut self, participant_type: i32) -> Self {
        self.participant_type = Some(json!(participant_type.to_string()));
        self
    }

    pub fn without_participant_type(mut self) -> Self {
        self.participant_type = None;
        self
    }

    pub fn parameter(mut self, key: &str, kind: &str, id: &str, name: &str) -> Self {
        self.parameters
            .push((key.into(), json!({ "type": kind, "id": id, "name": name })));
        self
    }

    pub fn reply_to(mut self, actor_id: &str, message_id: &str) -> Self {
        self.in_reply_to = Some(json!({
            "actor": { "type": "Person", "id": actor_id, "name": "Earlier author" },
            "object": { "type": "Note", "id": message_id, "name": "message" }
        }));
        self
    }

    pub fn to_json(&self) -> Value {
        // The server sends an empty parameter set as a list.
        let parameters = if self.parameters.is_empty() {
            json!([])
        } else {
            Value::Object(self.parameters.iter().cloned().collect())
        };
        let content = json!({ "message": self.message, "parameters": parameters });

        let mut actor = json!({ "type": "Person", "id": self.actor_id, "name": "Alice" });
        if let Some(participant_type) = &self.participant_type {
            actor["talkParticipantType"] = participant_type.clone();
        }

        let mut object = json!({
            "type": "Note",
            "id": MESSAGE_ID,
            "name": "message",
            "content": content.to_string(),
            "mediaType": "text/markdown"
        });
        if let Some(in_reply_to) = &self.in_reply_to {
            object["inReplyTo"] = in_reply_to.clone();
        }

        json!({
            "type": self.kind,
            "actor": actor,
            "object": object,
            "target": { "type": "Collection", "id": TOKEN, "name": "world" }
        })
    }

    pub fn build(&self) -> ChatEvent {
        serde_json::from_value(self.to_json()).unwrap()
    }
}

/// Event from a moderator.
pub fn moderator(message: &str) -> EventBuilder {
    EventBuilder::new(message).participant_type(MODERATOR)
}

/// Event from a regular participant.
pub fn user(message: &str) -> EventBuilder {
    EventBuilder::new(message).participant_type(USER)
}
