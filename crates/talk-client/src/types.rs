//! Talk bot webhook types.

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Activity type of a newly posted chat message.
pub const ACTIVITY_CREATE: &str = "Create";

/// Incoming chat event as posted by the Talk server.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub actor: Actor,
    pub object: MessageObject,
    pub target: Target,
}

impl ChatEvent {
    /// Whether the event announces a newly posted message.
    pub fn is_create(&self) -> bool {
        self.kind == ACTIVITY_CREATE
    }

    /// Conversation token the message was posted in.
    pub fn token(&self) -> &str {
        &self.target.id
    }

    /// Identifier of the posted message.
    pub fn message_id(&self) -> &str {
        &self.object.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Actor {
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Prefixed identifier, e.g. `users/alice` or `guests/abc123`.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(
        rename = "talkParticipantType",
        default,
        deserialize_with = "participant_type"
    )]
    pub participant_type: Option<ParticipantType>,
}

/// Participant role of an actor inside a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParticipantType(pub i32);

impl ParticipantType {
    pub const OWNER: Self = Self(1);
    pub const MODERATOR: Self = Self(2);
    pub const USER: Self = Self(3);
    pub const GUEST: Self = Self(4);
    pub const USER_SELF_JOINED: Self = Self(5);
    pub const GUEST_MODERATOR: Self = Self(6);
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageObject {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// JSON encoded [`MessageContent`].
    pub content: String,
    #[serde(rename = "mediaType", default)]
    pub media_type: Option<String>,
    #[serde(rename = "inReplyTo", default)]
    pub in_reply_to: Option<InReplyTo>,
}

impl MessageObject {
    /// Decode the embedded message text and parameters.
    pub fn message_content(&self) -> Result<MessageContent, serde_json::Error> {
        serde_json::from_str(&self.content)
    }
}

/// Message the event replies to.
#[derive(Debug, Clone, Deserialize)]
pub struct InReplyTo {
    pub actor: Actor,
    pub object: MessageRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageRef {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Target {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Rich object message content.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageContent {
    pub message: String,
    #[serde(default)]
    pub parameters: Parameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub server: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParameterKind {
    Call,
    User,
    UserGroup,
    Guest,
    #[serde(other)]
    Other,
}

/// Message parameters in the order the server sent them.
///
/// The server encodes an empty parameter set as `[]` instead of `{}`, and a
/// list is keyed by position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters(Vec<(String, Parameter)>);

impl Parameters {
    pub fn new(entries: Vec<(String, Parameter)>) -> Self {
        Self(entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.0.iter().map(|(key, parameter)| (key.as_str(), parameter))
    }
}

impl<'de> Deserialize<'de> for Parameters {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ParametersVisitor;

        impl<'de> Visitor<'de> for ParametersVisitor {
            type Value = Parameters;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map or list of message parameters")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Parameters, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, parameter)) = map.next_entry::<String, Parameter>()? {
                    entries.push((key, parameter));
                }
                Ok(Parameters(entries))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Parameters, A::Error> {
                let mut entries = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(parameter) = seq.next_element::<Parameter>()? {
                    entries.push((entries.len().to_string(), parameter));
                }
                Ok(Parameters(entries))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Parameters, E> {
                Ok(Parameters::default())
            }
        }

        deserializer.deserialize_any(ParametersVisitor)
    }
}

/// Outgoing chat message request.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub message: String,
    #[serde(rename = "replyTo", skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<i64>,
    #[serde(rename = "referenceId")]
    pub reference_id: String,
    pub silent: bool,
}

/// Outgoing reaction request.
#[derive(Debug, Clone, Serialize)]
pub struct ReactionRequest {
    pub reaction: String,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

// The server sends the participant type as an integer or a numeric string.
fn participant_type<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<ParticipantType>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|raw| match raw {
            Raw::Number(number) => i32::try_from(number).ok(),
            Raw::Text(text) => text.trim().parse().ok(),
        })
        .map(ParticipantType))
}
