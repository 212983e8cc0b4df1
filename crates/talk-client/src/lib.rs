//! Nextcloud Talk bot API client.

mod client;
mod error;
pub mod signature;
mod types;

pub use client::TalkClient;
pub use error::TalkError;
pub use signature::{sign, verify_signature};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_test_client(mock_server: &MockServer) -> TalkClient {
        TalkClient::new(
            mock_server.uri(),
            SecretString::new("secret".into()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn event_json(content: &str) -> serde_json::Value {
        serde_json::json!({
            "type": "Create",
            "actor": {
                "type": "Person",
                "id": "users/alice",
                "name": "Alice",
                "talkParticipantType": "1"
            },
            "object": {
                "type": "Note",
                "id": "1567",
                "name": "message",
                "content": content,
                "mediaType": "text/markdown"
            },
            "target": {
                "type": "Collection",
                "id": "n3xtc10ud",
                "name": "world"
            }
        })
    }

    #[tokio::test]
    async fn test_health_check_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/status.php"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        assert!(client.health_check().await);
    }

    #[tokio::test]
    async fn test_health_check_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/status.php"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn test_react() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ocs/v2.php/apps/spreed/api/v1/bot/n3xtc10ud/reaction/1567"))
            .and(header("OCS-APIRequest", "true"))
            .and(header_exists(signature::HEADER_BOT_RANDOM))
            .and(header_exists(signature::HEADER_BOT_SIGNATURE))
            .and(body_partial_json(serde_json::json!({ "reaction": "👍" })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.react("n3xtc10ud", "1567", "👍").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_react_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ocs/v2.php/apps/spreed/api/v1/bot/n3xtc10ud/reaction/1567"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.react("n3xtc10ud", "1567", "👎").await;

        assert!(matches!(result, Err(TalkError::Api(_))));
    }

    #[tokio::test]
    async fn test_send_message_as_reply() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ocs/v2.php/apps/spreed/api/v1/bot/n3xtc10ud/message"))
            .and(header_exists(signature::HEADER_BOT_SIGNATURE))
            .and(body_partial_json(serde_json::json!({
                "message": "Hello!",
                "replyTo": 1500,
                "silent": false
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client
            .send_message("n3xtc10ud", "Hello!", Some("1500"))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_send_message_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/ocs/v2.php/apps/spreed/api/v1/bot/n3xtc10ud/message"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Bad request"))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server).await;
        let result = client.send_message("n3xtc10ud", "Hello!", None).await;

        assert!(matches!(result, Err(TalkError::SendFailed(_))));
    }

    #[test]
    fn test_request_signature_matches_payload() {
        let signature = sign("secret", "seed", "Hello!".as_bytes()).unwrap();
        assert!(verify_signature("secret", "seed", &signature, b"Hello!"));
    }

    #[test]
    fn test_chat_event_deserialization() {
        let content = r#"{"message":"!hug {mention-user1}","parameters":{"mention-user1":{"type":"user","id":"bob","name":"Bob"}}}"#;
        let event: ChatEvent = serde_json::from_value(event_json(content)).unwrap();

        assert!(event.is_create());
        assert_eq!(event.token(), "n3xtc10ud");
        assert_eq!(event.message_id(), "1567");
        assert_eq!(event.actor.id, "users/alice");
        assert_eq!(event.actor.participant_type, Some(ParticipantType::OWNER));
        assert!(event.object.in_reply_to.is_none());

        let content = event.object.message_content().unwrap();
        assert_eq!(content.message, "!hug {mention-user1}");
        assert_eq!(content.parameters.iter().count(), 1);
        let (key, parameter) = content.parameters.iter().next().unwrap();
        assert_eq!(key, "mention-user1");
        assert_eq!(parameter.kind, ParameterKind::User);
        assert_eq!(parameter.id, "bob");
        assert!(parameter.server.is_none());
    }

    #[test]
    fn test_participant_type_as_number() {
        let mut json = event_json(r#"{"message":"hi","parameters":[]}"#);
        json["actor"]["talkParticipantType"] = serde_json::json!(2);

        let event: ChatEvent = serde_json::from_value(json).unwrap();
        assert_eq!(event.actor.participant_type, Some(ParticipantType::MODERATOR));
    }

    #[test]
    fn test_participant_type_missing() {
        let mut json = event_json(r#"{"message":"hi","parameters":[]}"#);
        json["actor"]
            .as_object_mut()
            .unwrap()
            .remove("talkParticipantType");

        let event: ChatEvent = serde_json::from_value(json).unwrap();
        assert!(event.actor.participant_type.is_none());
    }

    #[test]
    fn test_empty_parameters_as_list() {
        let event: ChatEvent =
            serde_json::from_value(event_json(r#"{"message":"!hello","parameters":[]}"#)).unwrap();

        let content = event.object.message_content().unwrap();
        assert!(content.parameters.iter().next().is_none());
    }

    #[test]
    fn test_parameters_keep_order() {
        let content = r#"{"message":"{z} {a}","parameters":{
            "z":{"type":"user-group","id":"admins","name":"Admins"},
            "a":{"type":"file","id":"42","name":"report.pdf"},
            "m":{"type":"user","id":"carol","name":"Carol","server":"cloud.example.com"}
        }}"#;
        let content: MessageContent = serde_json::from_str(content).unwrap();

        let keys: Vec<&str> = content.parameters.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);

        let kinds: Vec<ParameterKind> = content.parameters.iter().map(|(_, p)| p.kind).collect();
        assert_eq!(
            kinds,
            vec![ParameterKind::UserGroup, ParameterKind::Other, ParameterKind::User]
        );
    }

    #[test]
    fn test_in_reply_to_deserialization() {
        let mut json = event_json(r#"{"message":"!hello","parameters":[]}"#);
        json["object"]["inReplyTo"] = serde_json::json!({
            "actor": { "type": "Person", "id": "users/bob", "name": "Bob" },
            "object": { "type": "Note", "id": 1500, "name": "message" }
        });

        let event: ChatEvent = serde_json::from_value(json).unwrap();
        let reply = event.object.in_reply_to.unwrap();
        assert_eq!(reply.actor.id, "users/bob");
        assert_eq!(reply.object.id, "1500");
    }
}
