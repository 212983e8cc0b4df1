//! Talk bot HTTP client.

use crate::error::TalkError;
use crate::signature::{random_seed, sign, HEADER_BOT_RANDOM, HEADER_BOT_SIGNATURE};
use crate::types::*;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const BOT_API_PATH: &str = "ocs/v2.php/apps/spreed/api/v1/bot";

/// Client for the Talk bot API of one Nextcloud server.
#[derive(Clone)]
pub struct TalkClient {
    client: Client,
    base_url: String,
    secret: Arc<SecretString>,
}

impl TalkClient {
    /// Create a new Talk client.
    pub fn new(
        base_url: impl Into<String>,
        secret: SecretString,
        timeout: Duration,
    ) -> Result<Self, TalkError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret: Arc::new(secret),
        })
    }

    /// Base URL of the Nextcloud server.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the Nextcloud server is reachable.
    pub async fn health_check(&self) -> bool {
        self.client
            .get(format!("{}/status.php", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// React to a message.
    #[instrument(skip(self))]
    pub async fn react(
        &self,
        token: &str,
        message_id: &str,
        reaction: &str,
    ) -> Result<(), TalkError> {
        let request = ReactionRequest {
            reaction: reaction.to_string(),
        };
        let url = format!(
            "{}/{}/{}/reaction/{}",
            self.base_url, BOT_API_PATH, token, message_id
        );

        let response = self
            .signed(self.client.post(url), reaction)?
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            warn!("Reaction failed: {}", msg);
            return Err(TalkError::Api(msg));
        }

        debug!("Reacted to {} in {}", message_id, token);
        Ok(())
    }

    /// Post a message to a conversation, optionally as a reply.
    #[instrument(skip(self, message))]
    pub async fn send_message(
        &self,
        token: &str,
        message: &str,
        reply_to: Option<&str>,
    ) -> Result<(), TalkError> {
        let reply_to = reply_to.and_then(|id| match id.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                debug!("Ignoring non-numeric reply target {}", id);
                None
            }
        });
        let request = SendMessageRequest {
            message: message.to_string(),
            reply_to,
            reference_id: random_seed(),
            silent: false,
        };
        let url = format!("{}/{}/{}/message", self.base_url, BOT_API_PATH, token);

        let response = self
            .signed(self.client.post(url), message)?
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            warn!("Send failed: {}", msg);
            return Err(TalkError::SendFailed(msg));
        }

        debug!("Sent message to {}", token);
        Ok(())
    }

    fn signed(&self, request: RequestBuilder, payload: &str) -> Result<RequestBuilder, TalkError> {
        let random = random_seed();
        let signature = sign(self.secret.expose_secret(), &random, payload.as_bytes())?;

        Ok(request
            .header("OCS-APIRequest", "true")
            .header("Accept", "application/json")
            .header(HEADER_BOT_RANDOM, random)
            .header(HEADER_BOT_SIGNATURE, signature))
    }
}
