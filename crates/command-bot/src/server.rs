//! Webhook endpoint the Talk server posts chat events to.

use crate::engine::{CommandEngine, OutboundAction};
use crate::error::AppError;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use talk_client::signature::{HEADER_BACKEND, HEADER_RANDOM, HEADER_SIGNATURE};
use talk_client::{verify_signature, ChatEvent, TalkClient, ACTIVITY_CREATE};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<CommandEngine>,
    pub talk: Arc<TalkClient>,
    pub secret: Arc<SecretString>,
    /// Backend URL webhooks must announce.
    pub backend_url: String,
}

impl AppState {
    pub fn new(
        engine: CommandEngine,
        talk: TalkClient,
        secret: SecretString,
        backend_url: &str,
    ) -> Self {
        Self {
            engine: Arc::new(engine),
            talk: Arc::new(talk),
            secret: Arc::new(secret),
            backend_url: normalize_url(backend_url),
        }
    }
}

/// Activity type of a webhook, read before the full chat event.
#[derive(Debug, Deserialize)]
struct Activity {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub actions: Vec<OutboundAction>,
}

/// Create the webhook router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<WebhookResponse>), AppError> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    let backend = header(HEADER_BACKEND).map(normalize_url);
    if backend.as_deref() != Some(state.backend_url.as_str()) {
        debug!("Ignoring webhook from unknown backend {:?}", backend);
        return Ok(ignored(StatusCode::UNAUTHORIZED));
    }

    let (Some(random), Some(signature)) = (header(HEADER_RANDOM), header(HEADER_SIGNATURE))
    else {
        debug!("Ignoring unsigned webhook");
        return Ok(ignored(StatusCode::UNAUTHORIZED));
    };

    if !verify_signature(state.secret.expose_secret(), random, signature, &body) {
        warn!("Ignoring webhook with invalid signature");
        return Ok(ignored(StatusCode::UNAUTHORIZED));
    }

    let activity: Activity = match serde_json::from_slice(&body) {
        Ok(activity) => activity,
        Err(e) => {
            debug!("Ignoring undecodable webhook: {}", e);
            return Ok(ignored(StatusCode::BAD_REQUEST));
        }
    };
    if activity.kind != ACTIVITY_CREATE {
        debug!("Ignoring {} activity", activity.kind);
        return Ok(ignored(StatusCode::OK));
    }

    let event: ChatEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            debug!("Ignoring undecodable chat message: {}", e);
            return Ok(ignored(StatusCode::BAD_REQUEST));
        }
    };

    let actions = state.engine.handle(&event).await?;
    deliver(&state.talk, &event, &actions).await;

    Ok((StatusCode::OK, Json(WebhookResponse { actions })))
}

/// Post actions back to Talk. Failures are logged, not retried.
async fn deliver(talk: &TalkClient, event: &ChatEvent, actions: &[OutboundAction]) {
    for action in actions {
        let result = match action {
            OutboundAction::Reaction { emoji } => {
                talk.react(event.token(), event.message_id(), emoji).await
            }
            OutboundAction::Answer { text, reply_to } => {
                talk.send_message(event.token(), text, reply_to.as_deref())
                    .await
            }
        };

        match result {
            Ok(()) => info!("Delivered {:?} to {}", action, event.token()),
            Err(e) => error!("Failed to deliver {:?}: {}", action, e),
        }
    }
}

fn ignored(status: StatusCode) -> (StatusCode, Json<WebhookResponse>) {
    (status, Json(WebhookResponse { actions: Vec::new() }))
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
