//! Application error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Talk error: {0}")]
    Talk(#[from] talk_client::TalkError),

    #[error("Command store error: {0}")]
    Store(#[from] command_store::StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = match &self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Talk(_) => "TALK_ERROR",
            AppError::Store(_) => "STORE_ERROR",
            AppError::Io(_) => "IO_ERROR",
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
