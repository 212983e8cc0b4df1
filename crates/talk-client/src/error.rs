//! Talk client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TalkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid secret: {0}")]
    InvalidSecret(String),

    #[error("Send failed: {0}")]
    SendFailed(String),
}
