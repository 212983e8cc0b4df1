use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Command not found: {token}/{command}")]
    NotFound { token: String, command: String },

    #[error("Unsupported store version {0}")]
    UnsupportedVersion(u32),
}
