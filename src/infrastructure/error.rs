use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("network error: {0}")]
    Transport(String),
    #[error("schedule store error: http {status}; body={body}")]
    Api { status: u16, body: String },
    #[error("invalid schedule payload: {0}")]
    InvalidPayload(String),
    #[error("credential error: {0}")]
    Credential(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
