use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("source returned invalid data: {0}")]
    InvalidResponse(String),

    #[error("source unavailable: {0}")]
    Unavailable(String),
}
