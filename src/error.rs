use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown document: {0}")]
    UnknownDocument(String),

    #[error("unknown document kind: {0}")]
    UnknownKind(String),

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ReconError>;
