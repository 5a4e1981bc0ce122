use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Row index {index} out of range (source has {len} rows)")]
    OutOfRange { index: usize, len: usize },

    #[error("Error reading template file: {0}")]
    TemplateRead(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source error: {0}")]
    Source(String),

    #[error("Resolution error: {0}")]
    Resolution(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MailerError>;
