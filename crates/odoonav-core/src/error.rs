use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("remote fault {code}: {message}")]
    Fault { code: i64, message: String },

    #[error("could not decode store response: {0}")]
    Decode(String),

    #[error("authentication failed: {0}")]
    Authentication(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    #[error("oracle transport error: {0}")]
    Transport(String),

    #[error("oracle timed out after {0:?}")]
    Timeout(Duration),

    #[error("oracle returned malformed content: {0}")]
    Malformed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{stage} stage failed: {message}")]
    StagePanicked {
        stage: &'static str,
        message: String,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("literal parse error at offset {offset}: {message}")]
pub struct LiteralError {
    pub offset: usize,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("journal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("journal serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration: {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("invalid base url {url}: {reason}")]
    BaseUrl { url: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
