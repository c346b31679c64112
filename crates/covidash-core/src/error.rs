use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid refresh time {spec:?}: {reason}")]
    InvalidRefreshTime { spec: String, reason: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed unavailable: {0}")]
    FeedUnavailable(String),

    #[error("Unknown series field: {0}")]
    UnknownField(String),

    #[error("Not enough valid values for {field}: needed {needed}, found {found}")]
    InsufficientData {
        field: String,
        needed: usize,
        found: usize,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
