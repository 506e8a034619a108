use thiserror::Error;

/// Main error type for the scoreboard watcher
#[derive(Error, Debug)]
pub enum PodiumError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed unavailable: {0}")]
    FeedUnavailable(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    // Notification errors
    #[error("Delivery failed: {0}")]
    Delivery(String),

    // Durable state errors
    #[error("Persistence failed: {0}")]
    Persistence(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl PodiumError {
    /// True for errors the poll loop must not swallow.
    ///
    /// A failed durable write leaves the in-memory announced set ahead of the
    /// on-disk copy; continuing would diverge further on every tick, so the
    /// process stops instead.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PodiumError::Persistence(_))
    }
}

/// Result type alias for PodiumError
pub type Result<T> = std::result::Result<T, PodiumError>;
