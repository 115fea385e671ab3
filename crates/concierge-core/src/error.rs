use thiserror::Error;

/// Top-level error type for Concierge.
#[derive(Debug, Error)]
pub enum ConciergeError {
    /// Error from the completion service.
    #[error("provider error: {0}")]
    Provider(String),

    /// Error from an outbound messaging channel (alerts).
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// History/lead storage error.
    #[error("memory error: {0}")]
    Memory(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
