//! Error types for the history assistant.

/// Top-level error type for the assistant.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Recognizer error: {0}")]
    Nlu(#[from] NluError),

    #[error("Knowledge base error: {0}")]
    Kb(#[from] KbError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Intent recognizer errors.
#[derive(Debug, thiserror::Error)]
pub enum NluError {
    #[error("Recognizer request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Invalid recognizer response: {reason}")]
    InvalidResponse { reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Knowledge-base service errors.
#[derive(Debug, thiserror::Error)]
pub enum KbError {
    #[error("Knowledge base request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Invalid knowledge base response: {reason}")]
    InvalidResponse { reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// User memory store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send response on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Invalid message format: {0}")]
    InvalidMessage(String),
}

/// Turn dispatch errors.
///
/// Collaborator failures are wrapped, not handled: the dispatcher
/// propagates them to the host, which owns the failed-turn policy.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Recognizer error: {0}")]
    Nlu(#[from] NluError),

    #[error("Knowledge base error: {0}")]
    Kb(#[from] KbError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Response serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for the assistant.
pub type Result<T> = std::result::Result<T, Error>;
