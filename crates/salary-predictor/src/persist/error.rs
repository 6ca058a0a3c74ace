//! Persistence errors.

/// Errors reading a persisted pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing schema_version field")]
    MissingVersion,

    #[error("unsupported schema version {0:?}")]
    UnsupportedVersion(String),

    #[error("unsupported model type {0:?}")]
    UnsupportedModelType(String),

    #[error("invalid pipeline: {0}")]
    Validation(String),
}

/// Errors writing a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
