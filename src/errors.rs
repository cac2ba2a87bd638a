use thiserror::Error;

use crate::storage::ProviderError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Listing objects in bucket {bucket} failed: {source}")]
    EnumerationFailed {
        bucket: String,
        #[source]
        source: ProviderError,
    },

    #[error("Restore already in progress for \"{key}\": {source}")]
    RestoreConflict {
        key: String,
        #[source]
        source: ProviderError,
    },

    #[error("Restore request for \"{key}\" failed: {source}")]
    RestoreFailed {
        key: String,
        #[source]
        source: ProviderError,
    },

    #[error("Transition of \"{key}\" failed: {source}")]
    TransitionFailed {
        key: String,
        #[source]
        source: ProviderError,
    },

    #[error("Restore status check for \"{key}\" failed: {source}")]
    StatusCheckFailed {
        key: String,
        #[source]
        source: ProviderError,
    },

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
