//! Error types for the moodlog core library

use thiserror::Error;

/// Result type alias for moodlog operations
pub type MoodResult<T> = Result<T, MoodError>;

/// Errors raised while classifying, persisting, or configuring
#[derive(Error, Debug)]
pub enum MoodError {
    #[error("Classifier request failed: {0}")]
    Classifier(String),

    #[error("Classifier returned {0}: {1}")]
    ClassifierStatus(u16, String),

    #[error("Classifier returned no emotions")]
    EmptyClassification,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for MoodError {
    fn from(err: reqwest::Error) -> Self {
        MoodError::Classifier(err.to_string())
    }
}

impl From<config::ConfigError> for MoodError {
    fn from(err: config::ConfigError) -> Self {
        MoodError::Config(err.to_string())
    }
}
