//! Error types for the medrag answer pipeline.
//!
//! This module defines a unified error enum covering every failure category
//! in the system: configuration, I/O, embedding, vector index, language
//! model, history store, and prompt errors.

use thiserror::Error;

/// Unified error type for the medrag answer pipeline.
///
/// All fallible functions return `Result<T, AppError>`. Component-level
/// failures (embedding, index, LLM, history) are caught at the component
/// boundary and converted into degraded-but-defined answers; none of them
/// escapes the orchestrator.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Query embedding errors (network, quota, malformed response)
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index errors (timeout, auth, not-found)
    #[error("Index error: {0}")]
    Index(String),

    /// Language model errors (any refinement stage call)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Conversation history store errors
    #[error("History error: {0}")]
    History(String),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
