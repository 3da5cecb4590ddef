//! Error types for Sourced.
//!
//! This module defines a unified error enum that covers every failure the
//! answer pipeline can observe. Search and fetch failures are absorbed inside
//! the retrieval step; configuration, LLM, prompt and timeout failures reach
//! the caller.

use std::time::Duration;
use thiserror::Error;

/// Unified error type for Sourced.
///
/// All fallible functions return `Result<T, AppError>`.
/// We never panic: errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid configuration, including absent model credentials
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Language-model backend failures (network, auth, quota, malformed response)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Web search provider failures
    #[error("Search error: {0}")]
    Search(String),

    /// Page fetch or parse failures for a single source
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The whole invocation exceeded its deadline
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AppError::Llm("quota exceeded".to_string());
        assert_eq!(err.to_string(), "LLM error: quota exceeded");

        let err = AppError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "Timed out after 30s");

        let err = AppError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "Timed out after 250ms");
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: AppError = parse_err.into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
