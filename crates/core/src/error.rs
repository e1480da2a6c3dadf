//! Error types for the PRIS analysis engine.
//!
//! The taxonomy separates failures that make the engine unusable
//! (`DataUnavailable`), failures that degrade retrieval but never reach the
//! user as hard errors (`IndexUnavailable`, `RetrievalFailure`), and failures
//! that abort a single synthesis request (`SynthesisFailure`).

use thiserror::Error;

/// Unified error type for the PRIS engine and CLI.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Reactor dataset missing or malformed. Fatal at startup.
    #[error("Dataset unavailable: {0}")]
    DataUnavailable(String),

    /// Vector index could not be loaded. Retrieval stays degraded.
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    /// A single similarity search failed.
    #[error("Retrieval failed: {0}")]
    RetrievalFailure(String),

    /// The generative model call for one request failed.
    #[error("Synthesis failed: {0}")]
    SynthesisFailure(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Knowledge base and embedding errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

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

impl AppError {
    /// Whether the error is absorbed below the synthesis boundary.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            AppError::IndexUnavailable(_) | AppError::RetrievalFailure(_)
        )
    }
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

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::DataUnavailable(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degradable_variants() {
        assert!(AppError::IndexUnavailable("missing".to_string()).is_degradable());
        assert!(AppError::RetrievalFailure("timeout".to_string()).is_degradable());
        assert!(!AppError::SynthesisFailure("quota".to_string()).is_degradable());
        assert!(!AppError::DataUnavailable("no file".to_string()).is_degradable());
    }

    #[test]
    fn test_display_prefixes() {
        let err = AppError::SynthesisFailure("rate limited".to_string());
        assert_eq!(err.to_string(), "Synthesis failed: rate limited");
    }
}
