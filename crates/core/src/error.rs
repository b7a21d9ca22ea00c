//! Error types for Clearance.
//!
//! A single enum covers every failure category in the workspace. The variants
//! follow the retrieval pipeline's taxonomy: configuration and role errors fail
//! before the index is touched, `NotReady` is distinct from an empty answer,
//! and collaborator failures (`Retrieval`, `Llm`) are propagated rather than
//! turned into fallback answers.

use thiserror::Error;

/// Unified error type for Clearance.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (config files, access table validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A role that is not present in the role-access table
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// A query issued before any index generation has been published
    #[error("Index not ready: {0}")]
    NotReady(String),

    /// Embedding gateway or vector index failures
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Answer generator (LLM provider) errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Ingestion and knowledge base errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Whether this error means "ingestion has not run yet" rather than a failure.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, AppError::NotReady(_))
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

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::InvalidRole("intern".to_string());
        assert_eq!(err.to_string(), "Invalid role: intern");

        let err = AppError::NotReady("run ingestion first".to_string());
        assert!(err.to_string().starts_with("Index not ready"));
        assert!(err.is_not_ready());
        assert!(!AppError::Retrieval("down".to_string()).is_not_ready());
    }

    #[test]
    fn test_from_serde_yaml() {
        let parsed: Result<Vec<u32>, _> = serde_yaml::from_str("not: [a list");
        let err: AppError = parsed.unwrap_err().into();
        assert!(matches!(err, AppError::Serialization(_)));
    }

    #[test]
    fn test_every_variant_names_its_category() {
        let cases = [
            (AppError::Config("x".to_string()), "Configuration error"),
            (AppError::InvalidRole("x".to_string()), "Invalid role"),
            (AppError::NotReady("x".to_string()), "Index not ready"),
            (AppError::Retrieval("x".to_string()), "Retrieval error"),
            (AppError::Llm("x".to_string()), "LLM error"),
            (AppError::Knowledge("x".to_string()), "Knowledge error"),
            (AppError::Prompt("x".to_string()), "Prompt error"),
            (
                AppError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "x")),
                "I/O error",
            ),
            (AppError::Serialization("x".to_string()), "Serialization error"),
        ];

        for (err, prefix) in cases {
            // Exhaustive: a new variant must be added here with its category
            match &err {
                AppError::Config(_)
                | AppError::InvalidRole(_)
                | AppError::NotReady(_)
                | AppError::Retrieval(_)
                | AppError::Llm(_)
                | AppError::Knowledge(_)
                | AppError::Prompt(_)
                | AppError::Io(_)
                | AppError::Serialization(_) => {}
            }
            assert!(err.to_string().starts_with(prefix), "{}", err);
        }
    }
}
