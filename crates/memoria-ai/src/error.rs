//! Error types for the memory engine

use thiserror::Error;

/// Engine error types
///
/// Parsing model output is never an error. These variants cover the fallible
/// edges only: the generation call, collaborators and configuration.
#[derive(Error, Debug)]
pub enum AiError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(#[from] memoria_traits::StoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, AiError>;
