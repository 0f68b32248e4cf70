//! Error types for collaborator implementations.

use thiserror::Error;

/// Errors raised by thread metadata stores.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
