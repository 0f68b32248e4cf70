//! Memoria Traits - Collaborator seams for the observational memory engine.
//!
//! The engine never counts tokens or persists thread state itself. It consumes
//! those capabilities through the traits defined here:
//! - [`TokenCounter`] and the heuristic [`CharEstimateCounter`]
//! - [`ThreadMetadataStore`] and the [`ThreadMetadata`] it persists

pub mod error;
pub mod store;
pub mod tokens;

pub use error::{Result as StoreResult, StoreError};
pub use store::{ThreadMetadata, ThreadMetadataStore};
pub use tokens::{CHARS_PER_TOKEN, CharEstimateCounter, TokenCounter};
