//! Memoria AI - Observational memory engine
//!
//! This crate provides:
//! - Generation collaborator abstraction with a scripted mock client
//! - Observer and reflector agents speaking a tag-based observation format
//! - Multi-thread batching with per-thread attribution
//! - Budgeted reflection with escalating compression levels

#![allow(dead_code)]

pub mod error;
pub mod llm;
pub mod observational;
pub mod text_utils;

// Re-export commonly used types
pub use error::{AiError, Result};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, Message, MockLlmClient, Role};
pub use observational::{
    BatchObservation, CompressionLevel, CompressionOutcome, CompressionStatus,
    MultiThreadObserverResult, ObservationalMemoryConfig, ObserverAgent, ObserverResult,
    ParsedMemorySection, PromptVariant, ReflectorAgent, ReflectorResult, TranscriptMessage,
    TranscriptRole, optimize_observations_for_context,
};
