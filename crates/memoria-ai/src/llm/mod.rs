//! LLM module - generation collaborator abstraction

mod client;
mod mock_client;

pub use client::{
    CompletionRequest, CompletionResponse, FinishReason, LlmClient, Message, Role, TokenUsage,
};
pub use mock_client::{MockLlmClient, MockStep, MockStepKind};
