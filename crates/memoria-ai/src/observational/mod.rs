//! Observational memory
//!
//! Observer output and reflector output share one tag-based micro-format.
//! The pieces here, bottom-up:
//! - [`extractor`]: tag parsing with fallbacks
//! - [`formatter`]: transcripts rendered for the observer
//! - [`router`]: many threads in one observer call
//! - [`compression`]: the reflection retry loop under a token budget
//! - [`optimizer`]: display-only compaction for the acting agent
//! - [`observer`] / [`reflector`]: prompts and agents around the generation call

pub mod compression;
pub mod config;
pub mod extractor;
pub mod formatter;
pub mod observation;
pub mod observer;
pub mod optimizer;
pub mod prompts;
pub mod reflector;
pub mod router;

pub use compression::{
    CompressionAttempt, CompressionController, CompressionLevel, CompressionOutcome,
    CompressionStatus, validate_compression,
};
pub use config::{DEFAULT_REFLECTION_THRESHOLD, ObservationalMemoryConfig, PromptVariant};
pub use extractor::{
    ListFallback, ParsedMemorySection, ThreadBlock, extract_current_task, extract_thread_blocks,
    has_current_task_section, parse_memory_section, parse_memory_section_with,
};
pub use formatter::{
    FormatOptions, MessageContent, MessagePart, StructuredContent, ToolInvocation,
    ToolInvocationState, TranscriptMessage, TranscriptRole, format_messages,
    format_multi_thread_messages,
};
pub use observation::{DateGroup, Observation, Priority, parse_observation_groups};
pub use observer::{
    BatchObservation, ObserverAgent, ObserverPromptOptions, ObserverResult,
    build_observer_prompt, parse_observer_output, persist_thread_state,
};
pub use optimizer::optimize_observations_for_context;
pub use prompts::{build_observer_system_prompt, build_reflector_system_prompt};
pub use reflector::{ReflectorAgent, ReflectorResult, build_reflector_prompt, parse_reflector_output};
pub use router::{
    MultiThreadObserverResult, build_multi_thread_observer_prompt,
    parse_multi_thread_observer_output,
};
