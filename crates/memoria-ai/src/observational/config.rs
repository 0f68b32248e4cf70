//! Engine configuration
//!
//! Resolved once by the host application and passed to the agents at
//! construction. Core logic never reads the environment.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::compression::CompressionLevel;
use crate::error::{AiError, Result};

/// Default token budget that triggers reflection.
pub const DEFAULT_REFLECTION_THRESHOLD: usize = 40_000;

/// Instruction text variant used by the observer and reflector prompts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PromptVariant {
    /// Full extraction instructions.
    #[default]
    Current,
    /// Smaller instruction set kept for prompt-size comparisons.
    Legacy,
    /// Principle-based instructions with condensed format and guidelines.
    Condensed,
}

impl std::str::FromStr for PromptVariant {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current" => Ok(Self::Current),
            "legacy" => Ok(Self::Legacy),
            "condensed" => Ok(Self::Condensed),
            other => Err(AiError::Config(format!("unknown prompt variant: {other}"))),
        }
    }
}

/// Configuration for the observer and reflector agents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObservationalMemoryConfig {
    /// Instruction variant for both agents.
    pub prompt_variant: PromptVariant,
    /// Per-segment truncation limit for formatted transcripts (None/0 = off).
    pub max_part_length: Option<usize>,
    /// Token budget the reflector must compress below.
    pub reflection_threshold: usize,
    /// First compression level tried by the reflector.
    pub starting_compression_level: CompressionLevel,
    /// Ask the generator to emit observations only.
    pub skip_continuation_hints: bool,
    pub observer_max_output_tokens: Option<u32>,
    pub reflector_max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for ObservationalMemoryConfig {
    fn default() -> Self {
        Self {
            prompt_variant: PromptVariant::default(),
            max_part_length: None,
            reflection_threshold: DEFAULT_REFLECTION_THRESHOLD,
            starting_compression_level: CompressionLevel::default(),
            skip_continuation_hints: false,
            observer_max_output_tokens: None,
            reflector_max_output_tokens: None,
            temperature: None,
        }
    }
}

impl ObservationalMemoryConfig {
    /// Parse configuration from TOML text. Missing keys take defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AiError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn with_prompt_variant(mut self, variant: PromptVariant) -> Self {
        self.prompt_variant = variant;
        self
    }

    pub fn with_max_part_length(mut self, max: usize) -> Self {
        self.max_part_length = Some(max);
        self
    }

    pub fn with_reflection_threshold(mut self, tokens: usize) -> Self {
        self.reflection_threshold = tokens;
        self
    }

    pub fn with_starting_compression_level(mut self, level: CompressionLevel) -> Self {
        self.starting_compression_level = level;
        self
    }

    pub fn with_skip_continuation_hints(mut self, skip: bool) -> Self {
        self.skip_continuation_hints = skip;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}
