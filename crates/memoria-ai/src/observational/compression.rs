//! Budgeted compression loop for reflections.
//!
//! One invocation issues at most three sequential generation calls, one per
//! [`CompressionLevel`]. Each call is measured against the token budget and
//! the level only ever moves forward:
//!
//! ```text
//! None ──(tokens >= budget)──> Gentle ──(tokens >= budget)──> Aggressive ──> ExhaustedRetries
//!   │                            │                               │
//!   └──(tokens < budget)─────────┴───────────────────────────────┴──> Accepted
//! ```
//!
//! Running out of levels is a normal outcome, reported through
//! [`CompressionStatus::ExhaustedRetries`] together with the best attempt.

use std::sync::Arc;

use memoria_traits::TokenCounter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::reflector::{ReflectorResult, parse_reflector_output};
use crate::error::{AiError, Result};
use crate::llm::{CompletionRequest, LlmClient};

const GENTLE_DIRECTIVE: &str = include_str!("templates/compression_gentle.md");
const AGGRESSIVE_DIRECTIVE: &str = include_str!("templates/compression_aggressive.md");

/// How hard a reflection is pushed to shrink.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// No directive; a plain reflection pass.
    #[default]
    None,
    /// Ask for somewhat more compression.
    Gentle,
    /// Ask for substantially more compression.
    Aggressive,
}

impl CompressionLevel {
    pub const ALL: [CompressionLevel; 3] = [Self::None, Self::Gentle, Self::Aggressive];

    /// Numeric level (0, 1 or 2).
    pub fn as_u8(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Gentle => 1,
            Self::Aggressive => 2,
        }
    }

    pub fn from_u8(level: u8) -> Option<Self> {
        match level {
            0 => Some(Self::None),
            1 => Some(Self::Gentle),
            2 => Some(Self::Aggressive),
            _ => None,
        }
    }

    /// The next, stronger level. `None` once the strongest level is reached.
    pub fn escalate(self) -> Option<Self> {
        match self {
            Self::None => Some(Self::Gentle),
            Self::Gentle => Some(Self::Aggressive),
            Self::Aggressive => None,
        }
    }

    /// Directive appended to the reflection prompt; empty for level 0.
    pub fn directive(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Gentle => GENTLE_DIRECTIVE,
            Self::Aggressive => AGGRESSIVE_DIRECTIVE,
        }
    }
}

/// Whether a reflection measured `tokens` got under `threshold`.
///
/// Strictly less-than: landing exactly on the budget is a failure.
pub fn validate_compression(tokens: usize, threshold: usize) -> bool {
    tokens < threshold
}

/// One generation call and its measured size.
#[derive(Debug, Clone)]
pub struct CompressionAttempt {
    pub level: CompressionLevel,
    pub result: ReflectorResult,
    pub token_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionStatus {
    /// The selected attempt is under the budget.
    Accepted,
    /// Every level was tried and none got under the budget.
    ExhaustedRetries,
}

/// Final state of one controller invocation.
#[derive(Debug, Clone)]
pub struct CompressionOutcome {
    pub status: CompressionStatus,
    /// Accepted attempt, or the smallest attempt when retries ran out.
    pub attempt: CompressionAttempt,
    /// Generation calls issued.
    pub attempts_made: usize,
    pub threshold: usize,
}

impl CompressionOutcome {
    pub fn is_accepted(&self) -> bool {
        self.status == CompressionStatus::Accepted
    }

    pub fn observations(&self) -> &str {
        &self.attempt.result.observations
    }

    pub fn into_result(self) -> ReflectorResult {
        self.attempt.result
    }
}

/// Drives generation and measurement across escalating compression levels.
pub struct CompressionController {
    llm: Arc<dyn LlmClient>,
    counter: Arc<dyn TokenCounter>,
    starting_level: CompressionLevel,
}

impl CompressionController {
    pub fn new(llm: Arc<dyn LlmClient>, counter: Arc<dyn TokenCounter>) -> Self {
        Self {
            llm,
            counter,
            starting_level: CompressionLevel::None,
        }
    }

    /// Start at a stronger level, e.g. when a previous pass already failed.
    pub fn with_starting_level(mut self, level: CompressionLevel) -> Self {
        self.starting_level = level;
        self
    }

    /// Run the loop. `build_request` assembles the generation request for a
    /// level; the input observations are captured by it and never modified.
    ///
    /// Errors from the generation call propagate. Failing to meet the budget
    /// does not.
    pub async fn compress<F>(&self, threshold: usize, build_request: F) -> Result<CompressionOutcome>
    where
        F: Fn(CompressionLevel) -> CompletionRequest,
    {
        let mut level = self.starting_level;
        let mut best: Option<CompressionAttempt> = None;
        let mut attempts_made = 0;

        loop {
            let response = self.llm.complete(build_request(level)).await?;
            attempts_made += 1;

            let mut result = parse_reflector_output(response.text());
            let token_count = self.counter.count_tokens(&result.observations);
            result.token_count = Some(token_count);

            debug!(
                level = level.as_u8(),
                token_count, threshold, "Reflection attempt measured"
            );

            let attempt = CompressionAttempt {
                level,
                result,
                token_count,
            };

            // Empty reflections are never accepted.
            let empty = attempt.result.observations.trim().is_empty();
            if empty {
                warn!(level = level.as_u8(), "Reflection produced no observations");
            } else if validate_compression(token_count, threshold) {
                info!(
                    level = level.as_u8(),
                    token_count, threshold, attempts_made, "Reflection accepted"
                );
                return Ok(CompressionOutcome {
                    status: CompressionStatus::Accepted,
                    attempt,
                    attempts_made,
                    threshold,
                });
            }

            best = Some(match best {
                Some(previous) if !empty && previous_is_worse(&previous, &attempt) => attempt,
                Some(previous) => previous,
                None => attempt,
            });

            match level.escalate() {
                Some(next) => level = next,
                None => break,
            }
        }

        warn!(
            threshold,
            attempts_made, "Reflection did not compress below threshold"
        );

        let attempt = best.ok_or_else(|| {
            AiError::InvalidFormat("compression loop finished without an attempt".to_string())
        })?;

        Ok(CompressionOutcome {
            status: CompressionStatus::ExhaustedRetries,
            attempt,
            attempts_made,
            threshold,
        })
    }
}

/// Empty attempts always lose; otherwise the smaller (or later, on a tie) wins.
fn previous_is_worse(previous: &CompressionAttempt, candidate: &CompressionAttempt) -> bool {
    previous.result.observations.trim().is_empty() || candidate.token_count <= previous.token_count
}
