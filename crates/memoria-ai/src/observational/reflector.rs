//! Reflector: condenses accumulated observations under a token budget.

use std::sync::Arc;

use memoria_traits::TokenCounter;
use serde::{Deserialize, Serialize};

use super::compression::{CompressionController, CompressionLevel, CompressionOutcome};
use super::config::ObservationalMemoryConfig;
use super::extractor::{ListFallback, parse_memory_section_with};
use super::prompts::{OBSERVATIONS_ONLY_NOTICE, build_reflector_system_prompt};
use crate::error::Result;
use crate::llm::{CompletionRequest, LlmClient, Message};

/// Parsed reflector response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectorResult {
    pub observations: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_continuation: Option<String>,
    /// Filled in by the compression controller once measured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_count: Option<usize>,
}

/// User prompt for one reflection pass.
pub fn build_reflector_prompt(
    observations: &str,
    manual_prompt: Option<&str>,
    level: CompressionLevel,
    skip_continuation_hints: bool,
) -> String {
    let mut prompt = format!(
        "## 需要反思的观察\n\n{observations}\n\n---\n\n请分析这些观察并生成精炼压缩后的版本，它将成为助手今后的全部记忆。"
    );

    if let Some(guidance) = manual_prompt.map(str::trim).filter(|g| !g.is_empty()) {
        prompt.push_str(&format!("\n\n## 具体指导\n\n{guidance}"));
    }

    let directive = level.directive().trim();
    if !directive.is_empty() {
        prompt.push_str("\n\n");
        prompt.push_str(directive);
    }

    if skip_continuation_hints {
        prompt.push_str("\n\n");
        prompt.push_str(OBSERVATIONS_ONLY_NOTICE);
    }

    prompt
}

/// Decode reflector output.
///
/// Without tags, list items are kept; when there are none the whole trimmed
/// output passes through. The current task is not surfaced here.
pub fn parse_reflector_output(output: &str) -> ReflectorResult {
    let parsed = parse_memory_section_with(output, ListFallback::ListItemsOrRaw);
    ReflectorResult {
        observations: parsed.observations,
        suggested_continuation: non_empty(parsed.suggested_response),
        token_count: None,
    }
}

pub(crate) fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

/// Runs reflection passes through the compression controller.
pub struct ReflectorAgent {
    llm: Arc<dyn LlmClient>,
    counter: Arc<dyn TokenCounter>,
    config: ObservationalMemoryConfig,
}

impl ReflectorAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        counter: Arc<dyn TokenCounter>,
        config: ObservationalMemoryConfig,
    ) -> Self {
        Self {
            llm,
            counter,
            config,
        }
    }

    pub fn config(&self) -> &ObservationalMemoryConfig {
        &self.config
    }

    /// Reflect `observations` until they fit the configured threshold or
    /// every compression level has been tried.
    pub async fn reflect(
        &self,
        observations: &str,
        manual_prompt: Option<&str>,
    ) -> Result<CompressionOutcome> {
        let system_prompt = build_reflector_system_prompt(self.config.prompt_variant);
        let controller = CompressionController::new(self.llm.clone(), self.counter.clone())
            .with_starting_level(self.config.starting_compression_level);

        controller
            .compress(self.config.reflection_threshold, |level| {
                let prompt = build_reflector_prompt(
                    observations,
                    manual_prompt,
                    level,
                    self.config.skip_continuation_hints,
                );
                CompletionRequest::new(vec![
                    Message::system(system_prompt.clone()),
                    Message::user(prompt),
                ])
                .with_options(
                    self.config.temperature,
                    self.config.reflector_max_output_tokens,
                )
            })
            .await
    }
}
