//! Observer: turns new transcript messages into observations.

use std::collections::HashMap;
use std::sync::Arc;

use memoria_traits::{ThreadMetadata, ThreadMetadataStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::ObservationalMemoryConfig;
use super::extractor::parse_memory_section;
use super::formatter::{FormatOptions, TranscriptMessage, format_messages};
use super::prompts::{
    OBSERVATIONS_ONLY_NOTICE, build_observer_system_prompt, previous_observations_section,
};
use super::reflector::non_empty;
use super::router::{
    MultiThreadObserverResult, build_multi_thread_observer_prompt,
    parse_multi_thread_observer_output,
};
use crate::error::Result;
use crate::llm::{CompletionRequest, LlmClient, Message};

/// Observations and continuation hints decoded from one observer response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObserverResult {
    /// Observation text without any continuation tags.
    pub observations: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_continuation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
}

impl ObserverResult {
    /// Thread metadata carried by this result.
    pub fn thread_metadata(&self) -> ThreadMetadata {
        ThreadMetadata::new(
            self.current_task.clone(),
            self.suggested_continuation.clone(),
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ObserverPromptOptions {
    pub skip_continuation_hints: bool,
    pub max_part_length: Option<usize>,
}

impl From<&ObservationalMemoryConfig> for ObserverPromptOptions {
    fn from(config: &ObservationalMemoryConfig) -> Self {
        Self {
            skip_continuation_hints: config.skip_continuation_hints,
            max_part_length: config.max_part_length,
        }
    }
}

impl ObserverPromptOptions {
    pub(crate) fn format_options(&self) -> FormatOptions {
        FormatOptions {
            max_part_length: self.max_part_length,
        }
    }
}

/// User prompt for a single-thread observation pass.
pub fn build_observer_prompt(
    existing_observations: Option<&str>,
    messages: &[TranscriptMessage],
    options: ObserverPromptOptions,
) -> String {
    let history = format_messages(messages, options.format_options());

    let mut prompt = previous_observations_section(existing_observations);
    prompt.push_str(&format!("## 需要观察的新消息历史\n\n{history}\n\n---\n\n"));
    prompt.push_str("## 你的任务\n\n");
    prompt.push_str(
        "从上面的消息历史中提取新的观察。已经出现在先前观察中的内容不要重复，按照指令中的格式输出新的观察。",
    );

    if options.skip_continuation_hints {
        prompt.push_str("\n\n");
        prompt.push_str(OBSERVATIONS_ONLY_NOTICE);
    }

    prompt
}

/// Decode single-thread observer output.
pub fn parse_observer_output(output: &str) -> ObserverResult {
    let parsed = parse_memory_section(output);
    ObserverResult {
        observations: parsed.observations,
        current_task: non_empty(parsed.current_task),
        suggested_continuation: non_empty(parsed.suggested_response),
        raw_output: Some(output.to_string()),
    }
}

/// Result of a batched multi-thread observation.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchObservation {
    /// The response attributed observations to threads.
    PerThread(MultiThreadObserverResult),
    /// The response carried no `<thread>` blocks and was read as a single
    /// thread's output.
    Unattributed(ObserverResult),
}

impl BatchObservation {
    pub fn is_attributed(&self) -> bool {
        matches!(self, Self::PerThread(_))
    }
}

/// Issues observer generation calls.
pub struct ObserverAgent {
    llm: Arc<dyn LlmClient>,
    config: ObservationalMemoryConfig,
}

impl ObserverAgent {
    pub fn new(llm: Arc<dyn LlmClient>, config: ObservationalMemoryConfig) -> Self {
        Self { llm, config }
    }

    pub fn config(&self) -> &ObservationalMemoryConfig {
        &self.config
    }

    /// Observe one thread's new messages.
    pub async fn observe(
        &self,
        existing_observations: Option<&str>,
        messages: &[TranscriptMessage],
    ) -> Result<ObserverResult> {
        let prompt = build_observer_prompt(
            existing_observations,
            messages,
            ObserverPromptOptions::from(&self.config),
        );
        let output = self.generate(false, prompt).await?;
        let result = parse_observer_output(&output);

        debug!(
            messages = messages.len(),
            has_task = result.current_task.is_some(),
            "Observer pass complete"
        );
        Ok(result)
    }

    /// Observe several threads in one batched call.
    ///
    /// When the response carries no thread blocks the same output is parsed
    /// as single-thread output and returned as
    /// [`BatchObservation::Unattributed`].
    pub async fn observe_threads(
        &self,
        existing_observations: Option<&str>,
        messages_by_thread: &HashMap<String, Vec<TranscriptMessage>>,
        thread_order: &[String],
    ) -> Result<BatchObservation> {
        let prompt = build_multi_thread_observer_prompt(
            existing_observations,
            messages_by_thread,
            thread_order,
            ObserverPromptOptions::from(&self.config),
        );
        let output = self.generate(true, prompt).await?;
        let batch = parse_multi_thread_observer_output(&output);

        if batch.is_unattributed() {
            return Ok(BatchObservation::Unattributed(parse_observer_output(&output)));
        }

        info!(
            requested = thread_order.len(),
            attributed = batch.threads.len(),
            "Multi-thread observer pass complete"
        );
        Ok(BatchObservation::PerThread(batch))
    }

    async fn generate(&self, multi_thread: bool, prompt: String) -> Result<String> {
        let request = CompletionRequest::new(vec![
            Message::system(build_observer_system_prompt(
                self.config.prompt_variant,
                multi_thread,
            )),
            Message::user(prompt),
        ])
        .with_options(
            self.config.temperature,
            self.config.observer_max_output_tokens,
        );

        let response = self.llm.complete(request).await?;
        Ok(response.text().to_string())
    }
}

/// Write each attributed thread's task and continuation to `store`.
///
/// Unattributed batches are skipped since there is no thread to key on.
/// Returns the number of threads written.
pub async fn persist_thread_state(
    store: &dyn ThreadMetadataStore,
    batch: &BatchObservation,
) -> Result<usize> {
    let BatchObservation::PerThread(result) = batch else {
        return Ok(0);
    };

    let mut written = 0;
    for (thread_id, observed) in &result.threads {
        let metadata = observed.thread_metadata();
        if metadata.is_empty() {
            continue;
        }
        store.save(thread_id, metadata).await?;
        written += 1;
    }

    debug!(written, "Persisted thread metadata");
    Ok(written)
}
