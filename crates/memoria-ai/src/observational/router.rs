//! Multi-thread routing: many threads in one observer call, one result per
//! thread out.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::extractor::{extract_thread_blocks, split_thread_content};
use super::formatter::{TranscriptMessage, format_multi_thread_messages};
use super::observer::{ObserverPromptOptions, ObserverResult};
use super::prompts::{OBSERVATIONS_ONLY_NOTICE, previous_observations_section};
use super::reflector::non_empty;

const OUTPUT_EXAMPLE: &str = concat!(
    "<observations>\n",
    "<thread id=\"thread1\">\n",
    "日期：2025年12月4日\n",
    "* 🔴 (14:30) 用户偏好直接回答\n",
    "<current-task>正在处理功能 X</current-task>\n",
    "<suggested-response>继续实现</suggested-response>\n",
    "</thread>\n",
    "<thread id=\"thread2\">\n",
    "日期：2025年12月5日\n",
    "* 🟡 (09:15) User asked 部署流程\n",
    "<current-task>讨论部署选项</current-task>\n",
    "<suggested-response>解释部署过程</suggested-response>\n",
    "</thread>\n",
    "</observations>",
);

/// Per-thread results decoded from one batched response.
///
/// Keys keep the order threads appeared in the response. A repeated thread
/// id keeps its first position and the last block's content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiThreadObserverResult {
    pub threads: IndexMap<String, ObserverResult>,
    pub raw_output: String,
}

impl MultiThreadObserverResult {
    /// The response carried no thread blocks at all. Distinct from a thread
    /// that was found with empty observations.
    pub fn is_unattributed(&self) -> bool {
        self.threads.is_empty()
    }

    pub fn thread_ids(&self) -> impl Iterator<Item = &str> {
        self.threads.keys().map(String::as_str)
    }
}

/// User prompt for a batched observation over several threads.
pub fn build_multi_thread_observer_prompt(
    existing_observations: Option<&str>,
    messages_by_thread: &HashMap<String, Vec<TranscriptMessage>>,
    thread_order: &[String],
    options: ObserverPromptOptions,
) -> String {
    let history =
        format_multi_thread_messages(messages_by_thread, thread_order, options.format_options());

    let mut prompt = previous_observations_section(existing_observations);
    prompt.push_str(&format!(
        "## 需要观察的新消息历史\n\n以下消息来自 {} 个不同的对话线程，每个线程都包装在 <thread id=\"...\"> 标签中。\n\n{history}\n\n---\n\n",
        thread_order.len()
    ));
    prompt.push_str("## 你的任务\n\n");
    prompt.push_str(
        "从每个线程中提取新的观察。在 <observations> 块内用 <thread id=\"...\"> 标签按线程分组输出，每个线程块包含该线程自己的观察、current-task 和 suggested-response。\n\n",
    );
    prompt.push_str("示例输出：\n");
    prompt.push_str(OUTPUT_EXAMPLE);

    if options.skip_continuation_hints {
        prompt.push_str("\n\n");
        prompt.push_str(OBSERVATIONS_ONLY_NOTICE);
    }

    prompt
}

/// Decode a batched observer response into per-thread results.
///
/// An empty map means no thread blocks were found; callers fall back to
/// single-thread parsing.
pub fn parse_multi_thread_observer_output(output: &str) -> MultiThreadObserverResult {
    let mut threads = IndexMap::new();

    for block in extract_thread_blocks(output) {
        let section = split_thread_content(&block.content);
        threads.insert(
            block.thread_id,
            ObserverResult {
                observations: section.observations,
                current_task: non_empty(section.current_task),
                suggested_continuation: non_empty(section.suggested_response),
                raw_output: Some(block.content),
            },
        );
    }

    if threads.is_empty() {
        warn!("Observer output carried no thread blocks");
    }

    MultiThreadObserverResult {
        threads,
        raw_output: output.to_string(),
    }
}
