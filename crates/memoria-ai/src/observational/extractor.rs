//! Tag extraction for observer and reflector output.
//!
//! Model output is semi-structured: the generator is asked for
//! `<observations>`, `<current-task>` and `<suggested-response>` blocks but is
//! not guaranteed to produce them. Every function here is a two-tier
//! pipeline (strict tag match, then a heuristic fallback) and always returns
//! a result. Nothing in this module fails.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// Opening and closing tags must start a line (optionally indented) so inline
// mentions such as "user asked about <observations> tags" are not captured.
static OBSERVATIONS_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t]*<observations>([\s\S]*?)^[ \t]*</observations>")
        .expect("Invalid regex")
});

// Only an opening tag at the start of a line begins a block; the closing tag
// may share the line ("<current-task>B</current-task>").
static CURRENT_TASK_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t]*<current-task>([\s\S]*?)</current-task>").expect("Invalid regex")
});

static SUGGESTED_RESPONSE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[ \t]*<suggested-response>([\s\S]*?)</suggested-response>")
        .expect("Invalid regex")
});

// Unpaired leftovers after whole blocks have been removed.
static STRAY_CONTINUATION_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</?(?:current-task|suggested-response)>").expect("Invalid regex")
});

static THREAD_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<thread\s+id="([^"]+)">([\s\S]*?)</thread>"#).expect("Invalid regex")
});

static LIST_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*]|\d+\.)\s").expect("Invalid regex"));

static LEGACY_CURRENT_TASK: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\*\*Current Task:?\*\*",
        r"(?im)^Current Task:",
        r"(?i)\*\*Current Task\*\*:",
        r"(?i)## Current Task",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid regex"))
    .collect()
});

/// Decoded memory section. Fields are always present and empty when the
/// corresponding block was missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedMemorySection {
    pub observations: String,
    pub current_task: String,
    pub suggested_response: String,
}

/// What to return as observations when no `<observations>` block is found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListFallback {
    /// Keep list-item lines only; may yield an empty string.
    #[default]
    ListItemsOnly,
    /// Keep list-item lines, or the whole trimmed text when there are none.
    ListItemsOrRaw,
}

/// A `<thread id="...">` block found inside a multi-thread response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadBlock {
    pub thread_id: String,
    pub content: String,
}

/// Parse observer output with the list-items-only fallback.
pub fn parse_memory_section(content: &str) -> ParsedMemorySection {
    parse_memory_section_with(content, ListFallback::ListItemsOnly)
}

/// Parse `<observations>`, `<current-task>` and `<suggested-response>` blocks.
///
/// Multiple `<observations>` blocks are concatenated in order; only the first
/// `<current-task>` and `<suggested-response>` opening at the start of a line
/// are honoured, so a tag quoted mid-sentence is never taken for a block.
pub fn parse_memory_section_with(content: &str, fallback: ListFallback) -> ParsedMemorySection {
    let blocks: Vec<&str> = OBSERVATIONS_BLOCK
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|block| !block.is_empty())
        .collect();

    let matched_any = OBSERVATIONS_BLOCK.is_match(content);
    let observations = if matched_any {
        blocks.join("\n")
    } else {
        tracing::debug!("No <observations> block in output, using list-item fallback");
        let items = extract_list_items(content);
        match fallback {
            ListFallback::ListItemsOrRaw if items.is_empty() => content.trim().to_string(),
            _ => items,
        }
    };

    ParsedMemorySection {
        observations: strip_continuation_tags(&observations),
        current_task: first_block(&CURRENT_TASK_LINE, content),
        suggested_response: first_block(&SUGGESTED_RESPONSE_LINE, content),
    }
}

/// Keep only lines that look like list items (`-`, `*` or `N.`), in order and
/// with their indentation.
pub fn extract_list_items(content: &str) -> String {
    let lines: Vec<&str> = content
        .lines()
        .filter(|line| LIST_ITEM.is_match(line))
        .collect();
    lines.join("\n").trim_end().to_string()
}

/// Remove `<current-task>`/`<suggested-response>` blocks and any unpaired tags.
pub fn strip_continuation_tags(text: &str) -> String {
    let lower = text.to_ascii_lowercase();
    if !lower.contains("current-task>") && !lower.contains("suggested-response>") {
        return text.to_string();
    }

    let stripped = CURRENT_TASK_LINE.replace_all(text, "");
    let stripped = SUGGESTED_RESPONSE_LINE.replace_all(&stripped, "");
    let stripped = STRAY_CONTINUATION_TAG.replace_all(&stripped, "");
    stripped.trim().to_string()
}

/// Content of the outer `<observations>` envelope, or the whole output when
/// the envelope is missing.
pub fn observation_envelope(output: &str) -> &str {
    OBSERVATIONS_BLOCK
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(output)
}

/// Find `<thread id="...">` blocks inside the observation envelope.
///
/// Blocks with no content at all are skipped. An empty result means the
/// response carried no thread attribution; the caller decides how to fall back.
pub fn extract_thread_blocks(output: &str) -> Vec<ThreadBlock> {
    THREAD_BLOCK
        .captures_iter(observation_envelope(output))
        .filter_map(|caps| {
            let thread_id = caps.get(1)?.as_str();
            let content = caps.get(2)?.as_str();
            if thread_id.is_empty() || content.is_empty() {
                return None;
            }
            Some(ThreadBlock {
                thread_id: thread_id.to_string(),
                content: content.to_string(),
            })
        })
        .collect()
}

/// Split one thread block into its observations, current task and
/// suggested response.
pub fn split_thread_content(content: &str) -> ParsedMemorySection {
    ParsedMemorySection {
        observations: strip_continuation_tags(content).trim().to_string(),
        current_task: first_block(&CURRENT_TASK_LINE, content),
        suggested_response: first_block(&SUGGESTED_RESPONSE_LINE, content),
    }
}

/// Whether `observations` carries a current-task section, either as a tag or
/// as one of the legacy markdown headings.
pub fn has_current_task_section(observations: &str) -> bool {
    if observations.to_ascii_lowercase().contains("<current-task>") {
        return true;
    }
    LEGACY_CURRENT_TASK
        .iter()
        .any(|pattern| pattern.is_match(observations))
}

/// Content of the first `<current-task>` block, if present and non-empty.
pub fn extract_current_task(observations: &str) -> Option<String> {
    let lower = observations.to_ascii_lowercase();
    let open = "<current-task>";
    let close = "</current-task>";

    let start = lower.find(open)? + open.len();
    let end = start + lower[start..].find(close)?;
    let task = observations[start..end].trim();
    (!task.is_empty()).then(|| task.to_string())
}

fn first_block(pattern: &Regex, content: &str) -> String {
    pattern
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}
