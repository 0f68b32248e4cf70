//! Transcript formatting for the observer's input.
//!
//! Messages arrive in the host's storage shape: content is either a plain
//! string or a structured record holding a list of parts (text, tool
//! invocations, bookkeeping markers) plus an optional text-only field.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::text_utils::{capitalize, truncate_with_note};

/// Separator placed between formatted messages.
pub const MESSAGE_SEPARATOR: &str = "\n\n---\n\n";

const TIMESTAMP_FORMAT: &str = "%b %-d, %Y, %-I:%M %p";

/// Role of a transcript message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptRole {
    System,
    User,
    Assistant,
    Tool,
}

impl TranscriptRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

/// Lifecycle state of a tool invocation part.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ToolInvocationState {
    PartialCall,
    Call,
    Result,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocation {
    pub tool_name: String,
    pub state: ToolInvocationState,
    #[serde(default)]
    pub args: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// One element of a structured message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum MessagePart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool-invocation", rename_all = "camelCase")]
    ToolInvocation { tool_invocation: ToolInvocation },
    /// Bookkeeping parts (observation markers, step boundaries, ...). Never rendered.
    #[serde(other)]
    Marker,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StructuredContent {
    #[serde(default)]
    pub parts: Vec<MessagePart>,
    /// Text-only rendition, used when `parts` is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Structured(StructuredContent),
}

/// A message from a conversation transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptMessage {
    pub role: TranscriptRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub content: MessageContent,
}

impl TranscriptMessage {
    pub fn text(role: TranscriptRole, content: impl Into<String>) -> Self {
        Self {
            role,
            created_at: None,
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn with_parts(role: TranscriptRole, parts: Vec<MessagePart>) -> Self {
        Self {
            role,
            created_at: None,
            content: MessageContent::Structured(StructuredContent {
                parts,
                content: None,
            }),
        }
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Options for [`format_messages`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Per-segment truncation limit in characters (None/0 = off).
    pub max_part_length: Option<usize>,
}

/// Render messages as one block each, joined by [`MESSAGE_SEPARATOR`].
pub fn format_messages(messages: &[TranscriptMessage], options: FormatOptions) -> String {
    messages
        .iter()
        .map(|msg| format_message(msg, options.max_part_length))
        .collect::<Vec<_>>()
        .join(MESSAGE_SEPARATOR)
}

/// Render each thread's messages inside a `<thread id="...">` envelope.
///
/// Threads are visited in `thread_order`; threads missing from the map or
/// with no messages are omitted.
pub fn format_multi_thread_messages(
    messages_by_thread: &HashMap<String, Vec<TranscriptMessage>>,
    thread_order: &[String],
    options: FormatOptions,
) -> String {
    thread_order
        .iter()
        .filter_map(|thread_id| {
            let messages = messages_by_thread.get(thread_id)?;
            if messages.is_empty() {
                return None;
            }
            Some(format!(
                "<thread id=\"{}\">\n{}\n</thread>",
                thread_id,
                format_messages(messages, options)
            ))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Human-readable timestamp, e.g. `Dec 4, 2025, 2:30 PM`.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

fn format_message(msg: &TranscriptMessage, max_len: Option<usize>) -> String {
    let role = capitalize(msg.role.as_str());
    let timestamp = msg
        .created_at
        .as_ref()
        .map(|at| format!(" ({})", format_timestamp(at)))
        .unwrap_or_default();

    format!("**{}{}:**\n{}", role, timestamp, extract_content(&msg.content, max_len))
}

/// Parts win over the text-only field: they are the complete record,
/// including tool activity.
fn extract_content(content: &MessageContent, max_len: Option<usize>) -> String {
    match content {
        MessageContent::Text(text) => truncate_with_note(text, max_len),
        MessageContent::Structured(structured) if !structured.parts.is_empty() => structured
            .parts
            .iter()
            .map(|part| format_part(part, max_len))
            .filter(|rendered| !rendered.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        MessageContent::Structured(structured) => structured
            .content
            .as_deref()
            .map(|text| truncate_with_note(text, max_len))
            .unwrap_or_default(),
    }
}

fn format_part(part: &MessagePart, max_len: Option<usize>) -> String {
    match part {
        MessagePart::Text { text } => truncate_with_note(text, max_len),
        MessagePart::ToolInvocation { tool_invocation } => {
            let (label, payload) = match tool_invocation.state {
                ToolInvocationState::Result => (
                    "Tool Result",
                    tool_invocation.result.as_ref().unwrap_or(&Value::Null),
                ),
                _ => ("Tool Call", &tool_invocation.args),
            };
            let rendered = serde_json::to_string_pretty(payload).unwrap_or_default();
            format!(
                "[{}: {}]\n{}",
                label,
                tool_invocation.tool_name,
                truncate_with_note(&rendered, max_len)
            )
        }
        MessagePart::Marker => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 4, h, m, 0).unwrap()
    }

    #[test]
    fn formats_plain_message_with_timestamp() {
        let msg = TranscriptMessage::text(TranscriptRole::User, "hello").at(at(14, 30));
        assert_eq!(
            format_messages(&[msg], FormatOptions::default()),
            "**User (Dec 4, 2025, 2:30 PM):**\nhello"
        );
    }

    #[test]
    fn omits_missing_timestamp() {
        let msg = TranscriptMessage::text(TranscriptRole::Assistant, "hi");
        assert_eq!(
            format_messages(&[msg], FormatOptions::default()),
            "**Assistant:**\nhi"
        );
    }

    #[test]
    fn joins_messages_with_separator() {
        let msgs = vec![
            TranscriptMessage::text(TranscriptRole::User, "a"),
            TranscriptMessage::text(TranscriptRole::Assistant, "b"),
        ];
        assert_eq!(
            format_messages(&msgs, FormatOptions::default()),
            "**User:**\na\n\n---\n\n**Assistant:**\nb"
        );
    }

    #[test]
    fn renders_tool_calls_and_results() {
        let msg = TranscriptMessage::with_parts(
            TranscriptRole::Assistant,
            vec![
                MessagePart::Text {
                    text: "Checking".to_string(),
                },
                MessagePart::ToolInvocation {
                    tool_invocation: ToolInvocation {
                        tool_name: "view".to_string(),
                        state: ToolInvocationState::Call,
                        args: json!({"path": "a.rs"}),
                        result: None,
                    },
                },
                MessagePart::ToolInvocation {
                    tool_invocation: ToolInvocation {
                        tool_name: "view".to_string(),
                        state: ToolInvocationState::Result,
                        args: json!({"path": "a.rs"}),
                        result: Some(json!({"lines": 3})),
                    },
                },
                MessagePart::Marker,
            ],
        );

        let out = format_messages(&[msg], FormatOptions::default());
        assert_eq!(
            out,
            "**Assistant:**\nChecking\n[Tool Call: view]\n{\n  \"path\": \"a.rs\"\n}\n[Tool Result: view]\n{\n  \"lines\": 3\n}"
        );
    }

    #[test]
    fn parts_take_precedence_over_text_field() {
        let msg = TranscriptMessage {
            role: TranscriptRole::User,
            created_at: None,
            content: MessageContent::Structured(StructuredContent {
                parts: vec![MessagePart::Text {
                    text: "from parts".to_string(),
                }],
                content: Some("from content".to_string()),
            }),
        };
        assert!(format_messages(&[msg], FormatOptions::default()).ends_with("from parts"));
    }

    #[test]
    fn falls_back_to_text_field_without_parts() {
        let msg = TranscriptMessage {
            role: TranscriptRole::User,
            created_at: None,
            content: MessageContent::Structured(StructuredContent {
                parts: Vec::new(),
                content: Some("from content".to_string()),
            }),
        };
        assert_eq!(
            format_messages(&[msg], FormatOptions::default()),
            "**User:**\nfrom content"
        );
    }

    #[test]
    fn truncates_each_segment_independently() {
        let msg = TranscriptMessage::with_parts(
            TranscriptRole::User,
            vec![
                MessagePart::Text {
                    text: "0123456789ABCDE".to_string(),
                },
                MessagePart::Text {
                    text: "short".to_string(),
                },
            ],
        );
        let out = format_messages(
            &[msg],
            FormatOptions {
                max_part_length: Some(10),
            },
        );
        assert_eq!(
            out,
            "**User:**\n0123456789\n... [truncated 5 characters]\nshort"
        );
    }

    #[test]
    fn deserializes_host_message_shape() {
        let raw = json!({
            "role": "assistant",
            "createdAt": "2025-12-04T09:05:00Z",
            "content": {
                "parts": [
                    {"type": "text", "text": "hi"},
                    {"type": "data-om-observation-start"},
                    {"type": "tool-invocation", "toolInvocation": {
                        "toolName": "grep", "state": "partial-call", "args": {"q": "x"}
                    }}
                ]
            }
        });
        let msg: TranscriptMessage = serde_json::from_value(raw).unwrap();
        let out = format_messages(&[msg], FormatOptions::default());
        assert!(out.starts_with("**Assistant (Dec 4, 2025, 9:05 AM):**\nhi\n[Tool Call: grep]"));
    }

    #[test]
    fn multi_thread_wraps_and_skips_empty_threads() {
        let mut by_thread = HashMap::new();
        by_thread.insert(
            "t1".to_string(),
            vec![TranscriptMessage::text(TranscriptRole::User, "x")],
        );
        by_thread.insert("t2".to_string(), Vec::new());
        by_thread.insert(
            "t3".to_string(),
            vec![TranscriptMessage::text(TranscriptRole::User, "y")],
        );
        let order = vec![
            "t3".to_string(),
            "t2".to_string(),
            "missing".to_string(),
            "t1".to_string(),
        ];

        let out = format_multi_thread_messages(&by_thread, &order, FormatOptions::default());
        assert_eq!(
            out,
            "<thread id=\"t3\">\n**User:**\ny\n</thread>\n\n<thread id=\"t1\">\n**User:**\nx\n</thread>"
        );
    }
}
