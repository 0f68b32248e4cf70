//! System prompts for the observer and reflector.
//!
//! Prompt text lives in `templates/` and is compiled in. The variant is chosen
//! through [`PromptVariant`] on the config, never from the environment.

use super::config::PromptVariant;

const EXTRACTION_CURRENT: &str = include_str!("templates/extraction_current.md");
const EXTRACTION_LEGACY: &str = include_str!("templates/extraction_legacy.md");
const EXTRACTION_CONDENSED: &str = include_str!("templates/extraction_condensed.md");
const OUTPUT_FORMAT: &str = include_str!("templates/output_format.md");
const OUTPUT_FORMAT_CONDENSED: &str = include_str!("templates/output_format_condensed.md");
const OUTPUT_FORMAT_MULTI_THREAD: &str = include_str!("templates/output_format_multi_thread.md");
const GUIDELINES: &str = include_str!("templates/guidelines.md");
const GUIDELINES_CONDENSED: &str = include_str!("templates/guidelines_condensed.md");
const SINGLE_THREAD_NOTICE: &str = include_str!("templates/single_thread_notice.md");
const REFLECTOR_SYSTEM: &str = include_str!("templates/reflector_system.md");

const OBSERVER_PREAMBLE: &str = "你是AI助手的记忆意识。你的观察将是助手关于与此用户过去交互的唯一信息。\n\n提取能帮助助手记住过去的观察：";

const OBSERVER_CLOSING: &str = "记住：这些观察就是助手的全部记忆。\n\n用户消息极其重要。用户提出问题或给出新任务时，在 <current-task> 中明确这是当前优先事项。";

const PAUSE_HINT: &str = "如果助手需要先等待用户回复，在 <suggested-response> 中说明应暂停其他工作。";

/// Appended to user prompts when continuation hints are disabled.
pub const OBSERVATIONS_ONLY_NOTICE: &str =
    "重要：不要输出 <current-task> 或 <suggested-response> 部分，只输出 <observations>。";

/// Instruction sections shared by the observer and the reflector.
#[derive(Debug, Clone, Copy)]
pub struct ObserverSections {
    pub extraction: &'static str,
    pub output_format: &'static str,
    pub guidelines: &'static str,
}

impl ObserverSections {
    pub fn for_variant(variant: PromptVariant) -> Self {
        match variant {
            PromptVariant::Current => Self {
                extraction: EXTRACTION_CURRENT,
                output_format: OUTPUT_FORMAT,
                guidelines: GUIDELINES,
            },
            PromptVariant::Legacy => Self {
                extraction: EXTRACTION_LEGACY,
                output_format: OUTPUT_FORMAT,
                guidelines: GUIDELINES,
            },
            PromptVariant::Condensed => Self {
                extraction: EXTRACTION_CONDENSED,
                output_format: OUTPUT_FORMAT_CONDENSED,
                guidelines: GUIDELINES_CONDENSED,
            },
        }
    }
}

/// Observer system prompt. The multi-thread form asks for nested
/// `<thread id="...">` blocks; the single-thread form forbids thread markup.
pub fn build_observer_system_prompt(variant: PromptVariant, multi_thread: bool) -> String {
    let sections = ObserverSections::for_variant(variant);

    if multi_thread {
        return format!(
            "{OBSERVER_PREAMBLE}\n\n{}\n\n=== 多线程输入与输出格式 ===\n\n{}\n\n=== 指南 ===\n\n{}\n\n{OBSERVER_CLOSING}",
            sections.extraction.trim(),
            OUTPUT_FORMAT_MULTI_THREAD.trim(),
            sections.guidelines.trim(),
        );
    }

    format!(
        "{OBSERVER_PREAMBLE}\n\n{}\n\n=== 输出格式 ===\n\n输出必须使用 XML 标签组织，系统依靠这些标签解析和管理记忆。\n\n{}\n\n=== 指南 ===\n\n{}\n\n=== 线程归属 ===\n\n{}\n\n{OBSERVER_CLOSING}{PAUSE_HINT}",
        sections.extraction.trim(),
        sections.output_format.trim(),
        sections.guidelines.trim(),
        SINGLE_THREAD_NOTICE.trim(),
    )
}

/// Reflector system prompt, embedding the observer's instructions so the
/// reflector preserves the same format and distinctions.
pub fn build_reflector_system_prompt(variant: PromptVariant) -> String {
    let sections = ObserverSections::for_variant(variant);
    REFLECTOR_SYSTEM
        .replace("{extraction_instructions}", sections.extraction.trim())
        .replace("{output_format}", sections.output_format.trim())
        .replace("{guidelines}", sections.guidelines.trim())
        .trim()
        .to_string()
}

/// "Previous observations" header shared by the observer prompts.
pub(crate) fn previous_observations_section(existing: Option<&str>) -> String {
    match existing.map(str::trim).filter(|text| !text.is_empty()) {
        Some(text) => format!(
            "## 先前的观察\n\n{text}\n\n---\n\n不要重复这些已有观察，新的观察会追加在它们之后。\n\n"
        ),
        None => String::new(),
    }
}
