//! Typed view over the observation line format.
//!
//! ```text
//! 日期：2025年12月4日
//! * 🔴 (14:30) User stated they have two kids（意思是2025年12月7日）
//!   * -> sub-step
//! ```
//!
//! Parsing is lenient: lines that do not fit the grammar are skipped. The
//! extractor never depends on this module; it exists for inspection and for
//! building well-formed fixtures.

use std::fmt;

use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Date group header prefix.
pub const DATE_HEADER: &str = "日期：";

static DATE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:日期：|Date:)\s*(.+?)\s*$").expect("Invalid regex"));

static OBSERVATION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[*-]\s+(🔴|🟡|🟢)\s*\((\d{1,2}:\d{2})\)\s*(.*?)\s*$").expect("Invalid regex")
});

static SUB_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s+[*-]\s+(?:->\s*)?(.*?)\s*$").expect("Invalid regex"));

static ESTIMATED_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)\s*（([^（）]+)）$").expect("Invalid regex"));

/// Observation priority, rendered as a colored glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::High => "🔴",
            Self::Medium => "🟡",
            Self::Low => "🟢",
        }
    }

    pub fn from_glyph(glyph: &str) -> Option<Self> {
        match glyph {
            "🔴" => Some(Self::High),
            "🟡" => Some(Self::Medium),
            "🟢" => Some(Self::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        })
    }
}

/// A single timestamped note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub priority: Priority,
    pub time: NaiveTime,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_date: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_lines: Vec<String>,
}

impl Observation {
    pub fn new(priority: Priority, time: NaiveTime, text: impl Into<String>) -> Self {
        Self {
            priority,
            time,
            text: text.into(),
            estimated_date: None,
            sub_lines: Vec::new(),
        }
    }

    pub fn with_estimated_date(mut self, date: impl Into<String>) -> Self {
        self.estimated_date = Some(date.into());
        self
    }

    pub fn with_sub_line(mut self, line: impl Into<String>) -> Self {
        self.sub_lines.push(line.into());
        self
    }
}

/// Observations sharing one date header, in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateGroup {
    pub date: String,
    pub observations: Vec<Observation>,
}

/// Parse the observation line format into date groups.
///
/// Observations appearing before any date header land in a group with an
/// empty date.
pub fn parse_observation_groups(text: &str) -> Vec<DateGroup> {
    let mut groups: Vec<DateGroup> = Vec::new();

    for line in text.lines() {
        if let Some(caps) = DATE_LINE.captures(line) {
            groups.push(DateGroup {
                date: caps[1].to_string(),
                observations: Vec::new(),
            });
            continue;
        }

        if let Some(observation) = parse_observation_line(line) {
            if groups.is_empty() {
                groups.push(DateGroup {
                    date: String::new(),
                    observations: Vec::new(),
                });
            }
            if let Some(group) = groups.last_mut() {
                group.observations.push(observation);
            }
            continue;
        }

        if let Some(caps) = SUB_LINE.captures(line)
            && let Some(parent) = groups
                .last_mut()
                .and_then(|group| group.observations.last_mut())
        {
            parent.sub_lines.push(caps[1].to_string());
        }
    }

    groups
}

/// Render date groups back into the line format.
pub fn render_observation_groups(groups: &[DateGroup]) -> String {
    groups
        .iter()
        .map(|group| {
            let mut lines = Vec::with_capacity(group.observations.len() + 1);
            if !group.date.is_empty() {
                lines.push(format!("{}{}", DATE_HEADER, group.date));
            }
            for observation in &group.observations {
                lines.push(render_observation(observation));
            }
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render one observation with its sub-lines.
pub fn render_observation(observation: &Observation) -> String {
    let mut out = format!(
        "* {} ({}) {}",
        observation.priority.glyph(),
        observation.time.format("%H:%M"),
        observation.text
    );
    if let Some(date) = &observation.estimated_date {
        out.push_str(&format!("（{}）", date));
    }
    for sub in &observation.sub_lines {
        out.push_str(&format!("\n  * -> {}", sub));
    }
    out
}

fn parse_observation_line(line: &str) -> Option<Observation> {
    let caps = OBSERVATION_LINE.captures(line)?;
    let priority = Priority::from_glyph(&caps[1])?;
    let time = NaiveTime::parse_from_str(&caps[2], "%H:%M").ok()?;
    let body = &caps[3];

    let (text, estimated_date) = match ESTIMATED_DATE.captures(body) {
        Some(date_caps) => (date_caps[1].to_string(), Some(date_caps[2].to_string())),
        None => (body.to_string(), None),
    };

    Some(Observation {
        priority,
        time,
        text,
        estimated_date,
        sub_lines: Vec::new(),
    })
}
