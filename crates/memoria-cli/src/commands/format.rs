use std::collections::HashMap;

use anyhow::{Context, Result};
use memoria_ai::observational::{
    FormatOptions, TranscriptMessage, format_messages, format_multi_thread_messages,
};
use serde::Deserialize;
use serde_json::json;

use crate::cli::FormatArgs;
use crate::commands::read_input;
use crate::output::{OutputFormat, json::print_json};

/// A JSON array is one thread; an object maps thread ids to messages.
#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptInput {
    Single(Vec<TranscriptMessage>),
    Threads(HashMap<String, Vec<TranscriptMessage>>),
}

pub fn run(
    args: FormatArgs,
    default_max_part_length: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let raw = read_input(&args.input)?;
    let input: TranscriptInput =
        serde_json::from_str(&raw).context("Input must be a JSON message array or thread map")?;
    let options = FormatOptions {
        max_part_length: args.max_part_length.or(default_max_part_length),
    };

    let rendered = match input {
        TranscriptInput::Single(messages) => format_messages(&messages, options),
        TranscriptInput::Threads(by_thread) => {
            let order = thread_order(&by_thread, args.thread_order);
            format_multi_thread_messages(&by_thread, &order, options)
        }
    };

    if format.is_json() {
        return print_json(&json!({ "transcript": rendered }));
    }

    println!("{rendered}");
    Ok(())
}

/// Explicit order when given, otherwise thread ids sorted for stable output.
fn thread_order(
    by_thread: &HashMap<String, Vec<TranscriptMessage>>,
    requested: Vec<String>,
) -> Vec<String> {
    if !requested.is_empty() {
        return requested;
    }
    let mut ids: Vec<String> = by_thread.keys().cloned().collect();
    ids.sort();
    ids
}
