use anyhow::Result;
use memoria_ai::optimize_observations_for_context;
use serde_json::json;

use crate::cli::InputArgs;
use crate::commands::read_input;
use crate::output::{OutputFormat, json::print_json};

pub fn run(args: InputArgs, format: OutputFormat) -> Result<()> {
    let raw = read_input(&args)?;
    let optimized = optimize_observations_for_context(&raw);

    if format.is_json() {
        return print_json(&json!({
            "observations": optimized,
            "originalChars": raw.chars().count(),
            "optimizedChars": optimized.chars().count(),
        }));
    }

    println!("{optimized}");
    Ok(())
}
