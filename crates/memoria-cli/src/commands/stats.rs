use anyhow::Result;
use comfy_table::Table;
use memoria_ai::observational::{DateGroup, Priority, parse_observation_groups};
use serde::Serialize;

use crate::cli::InputArgs;
use crate::commands::read_input;
use crate::output::{OutputFormat, json::print_json};

#[derive(Debug, Serialize)]
struct GroupStats {
    date: String,
    high: usize,
    medium: usize,
    low: usize,
    sub_lines: usize,
}

impl From<&DateGroup> for GroupStats {
    fn from(group: &DateGroup) -> Self {
        let count = |priority: Priority| {
            group
                .observations
                .iter()
                .filter(|obs| obs.priority == priority)
                .count()
        };
        Self {
            date: group.date.clone(),
            high: count(Priority::High),
            medium: count(Priority::Medium),
            low: count(Priority::Low),
            sub_lines: group.observations.iter().map(|obs| obs.sub_lines.len()).sum(),
        }
    }
}

pub fn run(args: InputArgs, format: OutputFormat) -> Result<()> {
    let raw = read_input(&args)?;
    let stats: Vec<GroupStats> = parse_observation_groups(&raw)
        .iter()
        .map(GroupStats::from)
        .collect();

    if format.is_json() {
        return print_json(&stats);
    }

    if stats.is_empty() {
        println!("No observations found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "🔴 High", "🟡 Medium", "🟢 Low", "Sub-lines"]);
    for row in &stats {
        let date = if row.date.is_empty() { "-" } else { row.date.as_str() };
        table.add_row(vec![
            date.to_string(),
            row.high.to_string(),
            row.medium.to_string(),
            row.low.to_string(),
            row.sub_lines.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}
