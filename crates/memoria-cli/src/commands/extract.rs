use anyhow::Result;
use memoria_ai::observational::{
    BatchObservation, ObserverResult, parse_multi_thread_observer_output, parse_observer_output,
    parse_reflector_output,
};
use serde_json::json;

use crate::cli::{ExtractArgs, InputArgs, OutputSource};
use crate::commands::read_input;
use crate::output::{OutputFormat, json::print_json};

pub fn run(args: ExtractArgs, format: OutputFormat) -> Result<()> {
    let raw = read_input(&args.input)?;

    match args.source {
        OutputSource::Observer => {
            let result = parse_observer_output(&raw);
            if format.is_json() {
                return print_json(&result);
            }
            print_observer_result(&result);
        }
        OutputSource::Reflector => {
            let result = parse_reflector_output(&raw);
            if format.is_json() {
                return print_json(&result);
            }
            println!("{}", result.observations);
            if let Some(next) = &result.suggested_continuation {
                println!("\nSuggested response: {next}");
            }
        }
    }

    Ok(())
}

pub fn run_threads(args: InputArgs, format: OutputFormat) -> Result<()> {
    let raw = read_input(&args)?;
    let parsed = parse_multi_thread_observer_output(&raw);
    let batch = if parsed.is_unattributed() {
        BatchObservation::Unattributed(parse_observer_output(&raw))
    } else {
        BatchObservation::PerThread(parsed)
    };

    if format.is_json() {
        let value = match &batch {
            BatchObservation::PerThread(result) => json!({
                "attributed": true,
                "threads": result.threads,
            }),
            BatchObservation::Unattributed(result) => json!({
                "attributed": false,
                "result": result,
            }),
        };
        return print_json(&value);
    }

    match batch {
        BatchObservation::PerThread(result) => {
            for (index, (thread_id, observed)) in result.threads.iter().enumerate() {
                if index > 0 {
                    println!();
                }
                println!("== {thread_id} ==");
                print_observer_result(observed);
            }
        }
        BatchObservation::Unattributed(result) => {
            eprintln!("No thread blocks found; showing single-thread parse.");
            print_observer_result(&result);
        }
    }

    Ok(())
}

fn print_observer_result(result: &ObserverResult) {
    println!("{}", result.observations);
    if let Some(task) = &result.current_task {
        println!("\nCurrent task: {task}");
    }
    if let Some(next) = &result.suggested_continuation {
        println!("\nSuggested response: {next}");
    }
}
