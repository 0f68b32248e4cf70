use anyhow::Result;
use memoria_ai::PromptVariant;
use memoria_ai::observational::{build_observer_system_prompt, build_reflector_system_prompt};
use serde_json::json;

use crate::cli::{OutputSource, PromptArgs};
use crate::output::{OutputFormat, json::print_json};

pub fn run(args: PromptArgs, configured: PromptVariant, format: OutputFormat) -> Result<()> {
    let variant = match args.variant.as_deref() {
        Some(name) => name.parse::<PromptVariant>()?,
        None => configured,
    };

    let prompt = match args.agent {
        OutputSource::Observer => build_observer_system_prompt(variant, args.multi_thread),
        OutputSource::Reflector => build_reflector_system_prompt(variant),
    };

    if format.is_json() {
        return print_json(&json!({ "variant": variant, "prompt": prompt }));
    }

    println!("{prompt}");
    Ok(())
}
