pub mod extract;
pub mod format;
pub mod optimize;
pub mod prompt;
pub mod stats;

use std::io::Read;

use anyhow::{Context, Result};

use crate::cli::InputArgs;

/// Read the whole input file, or stdin when no path (or "-") was given.
pub fn read_input(args: &InputArgs) -> Result<String> {
    match args.input.as_deref() {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}
