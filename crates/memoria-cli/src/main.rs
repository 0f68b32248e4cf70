mod cli;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::CliConfig;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable.
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let config = CliConfig::load(cli.config.as_deref());
    tracing::debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Extract(args) => commands::extract::run(args, cli.format),
        Commands::ExtractThreads(args) => commands::extract::run_threads(args, cli.format),
        Commands::Optimize(args) => commands::optimize::run(args, cli.format),
        Commands::FormatMessages(args) => {
            commands::format::run(args, config.memory.max_part_length, cli.format)
        }
        Commands::Stats(args) => commands::stats::run(args, cli.format),
        Commands::Prompt(args) => {
            commands::prompt::run(args, config.memory.prompt_variant, cli.format)
        }
    }
}
