use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "memoria")]
#[command(version, about = "Memoria - observational memory toolkit")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ~/.config/memoria/config.toml)
    #[arg(long, global = true, env = "MEMORIA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse observer or reflector output
    Extract(ExtractArgs),

    /// Parse multi-thread observer output into per-thread results
    ExtractThreads(InputArgs),

    /// Compact observations for display to an agent
    Optimize(InputArgs),

    /// Render JSON transcript messages as observer input
    #[command(name = "format")]
    FormatMessages(FormatArgs),

    /// Count observations per date group and priority
    Stats(InputArgs),

    /// Print a system prompt
    Prompt(PromptArgs),
}

#[derive(Args)]
pub struct InputArgs {
    /// Input file; stdin when omitted or "-"
    pub input: Option<PathBuf>,
}

#[derive(Args)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Which agent produced the output
    #[arg(long, value_enum, default_value = "observer")]
    pub source: OutputSource,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputSource {
    #[default]
    Observer,
    Reflector,
}

#[derive(Args)]
pub struct FormatArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Truncate each message part to this many characters (0 disables)
    #[arg(long)]
    pub max_part_length: Option<usize>,

    /// Comma-separated thread order for multi-thread input
    #[arg(long, value_delimiter = ',')]
    pub thread_order: Vec<String>,
}

#[derive(Args)]
pub struct PromptArgs {
    #[arg(value_enum)]
    pub agent: OutputSource,

    /// Prompt variant (overrides the config file)
    #[arg(long)]
    pub variant: Option<String>,

    /// Observer prompt for batched multi-thread input
    #[arg(long)]
    pub multi_thread: bool,
}
