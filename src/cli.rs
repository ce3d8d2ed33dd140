use crate::models::Tool;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "debtcloset")]
#[command(version, about = "Shut static-analysis debt away in pyproject.toml", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Exclude every file that currently fails the tool
    Exclude(ExcludeArgs),
    /// Remove the tool's exclusion list
    Clear(TargetArgs),
    /// Print the tool's current exclusion list
    Show(TargetArgs),
}

#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Repository root containing the configuration file
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Analysis tool whose section is edited
    #[arg(short, long, value_enum, default_value = "pyright")]
    pub tool: Tool,

    /// Path to custom config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Args, Debug)]
pub struct ExcludeArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Path or glob that is always excluded (repeatable)
    #[arg(short, long = "require", value_name = "GLOB")]
    pub require: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    pub format: OutputFormat,

    /// Output file (if not specified, writes to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Formatted table output for terminal
    Terminal,
    /// Markdown format
    Markdown,
    /// JSON format
    Json,
}
