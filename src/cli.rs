//! Command-line interface definition.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the SDK header distributor.
#[derive(Parser, Debug)]
#[command(
    name = "sdkdist",
    about = "Sync generated headers and resources into per-platform SDK folders",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Compare everything but write nothing to the SDK folders
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Working directory holding source/ and bin/ (default: current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// SDK installation root (default: $BURGER_SDKS)
    #[arg(long, global = true)]
    pub sdks: Option<PathBuf>,

    /// Layout file (default: <root>/sdkdist.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Regenerate and distribute headers and resources
    Sync,
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the per-command log file.
    #[must_use]
    pub const fn log_name(&self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Version => "version",
        }
    }
}
