//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Supervise a Telegram Bot API server and inspect its statistics.
#[derive(Parser)]
#[command(name = "tgsup")]
#[command(about = "Supervise a Telegram Bot API server and inspect its statistics")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default tracing filter for this invocation.
    pub const fn default_log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
