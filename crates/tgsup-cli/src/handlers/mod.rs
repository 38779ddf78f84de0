//! Command handlers.
//!
//! Handlers are thin wrappers: they build the runtime objects a command
//! needs, call into the supervisor or parser, and format the result for
//! the terminal. Failures are returned as [`CliError`](crate::CliError)
//! wrapped in `anyhow::Error` so `main` can pick an exit code.

pub mod parse;
pub mod run;
pub mod stats;
pub mod version;

use anyhow::Result;
use tgsup_core::StatisticsSnapshot;

use crate::presentation::{display_statistics, statistics_json};

/// Print a snapshot as a table or as JSON.
fn render(snapshot: &StatisticsSnapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", statistics_json(snapshot)?);
    } else {
        display_statistics(snapshot);
    }
    Ok(())
}
