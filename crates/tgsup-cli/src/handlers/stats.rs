//! Stats command handler.
//!
//! Queries a server that is already running, possibly one this tool did
//! not start.

use anyhow::Result;
use std::time::Duration;
use tgsup_core::{StatisticsSourcePort, SupervisorError, parse_statistics};
use tgsup_runtime::HttpStatisticsSource;
use tracing::debug;

use crate::error::CliError;

/// Fetch statistics from `port` and print them.
pub async fn execute(port: u16, json: bool, timeout_secs: u64) -> Result<()> {
    let source = HttpStatisticsSource::with_timeout(Duration::from_secs(timeout_secs));
    let text = source
        .fetch(port)
        .await
        .map_err(|e| CliError::from(SupervisorError::from(e)))?;
    debug!(port, bytes = text.len(), "Fetched statistics");

    let snapshot =
        parse_statistics(&text).map_err(|e| CliError::from(SupervisorError::from(e)))?;
    super::render(&snapshot, json)
}
