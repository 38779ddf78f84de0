//! Parse command handler.
//!
//! Offline counterpart of `stats`: reads statistics text captured earlier.

use anyhow::Result;
use std::io::Read;
use std::path::Path;
use tgsup_core::{StatisticsSnapshot, SupervisorError, parse_statistics};

use crate::error::CliError;

/// Parse statistics from `file` ("-" for stdin) and print them.
pub fn execute(file: &Path, json: bool) -> Result<()> {
    let snapshot = load_statistics(file)?;
    super::render(&snapshot, json)
}

/// Read and parse a statistics document.
pub fn load_statistics(file: &Path) -> Result<StatisticsSnapshot, CliError> {
    let text = if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        let bytes = std::fs::read(file)?;
        String::from_utf8_lossy(&bytes).into_owned()
    };

    parse_statistics(&text).map_err(|e| CliError::from(SupervisorError::from(e)))
}
