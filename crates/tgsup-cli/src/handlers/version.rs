//! Version command handler.

use anyhow::Result;
use std::path::Path;
use tgsup_runtime::query_version;

use crate::error::CliError;

/// Print the version string reported by `executable --version`.
pub async fn execute(executable: &Path) -> Result<()> {
    let version = query_version(executable).await.map_err(CliError::from)?;
    println!("{version}");
    Ok(())
}
