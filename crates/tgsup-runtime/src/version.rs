//! Version query for the server executable.

use std::path::Path;
use std::process::Stdio;
use tgsup_core::{SupervisorError, SupervisorResult, VERSION_FLAG};
use tokio::process::Command;
use tracing::debug;

/// Returned when the executable prints nothing on stdout.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Run `<executable> --version` and return its trimmed stdout.
///
/// This is a throwaway invocation unrelated to any supervised instance; it
/// blocks the calling task until the process exits.
pub async fn query_version(executable: &Path) -> SupervisorResult<String> {
    let output = Command::new(executable)
        .arg(VERSION_FLAG)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| SupervisorError::LaunchFailed {
            executable: executable.to_path_buf(),
            source,
        })?;

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    debug!(executable = %executable.display(), status = ?output.status, %version, "Version query finished");

    if version.is_empty() {
        Ok(UNKNOWN_VERSION.to_string())
    } else {
        Ok(version)
    }
}
