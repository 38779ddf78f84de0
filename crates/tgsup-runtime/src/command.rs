//! Command builder and output capture for the server process.

use std::process::Stdio;
use std::sync::Arc;
use tgsup_core::{OutputSinkPort, OutputStream, ServerOptions, SupervisorError, SupervisorResult};
use tokio::process::{Child, Command};
use tracing::debug;

use crate::stream::spawn_stream_reader;

/// Build the server command from options.
///
/// Arguments come from [`ServerOptions::to_args`]; the working directory is
/// the configured server directory. Both output streams are piped and the
/// child is killed if its handle is dropped without an explicit stop.
pub fn build_command(options: &ServerOptions) -> Command {
    let mut cmd = Command::new(&options.executable);
    cmd.args(options.to_args())
        .current_dir(&options.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

/// Spawn the server process.
///
/// Returns once the OS has created the process; it does not wait for the
/// server to accept requests.
pub fn spawn_server(options: &ServerOptions) -> SupervisorResult<Child> {
    debug!(
        executable = %options.executable.display(),
        args = ?options.to_args(),
        "Spawning Telegram Bot API server"
    );

    build_command(options)
        .spawn()
        .map_err(|source| SupervisorError::LaunchFailed {
            executable: options.executable.clone(),
            source,
        })
}

/// Spawn background tasks streaming stdout/stderr to the sink.
///
/// Lines are always traced at debug level; the sink is optional.
pub fn spawn_output_readers(child: &mut Child, pid: u32, sink: Option<Arc<dyn OutputSinkPort>>) {
    if let Some(stdout) = child.stdout.take() {
        spawn_stream_reader(stdout, pid, OutputStream::Stdout, sink.clone());
    }

    if let Some(stderr) = child.stderr.take() {
        spawn_stream_reader(stderr, pid, OutputStream::Stderr, sink);
    }
}
