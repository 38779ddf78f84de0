//! Error types for supervisor operations and option validation.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::ports::StatsSourceError;
use crate::statistics::StatsParseError;

/// Errors raised by [`ServerOptions::validate`](crate::ServerOptions::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("Invalid API id: {0}. Must be a positive integer.")]
    InvalidApiId(i32),

    #[error("API hash cannot be empty")]
    EmptyApiHash,

    #[error("Invalid port: {0}. Must be between 1 and 65535.")]
    InvalidPort(u16),

    #[error("Statistics port {0} conflicts with the HTTP port")]
    PortConflict(u16),

    #[error("Invalid verbosity: {0}. Must be at most 1024.")]
    InvalidVerbosity(u16),

    #[error("Executable path cannot be empty")]
    EmptyExecutable,
}

/// Errors surfaced by the process supervisor.
///
/// Every lifecycle operation reports failures synchronously to its caller;
/// nothing is retried internally.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The supervisor was stopped or disposed and cannot be used again.
    #[error("Server supervisor has already been disposed")]
    AlreadyDisposed,

    /// `start` was called while the child process is alive.
    #[error("Server is already running")]
    AlreadyRunning,

    /// The operation needs a live child process.
    #[error("Server is not running")]
    NotRunning,

    /// A required option was not configured.
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(&'static str),

    /// The statistics text was empty or whitespace-only.
    #[error("Invalid statistics input: {0}")]
    InvalidInput(#[from] StatsParseError),

    /// The statistics endpoint could not be reached or read.
    #[error("Statistics unavailable")]
    StatisticsUnavailable(#[source] StatsSourceError),

    /// The operating system refused to create the process.
    #[error("Failed to launch {}", executable.display())]
    LaunchFailed {
        executable: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Terminating or reaping the child process failed.
    #[error("Failed to terminate server process")]
    Terminate(#[source] io::Error),

    /// The options failed validation.
    #[error(transparent)]
    Options(#[from] OptionsError),

    /// The caller stopped waiting; background work may still complete.
    #[error("Operation cancelled")]
    Cancelled,

    /// A background task running the operation panicked or was aborted.
    #[error("Background task failed: {0}")]
    Task(String),

    /// The statistics endpoint did not answer before the deadline.
    #[error("Server on statistics port {port} not ready after {waited_secs}s")]
    NotReady { port: u16, waited_secs: u64 },
}

impl From<StatsSourceError> for SupervisorError {
    fn from(err: StatsSourceError) -> Self {
        Self::StatisticsUnavailable(err)
    }
}

/// Result type alias for supervisor operations.
pub type SupervisorResult<T> = Result<T, SupervisorError>;
