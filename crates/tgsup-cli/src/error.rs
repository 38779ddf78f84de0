//! CLI-specific error types and mappings.
//!
//! Maps `SupervisorError` to exit codes and user-facing messages.

use tgsup_core::SupervisorError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Supervisor lifecycle error.
    #[error("{0}")]
    Supervisor(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// The server or its statistics endpoint could not be reached.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Process execution error.
    #[error("Process error: {0}")]
    Process(String),

    /// Input data could not be used.
    #[error("Invalid input: {0}")]
    Data(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow sysexits.h where a category fits.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Supervisor(_) => 1,
            Self::Data(_) => 65,        // EX_DATAERR
            Self::Unavailable(_) => 69, // EX_UNAVAILABLE
            Self::Process(_) => 71,     // EX_OSERR
            Self::Io(_) => 74,          // EX_IOERR
            Self::Config(_) => 78,      // EX_CONFIG
        }
    }
}

impl From<SupervisorError> for CliError {
    fn from(err: SupervisorError) -> Self {
        let message = error_chain(&err);
        match err {
            SupervisorError::Options(_) | SupervisorError::ConfigurationMissing(_) => {
                Self::Config(message)
            }
            SupervisorError::InvalidInput(_) => Self::Data(message),
            SupervisorError::StatisticsUnavailable(_) | SupervisorError::NotReady { .. } => {
                Self::Unavailable(message)
            }
            SupervisorError::LaunchFailed { .. } | SupervisorError::Terminate(_) => {
                Self::Process(message)
            }
            SupervisorError::AlreadyDisposed
            | SupervisorError::AlreadyRunning
            | SupervisorError::NotRunning
            | SupervisorError::Cancelled
            | SupervisorError::Task(_) => Self::Supervisor(message),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Render an error and its sources as `outer: inner: ...`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
