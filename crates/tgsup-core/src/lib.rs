//! Core domain for supervising a Telegram Bot API server process.
//!
//! This crate holds everything that does not touch the operating system or
//! the network:
//!
//! - [`ServerOptions`] - the immutable launch configuration and its
//!   command-line rendering
//! - [`statistics`] - the record model and the parser for the server's
//!   tab-separated diagnostic output
//! - [`ports`] - traits the runtime adapters implement (output sink,
//!   statistics source)
//! - [`SupervisorError`] - the error taxonomy shared by all adapters
#![deny(unused_crate_dependencies)]

pub mod error;
pub mod options;
pub mod ports;
pub mod statistics;

pub use error::{OptionsError, SupervisorError, SupervisorResult};
pub use options::{DEFAULT_HTTP_PORT, MAX_VERBOSITY, ServerOptions, VERSION_FLAG};
pub use ports::{
    NoopOutputSink, OutputLine, OutputSinkPort, OutputStream, StatisticsSourcePort,
    StatsSourceError,
};
pub use statistics::{
    ServerStatistics, StatisticsSnapshot, StatsParseError, WorkerStatistics, parse_statistics,
    try_parse_statistics,
};

// Dev-dependencies used only by the test modules
#[cfg(test)]
use serde_json as _;
#[cfg(test)]
use tokio as _;
