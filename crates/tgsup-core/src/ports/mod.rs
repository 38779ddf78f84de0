//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces the supervisor expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `reqwest` or `tokio::process` types in any signature
//! - Sinks are synchronous and must not block for long; they are called
//!   from the output reader tasks with no backpressure

pub mod output_sink;
pub mod statistics_source;

pub use output_sink::{NoopOutputSink, OutputLine, OutputSinkPort, OutputStream};
pub use statistics_source::{StatisticsSourcePort, StatsSourceError};
