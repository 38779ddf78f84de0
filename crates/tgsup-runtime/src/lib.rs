//! Process runtime for the Telegram Bot API server.
//!
//! [`BotApiServer`] owns one child process built from
//! [`ServerOptions`](tgsup_core::ServerOptions): it launches it, streams its
//! output to an optional sink, answers statistics queries through a
//! [`StatisticsSourcePort`](tgsup_core::StatisticsSourcePort), and
//! terminates it exactly once.
#![deny(unsafe_code)]

mod command;
mod readiness;
mod server;
pub mod shutdown;
mod stats_source;
mod stream;
mod version;

pub use server::BotApiServer;
pub use shutdown::terminate_child;
pub use stats_source::{DEFAULT_STATS_TIMEOUT, HttpStatisticsSource, stats_url};
pub use stream::MAX_LINE_BYTES;
pub use version::{UNKNOWN_VERSION, query_version};

// Re-export the cancellation token so callers need no direct tokio-util dependency
pub use tokio_util::sync::CancellationToken;
