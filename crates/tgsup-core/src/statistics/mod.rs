//! Runtime statistics reported by the server's diagnostic endpoint.
//!
//! - [`ServerStatistics`] / [`WorkerStatistics`] - plain records
//! - [`StatisticsSnapshot`] - one server record plus its bots
//! - [`parse_statistics`] - text to snapshot; pure and re-entrant

mod model;
mod parser;

pub use model::{ServerStatistics, StatisticsSnapshot, WorkerStatistics};
pub use parser::{StatsParseError, parse_statistics, try_parse_statistics};
