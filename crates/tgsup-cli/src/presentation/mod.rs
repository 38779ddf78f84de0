//! Shared CLI presentation utilities.
//!
//! Keep this module format-only: parsing and lifecycle decisions belong in
//! the core and runtime crates.

pub mod statistics_display;
pub mod tables;

pub use statistics_display::{display_statistics, statistics_json};
pub use tables::{format_optional, print_separator, truncate_string};
