//! Shared utilities for the ballot ledger.

pub mod logging;
pub mod time;

pub use logging::{init_logging, LogFormat};
pub use time::{format_duration, format_remaining};
