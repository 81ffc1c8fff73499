//! CLI module
//!
//! Command-line interface for running backfills.
//!
//! # Commands
//!
//! - `fetch` - Fetch a kline range and write it to a file
//! - `interval` - Show the step an interval token maps to
//! - `config` - Print the effective configuration

mod commands;
mod runner;

pub use commands::{Cli, Commands, FetchArgs};
pub use runner::{apply_overrides, backfill, BackfillReport, Runner};
