//! CLI module
//!
//! Command-line interface for running harvests.
//!
//! # Commands
//!
//! - `harvest` - Walk every target and write its records
//! - `validate` - Check the configuration file
//! - `targets` - List configured targets
//! - `clean` - Project harvested CSV files onto a column mapping
//! - `stats` - Summarize a wage column

mod commands;
mod runner;

pub use commands::{Cli, Commands, ReportFormat};
pub use runner::Runner;
