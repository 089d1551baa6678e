//! CLI commands and argument parsing

use crate::types::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Salary table harvester
#[derive(Parser, Debug)]
#[command(name = "salary-harvest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Harvest configuration file (YAML)
    #[arg(short = 'C', long, global = true, default_value = "harvest.yaml")]
    pub config: PathBuf,

    /// Report format
    #[arg(short, long, global = true, default_value = "pretty")]
    pub report: ReportFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk every configured target and write its records
    Harvest {
        /// Only harvest these entities (repeatable, case-insensitive)
        #[arg(long)]
        only: Vec<String>,

        /// Output directory (overrides `output.dir`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Page ceiling per target (overrides `pagination.max_pages`)
        #[arg(long)]
        max_pages: Option<u32>,

        /// Replay saved page bodies from this directory instead of fetching
        #[arg(long)]
        replay_dir: Option<PathBuf>,

        /// Output file format (overrides `output.format`)
        #[arg(long)]
        format: Option<OutputFormat>,
    },

    /// Validate the configuration file
    Validate,

    /// List the targets the configuration expands to
    Targets,

    /// Rewrite harvested CSV files keeping only mapped columns
    Clean {
        /// Directory containing CSV files
        #[arg(long, default_value = "output")]
        dir: PathBuf,

        /// Column mapping as FROM=TO (repeatable; default maps Name, Title, Annual Wages)
        #[arg(long = "map", value_name = "FROM=TO")]
        map: Vec<String>,
    },

    /// Summarize the wage column of a CSV file
    Stats {
        /// CSV file to summarize
        file: PathBuf,

        /// Wage column (detected from the headers when omitted)
        #[arg(long)]
        column: Option<String>,
    },
}

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
