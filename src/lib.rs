// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Salary Harvest
//!
//! Walks paginated public salary tables and writes each employer's records to
//! CSV or Parquet.
//!
//! ## Features
//!
//! - **Content-Based Pagination**: stops on empty pages, repeated pages, a
//!   missing next page, or a page ceiling, without trusting the source's
//!   navigation controls
//! - **Pluggable Collaborators**: `Fetcher` and `Extractor` traits, with HTTP
//!   and replay fetchers and delimited / JSON extractors
//! - **Post-Processing**: wage normalization, whole-run dedup, salary stats
//! - **Arrow Output**: all-text Arrow batches written as CSV or Parquet
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use salary_harvest::{
//!     engine::{EngineConfig, HarvestEngine},
//!     extract::DelimitedExtractor,
//!     fetch::ReplayFetcher,
//!     Target,
//! };
//!
//! #[tokio::main]
//! async fn main() -> salary_harvest::Result<()> {
//!     let targets = vec![Target::new("Kentucky", 2024, "University of Louisville")];
//!     let mut fetcher = ReplayFetcher::from_dir("pages")?;
//!     let extractor = DelimitedExtractor::default();
//!
//!     let mut engine = HarvestEngine::new(EngineConfig::new().with_output_dir("output"));
//!     let summary = engine.run(&targets, &mut fetcher, &extractor).await?;
//!     println!("{} records", summary.total_records());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        HarvestEngine                            │
//! │  for each target: paginate → normalize → dedup → write → stats  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌───────────┬──────────────────┴────┬──────────────┬──────────────┐
//! │   Fetch   │      Pagination       │   Extract    │    Output    │
//! ├───────────┼───────────────────────┼──────────────┼──────────────┤
//! │ HTTP      │ Fingerprint compare   │ Delimited    │ Arrow        │
//! │ Replay    │ Duplicate streaks     │ JSON         │ CSV          │
//! │ Retry     │ Page ceiling          │ Header pin   │ Parquet      │
//! │ Rate Limit│                       │              │              │
//! └───────────┴───────────────────────┴──────────────┴──────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client with retry and rate limiting
pub mod http;

/// Content-based pagination
pub mod pagination;

/// Page sources
pub mod fetch;

/// Record extraction from page bodies
pub mod extract;

/// Wage normalization, dedup, statistics and column projection
pub mod postprocess;

/// Arrow / CSV / Parquet output
pub mod output;

/// Multi-target harvest engine
pub mod engine;

/// Harvest configuration
pub mod config;

/// Template interpolation
pub mod template;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::HarvestConfig;
pub use engine::{HarvestEngine, HarvestSummary};
pub use pagination::{PaginationController, TerminalState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
