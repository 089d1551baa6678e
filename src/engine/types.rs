//! Engine types
//!
//! Configuration, per-target outcomes and statistics for a harvest.

use crate::config::HarvestConfig;
use crate::pagination::{PaginationConfig, TerminalState};
use crate::postprocess::SalaryStats;
use crate::types::{OutputFormat, Target};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a harvest
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Stop conditions for each target
    pub pagination: PaginationConfig,
    /// Directory output files are written to
    pub output_dir: PathBuf,
    /// Output file format
    pub format: OutputFormat,
    /// Remove repeated records across each run
    pub dedup: bool,
    /// Add normalized wage columns
    pub normalize_wages: bool,
    /// Stop at the first failed target
    pub fail_fast: bool,
    /// Pause between targets
    pub target_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pagination: PaginationConfig::default(),
            output_dir: PathBuf::from("output"),
            format: OutputFormat::Csv,
            dedup: true,
            normalize_wages: true,
            fail_fast: false,
            target_delay: Duration::from_secs(3),
        }
    }
}

impl EngineConfig {
    /// Create a new engine config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set pagination limits
    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    /// Set output directory
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set output format
    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable whole-run dedup
    #[must_use]
    pub fn with_dedup(mut self, dedup: bool) -> Self {
        self.dedup = dedup;
        self
    }

    /// Enable or disable wage normalization
    #[must_use]
    pub fn with_normalize_wages(mut self, normalize: bool) -> Self {
        self.normalize_wages = normalize;
        self
    }

    /// Set fail fast mode
    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Set the pause between targets
    #[must_use]
    pub fn with_target_delay(mut self, delay: Duration) -> Self {
        self.target_delay = delay;
        self
    }
}

impl From<&HarvestConfig> for EngineConfig {
    fn from(config: &HarvestConfig) -> Self {
        Self {
            pagination: config.pagination,
            output_dir: config.output.dir.clone(),
            format: config.output.format,
            dedup: config.output.dedup,
            normalize_wages: config.output.normalize_wages,
            fail_fast: config.run.fail_fast,
            target_delay: config.target_delay(),
        }
    }
}

/// Result of one completed target
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    /// Target walked
    pub target: Target,
    /// Why pagination stopped
    pub terminal_state: TerminalState,
    /// Pages fetched
    pub pages_fetched: u32,
    /// Pages skipped as repeats of their predecessor
    pub duplicate_pages: u32,
    /// Records kept after post-processing
    pub records: usize,
    /// Records removed by whole-run dedup
    pub duplicates_removed: usize,
    /// Column wages were read from
    pub wage_column: Option<String>,
    /// Salary summary, when the wage column had numbers
    pub salary_stats: Option<SalaryStats>,
    /// Kept records per page
    pub page_distribution: BTreeMap<u32, usize>,
    /// File written, if any
    pub output: Option<PathBuf>,
    /// Wall time in milliseconds
    pub duration_ms: u64,
}

/// Outcome of one target in a harvest
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TargetOutcome {
    /// Pagination reached a terminal state and output was handled
    Completed(TargetReport),
    /// A fatal error ended the target
    Failed {
        /// Target attempted
        target: Target,
        /// Error description
        error: String,
    },
}

impl TargetOutcome {
    /// Target this outcome belongs to
    pub fn target(&self) -> &Target {
        match self {
            Self::Completed(report) => &report.target,
            Self::Failed { target, .. } => target,
        }
    }

    /// Whether the target completed
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Report for a completed target
    pub fn report(&self) -> Option<&TargetReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Failed { .. } => None,
        }
    }
}

/// Statistics from a harvest
#[derive(Debug, Clone, Default, Serialize)]
pub struct HarvestStats {
    /// Targets that completed
    pub targets_completed: usize,
    /// Targets that failed
    pub targets_failed: usize,
    /// Records kept across all targets
    pub records: usize,
    /// Pages fetched across all targets
    pub pages_fetched: usize,
    /// Records removed by dedup across all targets
    pub duplicates_removed: usize,
    /// Files written
    pub files_written: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl HarvestStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a completed target
    pub fn add_completed(&mut self, report: &TargetReport) {
        self.targets_completed += 1;
        self.records += report.records;
        self.pages_fetched += report.pages_fetched as usize;
        self.duplicates_removed += report.duplicates_removed;
        if report.output.is_some() {
            self.files_written += 1;
        }
    }

    /// Add a failed target
    pub fn add_failure(&mut self) {
        self.targets_failed += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}

/// Everything a harvest produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct HarvestSummary {
    /// Per-target outcomes, in target order
    pub outcomes: Vec<TargetOutcome>,
    /// Aggregate statistics
    pub stats: HarvestStats,
}

impl HarvestSummary {
    /// Records kept across all targets
    pub fn total_records(&self) -> usize {
        self.stats.records
    }

    /// Number of failed targets
    pub fn failure_count(&self) -> usize {
        self.stats.targets_failed
    }

    /// Whether every target completed
    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }
}
