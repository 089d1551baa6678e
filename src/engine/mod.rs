//! Execution engine module
//!
//! Walks a list of targets and post-processes each run.
//!
//! # Overview
//!
//! The engine module provides:
//! - `HarvestEngine` - Runs pagination per target, then wage normalization,
//!   dedup and file output
//! - `EngineConfig` - Configuration for a harvest
//! - `TargetOutcome` / `HarvestSummary` - What each target produced

mod types;

pub use types::{EngineConfig, HarvestStats, HarvestSummary, TargetOutcome, TargetReport};

use crate::error::{Error, Result};
use crate::extract::Extractor;
use crate::fetch::Fetcher;
use crate::output::{output_path, write_records};
use crate::pagination::PaginationController;
use crate::postprocess::{
    dedup_records, format_currency, normalize_wages, page_distribution, SalaryStats,
};
use crate::types::Target;
use std::time::Instant;
use tracing::{error, info, warn};

/// Harvest engine for orchestrating targets
pub struct HarvestEngine {
    /// Pagination controller shared by all targets
    controller: PaginationController,
    /// Engine configuration
    config: EngineConfig,
    /// Statistics
    stats: HarvestStats,
}

impl HarvestEngine {
    /// Create a new harvest engine
    pub fn new(config: EngineConfig) -> Self {
        Self {
            controller: PaginationController::new(config.pagination),
            config,
            stats: HarvestStats::default(),
        }
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get statistics
    pub fn stats(&self) -> &HarvestStats {
        &self.stats
    }

    /// Harvest every target in order
    ///
    /// A failed target is recorded and the next one starts, unless
    /// `fail_fast` is set, in which case the error is returned.
    pub async fn run(
        &mut self,
        targets: &[Target],
        fetcher: &mut dyn Fetcher,
        extractor: &dyn Extractor,
    ) -> Result<HarvestSummary> {
        let start = Instant::now();
        self.stats = HarvestStats::default();
        let mut outcomes = Vec::with_capacity(targets.len());

        for (i, target) in targets.iter().enumerate() {
            if i > 0 && !self.config.target_delay.is_zero() {
                tokio::time::sleep(self.config.target_delay).await;
            }

            info!("[{}/{}] {target}", i + 1, targets.len());

            match self.run_target(target, fetcher, extractor).await {
                Ok(report) => {
                    self.stats.add_completed(&report);
                    outcomes.push(TargetOutcome::Completed(report));
                }
                Err(e) => {
                    error!("Failed to harvest {target}: {e}");
                    self.stats.add_failure();
                    if self.config.fail_fast {
                        return Err(e);
                    }
                    outcomes.push(TargetOutcome::Failed {
                        target: target.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        self.stats.set_duration(start.elapsed().as_millis() as u64);
        info!(
            "Harvest complete: {}/{} targets, {} records in {}ms",
            self.stats.targets_completed,
            targets.len(),
            self.stats.records,
            self.stats.duration_ms
        );

        Ok(HarvestSummary {
            outcomes,
            stats: self.stats.clone(),
        })
    }

    /// Harvest a single target
    pub async fn run_target(
        &self,
        target: &Target,
        fetcher: &mut dyn Fetcher,
        extractor: &dyn Extractor,
    ) -> Result<TargetReport> {
        let start = Instant::now();
        let mut run = self.controller.run(target, fetcher, extractor).await?;
        let headers = run.headers.clone().unwrap_or_default();

        let wage_column = if self.config.normalize_wages {
            normalize_wages(&mut run.records, &headers)
        } else {
            None
        };

        let mut duplicates_removed = 0;
        if self.config.dedup {
            let (kept, removed) = dedup_records(std::mem::take(&mut run.records));
            run.records = kept;
            duplicates_removed = removed;
            if removed > 0 {
                info!("Removed {removed} duplicate records for {target}");
            }
        }

        let salary_stats = wage_column
            .as_deref()
            .and_then(|column| SalaryStats::from_records(&run.records, column));
        if let Some(stats) = &salary_stats {
            info!(
                "{target}: {} salaries, mean {}, median {}",
                stats.count,
                format_currency(stats.mean),
                format_currency(stats.median)
            );
        }

        let output = if run.is_empty() {
            warn!("No records extracted for {target}");
            None
        } else {
            let path = output_path(&self.config.output_dir, target, self.config.format);
            write_records(&path, &run.records, run.headers.as_deref(), self.config.format)?;
            info!("Saved {} records to {}", run.records.len(), path.display());
            Some(path)
        };

        let terminal_state = run
            .terminal_state
            .ok_or_else(|| Error::Other(format!("run for {target} never finished")))?;

        Ok(TargetReport {
            target: target.clone(),
            terminal_state,
            pages_fetched: run.pages_fetched,
            duplicate_pages: run.duplicate_pages,
            records: run.records.len(),
            duplicates_removed,
            wage_column,
            salary_stats,
            page_distribution: page_distribution(&run.records),
            output,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}
