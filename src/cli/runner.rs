//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, ReportFormat};
use crate::config::HarvestConfig;
use crate::engine::{EngineConfig, HarvestEngine, TargetOutcome};
use crate::error::{Error, Result};
use crate::extract::build_extractor;
use crate::fetch::{Fetcher, HttpFetcher, ReplayFetcher};
use crate::http::HttpClient;
use crate::output::{clean_csv_file, read_csv_rows};
use crate::postprocess::{find_wage_column, ColumnMapping, SalaryStats};
use crate::types::{OutputFormat, Target, COL_PAGE};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Harvest {
                only,
                output,
                max_pages,
                replay_dir,
                format,
            } => {
                self.harvest(
                    only,
                    output.as_deref(),
                    *max_pages,
                    replay_dir.as_deref(),
                    *format,
                )
                .await
            }
            Commands::Validate => self.validate(),
            Commands::Targets => self.targets(),
            Commands::Clean { dir, map } => self.clean(dir, map),
            Commands::Stats { file, column } => self.stats(file, column.as_deref()),
        }
    }

    /// Load harvest configuration
    fn load_config(&self) -> Result<HarvestConfig> {
        HarvestConfig::from_file(&self.cli.config)
    }

    /// Run the harvest
    async fn harvest(
        &self,
        only: &[String],
        output: Option<&Path>,
        max_pages: Option<u32>,
        replay_dir: Option<&Path>,
        format: Option<OutputFormat>,
    ) -> Result<()> {
        let mut config = self.load_config()?;
        if let Some(dir) = output {
            config.output.dir = dir.to_path_buf();
        }
        if let Some(max_pages) = max_pages {
            config.pagination.max_pages = max_pages;
        }
        if let Some(format) = format {
            config.output.format = format;
        }
        config.pagination.validate()?;

        let targets = select_targets(config.targets(), only)?;
        let extractor = build_extractor(&config.extractor_config());
        let mut fetcher = Self::build_fetcher(&config, replay_dir)?;

        info!(
            "Harvesting {} targets from {}",
            targets.len(),
            config.source.name
        );

        let mut engine = HarvestEngine::new(EngineConfig::from(&config));
        let summary = engine
            .run(&targets, fetcher.as_mut(), extractor.as_ref())
            .await?;

        for outcome in &summary.outcomes {
            match outcome {
                TargetOutcome::Completed(report) => self.output_message(&json!({
                    "type": "TARGET",
                    "target": report.target.key(),
                    "status": "completed",
                    "terminal_state": report.terminal_state,
                    "pages": report.pages_fetched,
                    "records": report.records,
                    "duplicates_removed": report.duplicates_removed,
                    "output": report.output,
                    "salaries": report.salary_stats.as_ref().map(ToString::to_string),
                })),
                TargetOutcome::Failed { target, error } => self.output_message(&json!({
                    "type": "TARGET",
                    "target": target.key(),
                    "status": "failed",
                    "error": error,
                })),
            }
        }

        self.output_message(&json!({
            "type": "SUMMARY",
            "stats": summary.stats,
        }));

        if summary.is_success() {
            Ok(())
        } else {
            Err(Error::Other(format!(
                "{} of {} targets failed",
                summary.failure_count(),
                summary.outcomes.len()
            )))
        }
    }

    /// Build the page source: saved bodies when replaying, HTTP otherwise
    fn build_fetcher(
        config: &HarvestConfig,
        replay_dir: Option<&Path>,
    ) -> Result<Box<dyn Fetcher>> {
        if let Some(dir) = replay_dir {
            info!("Replaying pages from {}", dir.display());
            return Ok(Box::new(ReplayFetcher::from_dir(dir)?));
        }

        let client = HttpClient::with_config(config.http_client_config())?;
        let mut fetcher = HttpFetcher::new(client, config.source.url_template.clone())
            .with_vars(config.source.vars.clone());
        if let Some(pattern) = config.next_page_regex()? {
            fetcher = fetcher.with_next_page_pattern(pattern);
        }
        Ok(Box::new(fetcher))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!(
                    "Configuration '{}' is valid with {} targets",
                    self.cli.config.display(),
                    config.targets().len()
                )
            }
        }));

        Ok(())
    }

    /// List configured targets
    fn targets(&self) -> Result<()> {
        let config = self.load_config()?;

        let targets: Vec<Value> = config
            .targets()
            .iter()
            .map(|t| {
                json!({
                    "jurisdiction": t.jurisdiction,
                    "year": t.year,
                    "entity": t.entity,
                    "file_stem": t.file_stem(),
                })
            })
            .collect();

        self.output_message(&json!({
            "type": "TARGETS",
            "targets": targets
        }));

        Ok(())
    }

    /// Project every CSV file in a directory onto the column mapping
    fn clean(&self, dir: &Path, map: &[String]) -> Result<()> {
        let mapping = if map.is_empty() {
            ColumnMapping::default()
        } else {
            ColumnMapping::parse_args(map)?
        };

        let report = clean_dir(dir, &mapping)?;

        self.output_message(&json!({
            "type": "CLEAN",
            "columns": mapping.outputs(),
            "cleaned": report.cleaned,
            "skipped": report.skipped,
            "failed": report
                .failed
                .iter()
                .map(|(file, error)| json!({"file": file, "error": error}))
                .collect::<Vec<_>>(),
        }));

        if report.failed.is_empty() {
            Ok(())
        } else {
            Err(Error::Output {
                message: format!("{} file(s) could not be cleaned", report.failed.len()),
            })
        }
    }

    /// Summarize a wage column
    fn stats(&self, file: &Path, column: Option<&str>) -> Result<()> {
        let (columns, rows) = read_csv_rows(file)?;

        let column = match column {
            Some(c) if columns.iter().any(|h| h == c) => c.to_string(),
            Some(c) => {
                return Err(Error::missing_column(c, file.display().to_string()));
            }
            None => find_wage_column(&columns)
                .map(String::from)
                .ok_or_else(|| {
                    Error::invalid_value("column", "no wage column found; use --column")
                })?,
        };

        let stats = SalaryStats::from_rows(&rows, &column);

        let mut pages: BTreeMap<String, usize> = BTreeMap::new();
        if columns.iter().any(|h| h == COL_PAGE) {
            for row in &rows {
                if let Some(page) = row.get(COL_PAGE) {
                    *pages.entry(page.clone()).or_default() += 1;
                }
            }
        }

        self.output_message(&json!({
            "type": "STATS",
            "file": file.display().to_string(),
            "rows": rows.len(),
            "column": column,
            "summary": stats.as_ref().map(ToString::to_string),
            "stats": stats,
            "pages": pages,
        }));

        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.report {
            ReportFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            ReportFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Keep targets whose entity matches one of `only` (all when empty)
fn select_targets(targets: Vec<Target>, only: &[String]) -> Result<Vec<Target>> {
    if only.is_empty() {
        return Ok(targets);
    }

    let selected: Vec<Target> = targets
        .into_iter()
        .filter(|t| only.iter().any(|o| o.trim().eq_ignore_ascii_case(&t.entity)))
        .collect();

    if selected.is_empty() {
        return Err(Error::config(format!(
            "No configured target matches {}",
            only.join(", ")
        )));
    }
    Ok(selected)
}

/// Per-file results of a `clean` run
#[derive(Debug, Default)]
struct CleanReport {
    cleaned: Vec<String>,
    skipped: Vec<String>,
    failed: Vec<(String, String)>,
}

/// Clean every CSV file in `dir`; one bad file never stops the rest
fn clean_dir(dir: &Path, mapping: &ColumnMapping) -> Result<CleanReport> {
    let mut report = CleanReport::default();

    for path in csv_files(dir)? {
        let name = path.display().to_string();
        match clean_csv_file(&path, mapping) {
            Ok(rows) => {
                info!("Cleaned {name} ({rows} rows)");
                report.cleaned.push(name);
            }
            Err(e @ Error::MissingColumn { .. }) => {
                warn!("Skipping {name}: {e}");
                report.skipped.push(name);
            }
            Err(e) => {
                warn!("Failed to clean {name}: {e}");
                report.failed.push((name, e.to_string()));
            }
        }
    }

    Ok(report)
}

/// CSV files directly inside `dir`, sorted by name
fn csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::FileNotFound {
            path: dir.display().to_string(),
        });
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    files.sort();
    Ok(files)
}
