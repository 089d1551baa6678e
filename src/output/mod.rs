//! Output module
//!
//! Handles Arrow RecordBatch creation and CSV / Parquet file writing.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Laying out a run's records as all-text Arrow columns
//! - Writing CSV (header row) or Parquet (Snappy) files
//! - Reading CSV files back and rewriting them with projected columns

mod schema;
mod writer;

pub use schema::{batch_to_rows, column_order, records_to_batch, rows_to_batch, string_schema};
pub use writer::{read_csv_rows, write_csv, write_parquet};

use crate::error::Result;
use crate::postprocess::{project_rows, ColumnMapping};
use crate::types::{OutputFormat, PageRecord, Target};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Output file for a target: `{dir}/{file_stem}.{ext}`
pub fn output_path(dir: impl AsRef<Path>, target: &Target, format: OutputFormat) -> PathBuf {
    dir.as_ref()
        .join(format!("{}.{}", target.file_stem(), format.extension()))
}

/// Write a run's records, creating parent directories; returns rows written
pub fn write_records(
    path: impl AsRef<Path>,
    records: &[PageRecord],
    headers: Option<&[String]>,
    format: OutputFormat,
) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let batch = records_to_batch(records, headers)?;
    let rows = match format {
        OutputFormat::Csv => write_csv(path, &batch)?,
        OutputFormat::Parquet => write_parquet(path, &batch)?,
    };

    debug!("Wrote {} rows to {}", rows, path.display());
    Ok(rows)
}

/// Rewrite a CSV file in place with only the mapped columns
///
/// The projection is written to a sibling `.tmp` file and renamed over the
/// original, so a failed write leaves the original untouched.
pub fn clean_csv_file(path: impl AsRef<Path>, mapping: &ColumnMapping) -> Result<usize> {
    let path = path.as_ref();
    let (columns, rows) = read_csv_rows(path)?;

    let projected = project_rows(&columns, &rows, mapping, &path.display().to_string())?;
    let batch = rows_to_batch(&mapping.outputs(), &projected)?;

    let staging = staging_path(path);
    let written = write_csv(&staging, &batch).and_then(|rows| {
        std::fs::rename(&staging, path)?;
        Ok(rows)
    });
    if written.is_err() && staging.is_file() {
        let _ = std::fs::remove_file(&staging);
    }
    written
}

/// `{path}.tmp`, next to `path`
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests;
