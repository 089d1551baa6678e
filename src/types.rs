//! Common types used throughout salary-harvest
//!
//! This module contains the extraction target, the page record model and
//! a few shared enums used across multiple modules.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// Ordered column name -> cell value map
pub type FieldMap = IndexMap<String, String>;

/// A flattened output row (context columns first, then data columns)
pub type FlatRow = IndexMap<String, String>;

// ============================================================================
// Column Names
// ============================================================================

/// Output column holding the target year
pub const COL_YEAR: &str = "Year";
/// Output column holding the jurisdiction
pub const COL_STATE: &str = "State";
/// Output column holding the entity name
pub const COL_EMPLOYER: &str = "Employer";
/// Output column holding the source identifier
pub const COL_SOURCE: &str = "Source";
/// Output column holding the page index
pub const COL_PAGE: &str = "Page";

/// Context columns in output order
pub const CONTEXT_COLUMNS: [&str; 5] = [COL_YEAR, COL_STATE, COL_EMPLOYER, COL_SOURCE, COL_PAGE];

// ============================================================================
// Target
// ============================================================================

/// One (jurisdiction, year, entity) triple to extract
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Jurisdiction name (e.g., "Kentucky")
    pub jurisdiction: String,
    /// Reporting year
    pub year: u16,
    /// Entity name (e.g., "University of Louisville")
    pub entity: String,
}

impl Target {
    /// Create a new target
    pub fn new(jurisdiction: impl Into<String>, year: u16, entity: impl Into<String>) -> Self {
        Self {
            jurisdiction: jurisdiction.into(),
            year,
            entity: entity.into(),
        }
    }

    /// Jurisdiction as a URL slug ("New York" -> "new-york")
    pub fn jurisdiction_slug(&self) -> String {
        self.jurisdiction.trim().to_lowercase().replace(' ', "-")
    }

    /// Entity name percent-encoded for a query string
    pub fn entity_encoded(&self) -> String {
        url::form_urlencoded::byte_serialize(self.entity.as_bytes()).collect()
    }

    /// File stem used for this target's output file
    pub fn file_stem(&self) -> String {
        let safe = self.entity.replace([' ', '/'], "_");
        format!("{safe}_{}_salaries", self.year)
    }

    /// Stable identifier for logs and summaries
    pub fn key(&self) -> String {
        format!("{}/{}/{}", self.jurisdiction, self.year, self.entity)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.entity, self.jurisdiction, self.year)
    }
}

// ============================================================================
// Page Records
// ============================================================================

/// Fixed contextual fields attached to every record of a run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordContext {
    /// Source identifier (e.g., "OpenTheBooks.com")
    pub source: String,
    /// Reporting year
    pub year: u16,
    /// Jurisdiction name
    pub jurisdiction: String,
    /// Entity name
    pub entity: String,
}

impl RecordContext {
    /// Build the context for a target
    pub fn for_target(target: &Target, source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            year: target.year,
            jurisdiction: target.jurisdiction.clone(),
            entity: target.entity.clone(),
        }
    }
}

/// One extracted row: context, page index and ordered data fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Contextual fields
    pub context: RecordContext,
    /// Page the record was extracted from (1-based)
    pub page: u32,
    /// Column name -> cell value, in column order
    pub fields: FieldMap,
}

impl PageRecord {
    /// Create an empty record for a page
    pub fn new(context: RecordContext, page: u32) -> Self {
        Self {
            context,
            page,
            fields: FieldMap::new(),
        }
    }

    /// Builder-style field insertion
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a data field, keeping its original position
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Look up a column by name, including the context columns
    pub fn get(&self, name: &str) -> Option<String> {
        match name {
            COL_YEAR => Some(self.context.year.to_string()),
            COL_STATE => Some(self.context.jurisdiction.clone()),
            COL_EMPLOYER => Some(self.context.entity.clone()),
            COL_SOURCE => Some(self.context.source.clone()),
            COL_PAGE => Some(self.page.to_string()),
            _ => self.fields.get(name).cloned(),
        }
    }

    /// Look up a data field by name
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Number of data fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no data fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Compare everything except the page index
    pub fn same_content(&self, other: &Self) -> bool {
        self.context == other.context && self.fields == other.fields
    }

    /// Flatten into an output row
    pub fn flatten(&self) -> FlatRow {
        let mut row = FlatRow::with_capacity(CONTEXT_COLUMNS.len() + self.fields.len());
        row.insert(COL_YEAR.to_string(), self.context.year.to_string());
        row.insert(COL_STATE.to_string(), self.context.jurisdiction.clone());
        row.insert(COL_EMPLOYER.to_string(), self.context.entity.clone());
        row.insert(COL_SOURCE.to_string(), self.context.source.clone());
        row.insert(COL_PAGE.to_string(), self.page.to_string());
        for (name, value) in &self.fields {
            row.insert(name.clone(), value.clone());
        }
        row
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Formats
// ============================================================================

/// Layout of a page body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    /// Delimited text table (CSV/TSV)
    #[default]
    Delimited,
    /// JSON rows or objects
    Json,
}

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// CSV with a header row
    #[default]
    Csv,
    /// Parquet, Snappy compressed
    Parquet,
}

impl OutputFormat {
    /// File extension for this format
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}
