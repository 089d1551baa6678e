//! Extractor types and traits
//!
//! Defines the record-extraction collaborator and its configuration.

use crate::error::Result;
use crate::fetch::PageContent;
use crate::types::{ContentFormat, PageRecord, RecordContext, Target};
use serde::{Deserialize, Serialize};

/// Rows with fewer cells than this are not salary rows
pub const DEFAULT_MIN_COLUMNS: usize = 3;

/// Source identifier used when none is configured
pub const DEFAULT_SOURCE: &str = "OpenTheBooks.com";

/// Where a page sits within a run
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    /// Target being extracted
    pub target: &'a Target,
    /// Page index (1-based)
    pub page: u32,
}

impl<'a> ExtractContext<'a> {
    /// Create a context
    pub fn new(target: &'a Target, page: u32) -> Self {
        Self { target, page }
    }

    /// Start a record for this page
    pub fn record(&self, source: &str) -> PageRecord {
        PageRecord::new(RecordContext::for_target(self.target, source), self.page)
    }
}

/// Output of one extraction
#[derive(Debug, Clone, Default)]
pub struct Extracted {
    /// Records in page order
    pub records: Vec<PageRecord>,
    /// Header list in effect for this page
    pub headers: Option<Vec<String>>,
}

impl Extracted {
    /// Create an extraction result
    pub fn new(records: Vec<PageRecord>, headers: Option<Vec<String>>) -> Self {
        Self { records, headers }
    }

    /// No records, headers unchanged
    pub fn empty(headers: Option<Vec<String>>) -> Self {
        Self {
            records: Vec::new(),
            headers,
        }
    }
}

/// Turns page content into records
///
/// Must be deterministic: identical content and headers yield identical records.
pub trait Extractor: Send + Sync {
    /// Extract records, reusing `known_headers` when already pinned
    fn extract(
        &self,
        content: &PageContent,
        ctx: &ExtractContext<'_>,
        known_headers: Option<&[String]>,
    ) -> Result<Extracted>;
}

/// Configuration for building an extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Source identifier stamped on every record
    pub source: String,
    /// Body layout
    pub format: ContentFormat,
    /// Field delimiter for delimited tables
    pub delimiter: char,
    /// Minimum cells for a data row
    pub min_columns: usize,
    /// Dot path to the rows in a JSON body
    pub record_path: Option<String>,
    /// Dot path to the header array in a JSON body
    pub header_path: Option<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            format: ContentFormat::Delimited,
            delimiter: ',',
            min_columns: DEFAULT_MIN_COLUMNS,
            record_path: None,
            header_path: None,
        }
    }
}
