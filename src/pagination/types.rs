//! Pagination types
//!
//! Configuration, terminal states, page snapshots and the accumulated
//! extraction run.

use super::fingerprint::{Fingerprint, FingerprintMode};
use crate::error::{Error, Result};
use crate::types::{PageRecord, Target};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Default ceiling on fetch attempts per target
pub const DEFAULT_MAX_PAGES: u32 = 50;

/// Default number of consecutive duplicate pages that ends a run
pub const DEFAULT_MAX_CONSECUTIVE_DUPLICATES: u32 = 2;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for the pagination controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Hard ceiling on fetch attempts
    pub max_pages: u32,
    /// Consecutive duplicate pages that stop the run
    pub max_consecutive_duplicates: u32,
    /// How page fingerprints treat ordering
    #[serde(rename = "fingerprint")]
    pub fingerprint_mode: FingerprintMode,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            max_consecutive_duplicates: DEFAULT_MAX_CONSECUTIVE_DUPLICATES,
            fingerprint_mode: FingerprintMode::Ordered,
        }
    }
}

impl PaginationConfig {
    /// Create a config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page ceiling
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Set the duplicate-run stop threshold
    #[must_use]
    pub fn with_max_consecutive_duplicates(mut self, max: u32) -> Self {
        self.max_consecutive_duplicates = max;
        self
    }

    /// Set the fingerprint mode
    #[must_use]
    pub fn with_fingerprint_mode(mut self, mode: FingerprintMode) -> Self {
        self.fingerprint_mode = mode;
        self
    }

    /// Reject settings that would never fetch or never stop on duplicates
    pub fn validate(&self) -> Result<()> {
        if self.max_pages == 0 {
            return Err(Error::invalid_value(
                "pagination.max_pages",
                "must be at least 1",
            ));
        }
        if self.max_consecutive_duplicates == 0 {
            return Err(Error::invalid_value(
                "pagination.max_consecutive_duplicates",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Terminal States
// ============================================================================

/// Why a run stopped. Every variant is a successful end of pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalState {
    /// A page produced zero records
    ExhaustedEmpty,
    /// Too many consecutive pages repeated their predecessor
    ExhaustedDuplicate,
    /// No further page could be reached
    ExhaustedNoNext,
    /// The page ceiling was reached
    ExhaustedPageLimit,
}

impl TerminalState {
    /// Short human-readable description
    pub fn description(self) -> &'static str {
        match self {
            TerminalState::ExhaustedEmpty => "empty page",
            TerminalState::ExhaustedDuplicate => "repeated pages",
            TerminalState::ExhaustedNoNext => "no next page",
            TerminalState::ExhaustedPageLimit => "page limit reached",
        }
    }
}

impl fmt::Display for TerminalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

// ============================================================================
// Snapshots
// ============================================================================

/// The records extracted from one fetched page
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    page: u32,
    records: Vec<PageRecord>,
    fingerprint: Fingerprint,
}

impl PageSnapshot {
    /// Build a snapshot, computing its fingerprint once
    pub fn new(page: u32, records: Vec<PageRecord>, mode: FingerprintMode) -> Self {
        let fingerprint = Fingerprint::compute(&records, mode);
        Self {
            page,
            records,
            fingerprint,
        }
    }

    /// Page index this snapshot was fetched at
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Extracted records
    pub fn records(&self) -> &[PageRecord] {
        &self.records
    }

    /// Content fingerprint
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the page yielded no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The comparison key kept for the next page
    pub fn digest(&self) -> SnapshotDigest {
        SnapshotDigest {
            page: self.page,
            fingerprint: self.fingerprint.clone(),
            record_count: self.records.len(),
        }
    }

    /// Consume the snapshot, yielding its records
    pub fn into_records(self) -> Vec<PageRecord> {
        self.records
    }
}

/// What the controller remembers about the previous page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotDigest {
    /// Page index
    pub page: u32,
    /// Content fingerprint
    pub fingerprint: Fingerprint,
    /// Number of records on the page
    pub record_count: usize,
}

impl SnapshotDigest {
    /// Whether `snapshot` repeats this page exactly
    ///
    /// Equal fingerprints with differing counts are treated as different.
    pub fn is_repeated_by(&self, snapshot: &PageSnapshot) -> bool {
        self.fingerprint == snapshot.fingerprint && self.record_count == snapshot.len()
    }
}

// ============================================================================
// Pagination State
// ============================================================================

/// Loop counters private to one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    /// Page index of the next fetch attempt (1-based)
    pub page_index: u32,
    /// Pages in a row judged identical to their predecessor
    pub consecutive_duplicates: u32,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_index: 1,
            consecutive_duplicates: 0,
        }
    }
}

impl PaginationState {
    /// Fresh state starting at page 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a duplicate page, returning the new streak length
    pub fn record_duplicate(&mut self) -> u32 {
        self.consecutive_duplicates += 1;
        self.consecutive_duplicates
    }

    /// Reset the duplicate streak after a distinct page
    pub fn reset_duplicates(&mut self) {
        self.consecutive_duplicates = 0;
    }

    /// Move to the next page index
    pub fn next_page(&mut self) {
        self.page_index += 1;
    }
}

// ============================================================================
// Extraction Run
// ============================================================================

/// Records accumulated across all non-duplicate pages of one target
#[derive(Debug, Clone)]
pub struct ExtractionRun {
    /// Target this run extracted
    pub target: Target,
    /// Header list pinned from the first page that had one
    pub headers: Option<Vec<String>>,
    /// Accumulated records in page order
    pub records: Vec<PageRecord>,
    /// Fetch attempts made
    pub pages_fetched: u32,
    /// Pages whose records were accumulated
    pub pages_accumulated: u32,
    /// Pages discarded as duplicates of their predecessor
    pub duplicate_pages: u32,
    /// Duplicate streak when the run stopped
    pub consecutive_duplicates: u32,
    /// Accumulated page index -> record count
    pub page_counts: BTreeMap<u32, usize>,
    /// Why the run stopped (set once finished)
    pub terminal_state: Option<TerminalState>,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: Option<DateTime<Utc>>,
}

impl ExtractionRun {
    /// Create an empty run for a target
    pub fn new(target: Target) -> Self {
        Self {
            target,
            headers: None,
            records: Vec::new(),
            pages_fetched: 0,
            pages_accumulated: 0,
            duplicate_pages: 0,
            consecutive_duplicates: 0,
            page_counts: BTreeMap::new(),
            terminal_state: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Fold a non-duplicate page into the run
    pub fn absorb(&mut self, snapshot: PageSnapshot) {
        self.page_counts.insert(snapshot.page(), snapshot.len());
        self.pages_accumulated += 1;
        self.records.extend(snapshot.into_records());
    }

    /// Mark the run as finished
    pub fn finish(&mut self, state: TerminalState, consecutive_duplicates: u32) {
        self.terminal_state = Some(state);
        self.consecutive_duplicates = consecutive_duplicates;
        self.finished_at = Some(Utc::now());
    }

    /// Total accumulated record count
    pub fn total_records(&self) -> usize {
        self.records.len()
    }

    /// Whether no records were accumulated
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Wall-clock duration in milliseconds, if finished
    pub fn duration_ms(&self) -> Option<u64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds().max(0) as u64)
    }
}
