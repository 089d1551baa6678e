//! Pagination module
//!
//! Content-based end-of-results detection.
//!
//! # Overview
//!
//! Instead of trusting a source's "next" affordances, the controller compares
//! each page's record fingerprint with the page fetched just before it. A run
//! ends on an empty page, on a streak of repeated pages, when the fetcher
//! cannot advance, or at a hard page ceiling.

mod controller;
mod fingerprint;
mod types;

pub use controller::PaginationController;
pub use fingerprint::{Fingerprint, FingerprintMode};
pub use types::{
    ExtractionRun, PageSnapshot, PaginationConfig, PaginationState, SnapshotDigest,
    TerminalState, DEFAULT_MAX_CONSECUTIVE_DUPLICATES, DEFAULT_MAX_PAGES,
};
