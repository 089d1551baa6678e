//! Whole-run duplicate removal

use crate::pagination::Fingerprint;
use crate::types::PageRecord;
use std::collections::HashSet;

/// Remove repeated records, keeping the first occurrence
///
/// Two records are the same when their context and fields match; the page
/// index is ignored. Returns the kept records and how many were removed.
pub fn dedup_records(records: Vec<PageRecord>) -> (Vec<PageRecord>, usize) {
    let before = records.len();
    let mut seen = HashSet::with_capacity(before);

    let kept: Vec<PageRecord> = records
        .into_iter()
        .filter(|record| seen.insert(Fingerprint::of_record(record)))
        .collect();

    let removed = before - kept.len();
    (kept, removed)
}
