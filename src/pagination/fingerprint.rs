//! Page content fingerprints
//!
//! A fingerprint is a SHA-256 digest over the records of one page. The page
//! index is never part of the digest, so the same rows served again on a later
//! page produce the same fingerprint.

use crate::types::PageRecord;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// How ordering affects the fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintMode {
    /// Record order and field order both matter
    #[default]
    Ordered,
    /// Rows and columns may be reordered without changing the digest
    Unordered,
}

/// Hex-encoded SHA-256 digest of a page's records
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a sequence of records
    pub fn compute(records: &[PageRecord], mode: FingerprintMode) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((records.len() as u64).to_le_bytes());

        match mode {
            FingerprintMode::Ordered => {
                for record in records {
                    hash_record(&mut hasher, record, false);
                }
            }
            FingerprintMode::Unordered => {
                let mut digests: Vec<Vec<u8>> = records
                    .iter()
                    .map(|record| {
                        let mut inner = Sha256::new();
                        hash_record(&mut inner, record, true);
                        inner.finalize().to_vec()
                    })
                    .collect();
                digests.sort_unstable();
                for digest in digests {
                    hasher.update(digest);
                }
            }
        }

        Self(format!("{:x}", hasher.finalize()))
    }

    /// Fingerprint a single record, field order included
    pub fn of_record(record: &PageRecord) -> Self {
        let mut hasher = Sha256::new();
        hash_record(&mut hasher, record, false);
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Hex digest
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Feed one record into the hasher, skipping the page index
fn hash_record(hasher: &mut Sha256, record: &PageRecord, sort_fields: bool) {
    let ctx = &record.context;
    write_str(hasher, &ctx.source);
    write_str(hasher, &ctx.year.to_string());
    write_str(hasher, &ctx.jurisdiction);
    write_str(hasher, &ctx.entity);

    hasher.update((record.fields.len() as u64).to_le_bytes());
    if sort_fields {
        let mut fields: Vec<_> = record.fields.iter().collect();
        fields.sort();
        for (name, value) in fields {
            write_str(hasher, name);
            write_str(hasher, value);
        }
    } else {
        for (name, value) in &record.fields {
            write_str(hasher, name);
            write_str(hasher, value);
        }
    }
}

/// Length-prefixed so ("ab","c") and ("a","bc") differ
fn write_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}
