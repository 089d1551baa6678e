//! Record extraction module
//!
//! Supports: delimited text tables, JSON
//!
//! # Overview
//!
//! Extractors turn one page of content into ordered records, stamping each
//! with the run's context fields and page index. The header list found on the
//! first page is pinned and handed back on every later page.

mod extractors;
mod types;

pub use extractors::{build_extractor, DelimitedExtractor, JsonExtractor};
pub use types::{
    ExtractContext, Extracted, Extractor, ExtractorConfig, DEFAULT_MIN_COLUMNS, DEFAULT_SOURCE,
};
