//! Page fetching module
//!
//! Fetchers navigate one target's pages and hand back raw content.
//!
//! - [`HttpFetcher`]: live pages over HTTP, URL rendered from a template
//! - [`ReplayFetcher`]: captured pages from memory or a directory

mod http;
mod replay;
mod types;

pub use http::HttpFetcher;
pub use replay::ReplayFetcher;
pub use types::{Fetcher, PageContent};

#[cfg(test)]
mod tests;
