//! Fetcher types and traits
//!
//! Defines the page-fetching collaborator the pagination controller drives.

use crate::error::Result;
use crate::types::Target;
use async_trait::async_trait;

/// Raw content of the current page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContent {
    /// Page body as text
    pub body: String,
    /// Where the body came from (URL or file path)
    pub location: Option<String>,
    /// Content type reported by the source
    pub content_type: Option<String>,
}

impl PageContent {
    /// Create content from a body
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Default::default()
        }
    }

    /// Set the location
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the content type
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Whether the body is blank
    pub fn is_blank(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// Stateful navigation over one target's pages
///
/// Implementations own any retry or backoff for their transport. A fetch that
/// times out should return [`crate::Error::FetchTimeout`]; a failed move to the
/// next page should return `Ok(false)` or [`crate::Error::Navigation`].
#[async_trait]
pub trait Fetcher: Send {
    /// Navigate to the first page of a target
    async fn begin(&mut self, target: &Target) -> Result<()>;

    /// Content at the current position
    async fn fetch_current(&mut self) -> Result<PageContent>;

    /// Move to the next page, returning whether navigation happened
    async fn advance(&mut self) -> Result<bool>;
}
