//! HTTP page fetcher
//!
//! Renders a URL template per page and GETs it through [`HttpClient`].

use super::types::{Fetcher, PageContent};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpPage};
use crate::template::{render, TemplateContext};
use crate::types::Target;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Fetches pages by rendering `{{ target.* }}` and `{{ page }}` into a URL
pub struct HttpFetcher {
    client: HttpClient,
    url_template: String,
    next_page_pattern: Option<Regex>,
    vars: Value,
    target: Option<Target>,
    page: u32,
    last_body: Option<String>,
}

impl HttpFetcher {
    /// Create a fetcher for a URL template
    pub fn new(client: HttpClient, url_template: impl Into<String>) -> Self {
        Self {
            client,
            url_template: url_template.into(),
            next_page_pattern: None,
            vars: Value::Null,
            target: None,
            page: 1,
            last_body: None,
        }
    }

    /// Only advance while the last body matches this pattern
    #[must_use]
    pub fn with_next_page_pattern(mut self, pattern: Regex) -> Self {
        self.next_page_pattern = Some(pattern);
        self
    }

    /// Extra template variables under `vars`
    #[must_use]
    pub fn with_vars(mut self, vars: Value) -> Self {
        self.vars = vars;
        self
    }

    /// Current page index
    pub fn page(&self) -> u32 {
        self.page
    }

    /// URL for the current position
    pub fn current_url(&self) -> Result<String> {
        let target = self
            .target
            .as_ref()
            .ok_or_else(|| Error::collaborator("fetcher has no target; call begin first"))?;
        let ctx = TemplateContext::for_page(target, self.page).with_vars(self.vars.clone());
        let rendered = render(&self.url_template, &ctx)?;
        Ok(url::Url::parse(&rendered)?.to_string())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn begin(&mut self, target: &Target) -> Result<()> {
        self.target = Some(target.clone());
        self.page = 1;
        self.last_body = None;
        Ok(())
    }

    async fn fetch_current(&mut self) -> Result<PageContent> {
        let url = self.current_url()?;
        let page = self.page;
        debug!("Fetching page {} from {}", page, url);

        let HttpPage {
            url: location,
            content_type,
            body,
        } = self.client.fetch_page(&url).await.map_err(|e| match e {
            Error::Timeout { timeout_ms } => Error::FetchTimeout { page, timeout_ms },
            other => other,
        })?;

        self.last_body = Some(body.clone());

        let mut content = PageContent::new(body).with_location(location);
        if let Some(content_type) = content_type {
            content = content.with_content_type(content_type);
        }
        Ok(content)
    }

    async fn advance(&mut self) -> Result<bool> {
        if self.target.is_none() {
            return Err(Error::navigation(self.page, "no target loaded"));
        }

        if let Some(pattern) = &self.next_page_pattern {
            let has_next = self
                .last_body
                .as_deref()
                .is_some_and(|body| pattern.is_match(body));
            if !has_next {
                debug!("No next-page marker after page {}", self.page);
                return Ok(false);
            }
        }

        self.page += 1;
        Ok(true)
    }
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("url_template", &self.url_template)
            .field("target", &self.target)
            .field("page", &self.page)
            .finish_non_exhaustive()
    }
}
