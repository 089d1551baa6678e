//! Pagination controller
//!
//! Drives fetch → extract → compare → decide for one target until a page comes
//! back empty, repeats its predecessor too many times, has no successor, or the
//! page ceiling is reached.

use super::types::{
    ExtractionRun, PageSnapshot, PaginationConfig, PaginationState, SnapshotDigest,
    TerminalState,
};
use crate::error::Result;
use crate::extract::{ExtractContext, Extractor};
use crate::fetch::Fetcher;
use crate::types::{PageRecord, Target};
use tracing::{debug, info, warn};

/// Content-based pagination controller
#[derive(Debug, Clone, Default)]
pub struct PaginationController {
    config: PaginationConfig,
}

impl PaginationController {
    /// Create a controller with the given configuration
    pub fn new(config: PaginationConfig) -> Self {
        Self { config }
    }

    /// Controller configuration
    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Extract every page of `target`
    ///
    /// Exhausting the pages is success. Errors other than fetch timeouts,
    /// extraction failures and navigation failures abort the run and the
    /// partial records are dropped.
    pub async fn run(
        &self,
        target: &Target,
        fetcher: &mut dyn Fetcher,
        extractor: &dyn Extractor,
    ) -> Result<ExtractionRun> {
        self.config.validate()?;

        info!("Starting extraction for {target}");
        fetcher.begin(target).await?;

        let mut run = ExtractionRun::new(target.clone());
        let mut state = PaginationState::new();
        let mut previous: Option<SnapshotDigest> = None;

        let terminal = loop {
            if state.page_index > self.config.max_pages {
                warn!(
                    "Reached maximum page limit ({}) for {target}",
                    self.config.max_pages
                );
                break TerminalState::ExhaustedPageLimit;
            }

            let page = state.page_index;
            let records = self
                .load_page(target, page, fetcher, extractor, &mut run.headers)
                .await?;
            run.pages_fetched = page;
            debug!("Page {page}: extracted {} records", records.len());

            if records.is_empty() {
                info!("No data on page {page}, stopping");
                break TerminalState::ExhaustedEmpty;
            }

            let snapshot = PageSnapshot::new(page, records, self.config.fingerprint_mode);
            let digest = snapshot.digest();

            if previous.as_ref().is_some_and(|p| p.is_repeated_by(&snapshot)) {
                let streak = state.record_duplicate();
                run.duplicate_pages += 1;
                warn!(
                    "Page {page} is identical to page {} ({streak}/{})",
                    page - 1,
                    self.config.max_consecutive_duplicates
                );
                if streak >= self.config.max_consecutive_duplicates {
                    info!("Stopping after {streak} consecutive duplicate pages");
                    break TerminalState::ExhaustedDuplicate;
                }
            } else {
                state.reset_duplicates();
                run.absorb(snapshot);
                debug!("Total records so far: {}", run.total_records());
            }

            previous = Some(digest);

            match fetcher.advance().await {
                Ok(true) => {}
                Ok(false) => {
                    info!("No next page after page {page}");
                    break TerminalState::ExhaustedNoNext;
                }
                Err(e) if e.is_navigation_failure() => {
                    info!("{e}");
                    break TerminalState::ExhaustedNoNext;
                }
                Err(e) => return Err(e),
            }

            state.next_page();
        };

        run.finish(terminal, state.consecutive_duplicates);
        info!(
            "Finished {target}: {} records from {} pages ({terminal})",
            run.total_records(),
            run.pages_accumulated
        );

        Ok(run)
    }

    /// Fetch and extract the current page
    ///
    /// Soft failures come back as an empty record list.
    async fn load_page(
        &self,
        target: &Target,
        page: u32,
        fetcher: &mut dyn Fetcher,
        extractor: &dyn Extractor,
        headers: &mut Option<Vec<String>>,
    ) -> Result<Vec<PageRecord>> {
        let content = match fetcher.fetch_current().await {
            Ok(content) => content,
            Err(e) if e.is_soft_page_failure() => {
                warn!("Page {page}: {e}");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let ctx = ExtractContext::new(target, page);
        match extractor.extract(&content, &ctx, headers.as_deref()) {
            Ok(extracted) => {
                if headers.is_none() {
                    if let Some(found) = extracted.headers {
                        debug!("Headers: {found:?}");
                        *headers = Some(found);
                    }
                }
                Ok(extracted.records)
            }
            Err(e) if e.is_soft_page_failure() => {
                warn!("Page {page}: {e}");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}
