//! Replay fetcher
//!
//! Serves previously captured page bodies, from memory or from disk.

use super::types::{Fetcher, PageContent};
use crate::error::{Error, Result};
use crate::types::Target;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
enum ReplaySource {
    Memory(Vec<PageContent>),
    Directory(PathBuf),
}

/// Replays a fixed sequence of pages
///
/// A directory source is read on every `begin`: when it holds a subdirectory
/// named after the target's file stem, that subdirectory is used, otherwise the
/// directory itself. Files are served in file-name order.
#[derive(Debug, Clone)]
pub struct ReplayFetcher {
    source: ReplaySource,
    pages: Vec<PageContent>,
    position: usize,
}

impl ReplayFetcher {
    /// Replay in-memory bodies
    pub fn from_bodies<I, S>(bodies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pages: Vec<PageContent> = bodies.into_iter().map(PageContent::new).collect();
        Self {
            source: ReplaySource::Memory(pages.clone()),
            pages,
            position: 0,
        }
    }

    /// Replay the files of a directory
    pub fn from_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(Error::FileNotFound {
                path: dir.display().to_string(),
            });
        }
        Ok(Self {
            source: ReplaySource::Directory(dir),
            pages: Vec::new(),
            position: 0,
        })
    }

    /// Number of pages loaded for the current target
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Read the regular, non-hidden files of a directory in name order
async fn load_pages(dir: &Path) -> Result<Vec<PageContent>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut paths = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if entry.file_type().await?.is_file() && !hidden {
            paths.push(path);
        }
    }
    paths.sort();

    let mut pages = Vec::with_capacity(paths.len());
    for path in paths {
        let body = tokio::fs::read_to_string(&path).await?;
        pages.push(PageContent::new(body).with_location(path.display().to_string()));
    }
    Ok(pages)
}

#[async_trait]
impl Fetcher for ReplayFetcher {
    async fn begin(&mut self, target: &Target) -> Result<()> {
        self.position = 0;
        if let ReplaySource::Directory(dir) = &self.source {
            let per_target = dir.join(target.file_stem());
            let dir = if per_target.is_dir() { per_target } else { dir.clone() };
            self.pages = load_pages(&dir).await?;
            debug!("Loaded {} replay pages from {}", self.pages.len(), dir.display());
        } else if let ReplaySource::Memory(pages) = &self.source {
            self.pages = pages.clone();
        }
        Ok(())
    }

    async fn fetch_current(&mut self) -> Result<PageContent> {
        // An empty sequence reads as one blank page
        Ok(self.pages.get(self.position).cloned().unwrap_or_default())
    }

    async fn advance(&mut self) -> Result<bool> {
        if self.position + 1 >= self.pages.len() {
            return Ok(false);
        }
        self.position += 1;
        Ok(true)
    }
}
