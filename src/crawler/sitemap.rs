//! Sitemap discovery
//!
//! The catalog publishes its product URLs in a fixed, numbered series of XML
//! sitemap files. This module enumerates those files, parses their `<loc>`
//! entries and caches each file's entries for the lifetime of a crawl run.

use crate::config::{SitemapConfig, INDEX_PLACEHOLDER};
use crate::crawler::fetcher::{FetchError, PageFetcher};
use crate::crawler::frontier::{CrawlTask, FrontierSource};
use crate::crawler::visited::VisitedSet;
use crate::url::is_valid_url;
use async_trait::async_trait;
use dashmap::DashMap;
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Errors raised while loading a sitemap file
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Invalid sitemap XML: {0}")]
    Xml(String),
}

/// Lists the sitemap file URLs described by the configuration
///
/// No network access; indices run from `first_index` to `last_index` inclusive.
pub fn enumerate_sitemap_files(config: &SitemapConfig) -> Vec<String> {
    (config.first_index..=config.last_index)
        .map(|index| {
            config
                .url_template
                .replace(INDEX_PLACEHOLDER, &index.to_string())
        })
        .collect()
}

/// Namespace of the sitemap protocol
const SITEMAP_NS: &[u8] = b"http://www.sitemaps.org/schemas/sitemap/0.9";

/// Extracts the text of every sitemap `<loc>` element
///
/// Values are trimmed and empty ones skipped. A `loc` counts only when it is
/// in the sitemap namespace or in no namespace at all, so extension entries
/// such as `<image:loc>` or `<video:thumbnail_loc>` are ignored.
pub fn parse_sitemap(xml: &[u8]) -> Result<Vec<String>, SitemapError> {
    let mut reader = NsReader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut in_loc = false;
    let mut current = String::new();
    let mut locs = Vec::new();

    loop {
        buf.clear();
        let (ns, event) = match reader.read_resolved_event_into(&mut buf) {
            Ok(resolved) => resolved,
            Err(e) => return Err(SitemapError::Xml(e.to_string())),
        };

        match event {
            Event::Start(e) => {
                if is_sitemap_loc(&ns, e.local_name().as_ref()) {
                    in_loc = true;
                    current.clear();
                }
            }
            Event::End(e) => {
                if in_loc && is_sitemap_loc(&ns, e.local_name().as_ref()) {
                    in_loc = false;
                    let loc = current.trim();
                    if !loc.is_empty() {
                        locs.push(loc.to_string());
                    }
                }
            }
            Event::Text(t) => {
                if in_loc {
                    let text = t
                        .unescape()
                        .map_err(|e| SitemapError::Xml(e.to_string()))?;
                    current.push_str(&text);
                }
            }
            Event::CData(c) => {
                if in_loc {
                    current.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(locs)
}

fn is_sitemap_loc(ns: &ResolveResult, local_name: &[u8]) -> bool {
    local_name == b"loc"
        && match ns {
            ResolveResult::Unbound => true,
            ResolveResult::Bound(namespace) => namespace.as_ref() == SITEMAP_NS,
            ResolveResult::Unknown(_) => false,
        }
}

/// Read-through cache of parsed sitemap files
///
/// Each file is fetched at most once per cache, even when several callers
/// ask for it at the same time. A failed load leaves the entry empty so a
/// later read retries it. Clones share the same cache.
#[derive(Debug, Clone, Default)]
pub struct SitemapCache {
    entries: Arc<DashMap<String, Arc<OnceCell<Arc<Vec<String>>>>>>,
}

impl SitemapCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the `<loc>` entries of a sitemap file, fetching it on first use
    pub async fn get_or_fetch(
        &self,
        sitemap_url: &str,
        fetcher: &PageFetcher,
    ) -> Result<Arc<Vec<String>>, SitemapError> {
        // Clone the cell out so no map guard is held across the await
        let cell = self
            .entries
            .entry(sitemap_url.to_string())
            .or_default()
            .value()
            .clone();

        let locs = cell
            .get_or_try_init(|| fetch_and_parse_sitemap(fetcher, sitemap_url))
            .await?;

        Ok(Arc::clone(locs))
    }

    /// Returns the cached entries of a sitemap file, if it was loaded
    pub fn get(&self, sitemap_url: &str) -> Option<Arc<Vec<String>>> {
        self.entries
            .get(sitemap_url)
            .and_then(|cell| cell.value().get().cloned())
    }

    /// Number of sitemap files loaded successfully
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

async fn fetch_and_parse_sitemap(
    fetcher: &PageFetcher,
    sitemap_url: &str,
) -> Result<Arc<Vec<String>>, SitemapError> {
    debug!("Fetching sitemap {}", sitemap_url);
    let body = fetcher.fetch_bytes(sitemap_url).await?;
    let locs = parse_sitemap(&body)?;
    info!("Sitemap {} lists {} URLs", sitemap_url, locs.len());
    Ok(Arc::new(locs))
}

/// Frontier that takes product candidates from the sitemap files
///
/// Each batch is one sitemap file. Every valid, not yet visited `<loc>`
/// becomes a depth-1 candidate; sitemap entries are never expanded.
pub struct SitemapFrontier {
    files: VecDeque<String>,
    cache: SitemapCache,
    fetcher: PageFetcher,
    visited: VisitedSet,
}

impl SitemapFrontier {
    pub fn new(
        config: &SitemapConfig,
        cache: SitemapCache,
        fetcher: PageFetcher,
        visited: VisitedSet,
    ) -> Self {
        Self {
            files: enumerate_sitemap_files(config).into(),
            cache,
            fetcher,
            visited,
        }
    }
}

#[async_trait]
impl FrontierSource for SitemapFrontier {
    async fn next_batch(&mut self) -> Option<Vec<CrawlTask>> {
        let file = self.files.pop_front()?;

        let locs = match self.cache.get_or_fetch(&file, &self.fetcher).await {
            Ok(locs) => locs,
            Err(e) => {
                warn!("Skipping sitemap {}: {}", file, e);
                return Some(Vec::new());
            }
        };

        let batch: Vec<CrawlTask> = locs
            .iter()
            .filter(|loc| is_valid_url(loc))
            .filter(|loc| self.visited.insert(loc))
            .map(|loc| CrawlTask::new(1, loc.clone()))
            .collect();

        debug!("Sitemap {} yielded {} new candidates", file, batch.len());
        Some(batch)
    }

    fn name(&self) -> &'static str {
        "sitemap"
    }
}

/// Collects the `<loc>` entries of every configured sitemap file
///
/// Files that fail to load are logged and contribute nothing.
pub async fn list_sitemap_links(
    config: &SitemapConfig,
    cache: &SitemapCache,
    fetcher: &PageFetcher,
) -> Vec<String> {
    let mut links = Vec::new();

    for file in enumerate_sitemap_files(config) {
        match cache.get_or_fetch(&file, fetcher).await {
            Ok(locs) => links.extend(locs.iter().cloned()),
            Err(e) => warn!("Skipping sitemap {}: {}", file, e),
        }
    }

    links
}
