//! Crawl frontiers
//!
//! A frontier hands the coordinator batches of product candidates. Two
//! sources exist: breadth-first link following from category seeds (here)
//! and sitemap enumeration (see the sitemap module).

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::extract_links;
use crate::crawler::visited::VisitedSet;
use crate::url::{is_product_page, is_valid_url};
use async_trait::async_trait;
use std::collections::VecDeque;
use tracing::{debug, warn};
use url::Url;

/// A page waiting to be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Distance from the seeds; seeds are depth 1
    pub depth: u32,
    pub url: String,
}

impl CrawlTask {
    pub fn new(depth: u32, url: impl Into<String>) -> Self {
        Self {
            depth,
            url: url.into(),
        }
    }
}

/// A source of product candidates
#[async_trait]
pub trait FrontierSource: Send {
    /// Returns the next batch of candidates
    ///
    /// An empty batch means the step produced nothing but the source is not
    /// exhausted; `None` means it is exhausted.
    async fn next_batch(&mut self) -> Option<Vec<CrawlTask>>;

    /// Short name used in logs and run records
    fn name(&self) -> &'static str;

    /// Listing pages fetched so far to discover links
    fn pages_expanded(&self) -> u64 {
        0
    }
}

/// Breadth-first link-following frontier
///
/// # Traversal Rules
///
/// 1. Seeds enter the visited set and the queue at depth 1
/// 2. Each step pops the oldest queued page (FIFO)
/// 3. Pages at `max_depth` are dropped without being fetched
/// 4. Otherwise the page is fetched and every valid, not yet visited link is
///    marked visited and queued at `depth + 1`
/// 5. Newly discovered links that look like product pages are also returned
///    as candidates at `depth + 1`
///
/// No task deeper than `max_depth` is ever created.
pub struct LinkFrontier {
    queue: VecDeque<CrawlTask>,
    pending: Vec<CrawlTask>,
    visited: VisitedSet,
    fetcher: PageFetcher,
    max_depth: u32,
    pages_expanded: u64,
}

impl LinkFrontier {
    pub fn new(seeds: &[String], visited: VisitedSet, fetcher: PageFetcher, max_depth: u32) -> Self {
        let mut queue = VecDeque::new();
        let mut pending = Vec::new();

        for seed in seeds {
            if !is_valid_url(seed) {
                warn!("Ignoring invalid seed URL: {}", seed);
                continue;
            }
            if !visited.insert(seed) {
                continue;
            }
            if is_product_page(seed) {
                pending.push(CrawlTask::new(1, seed.as_str()));
            }
            queue.push_back(CrawlTask::new(1, seed.as_str()));
        }

        Self {
            queue,
            pending,
            visited,
            fetcher,
            max_depth,
            pages_expanded: 0,
        }
    }

    /// Number of pages waiting to be expanded
    pub fn queued(&self) -> usize {
        self.queue.len()
    }
}

#[async_trait]
impl FrontierSource for LinkFrontier {
    async fn next_batch(&mut self) -> Option<Vec<CrawlTask>> {
        if !self.pending.is_empty() {
            return Some(std::mem::take(&mut self.pending));
        }

        let task = self.queue.pop_front()?;

        if task.depth >= self.max_depth {
            debug!("Depth limit reached, not expanding {}", task.url);
            return Some(Vec::new());
        }

        let body = match self.fetcher.fetch_text(&task.url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to expand {}: {}", task.url, e);
                return Some(Vec::new());
            }
        };
        self.pages_expanded += 1;

        let links = match Url::parse(&task.url) {
            Ok(base) => extract_links(&body, &base),
            Err(_) => Vec::new(),
        };

        let child_depth = task.depth + 1;
        let mut candidates = Vec::new();

        for link in links {
            if !is_valid_url(&link) || !self.visited.insert(&link) {
                continue;
            }
            if is_product_page(&link) {
                candidates.push(CrawlTask::new(child_depth, link.as_str()));
            }
            self.queue.push_back(CrawlTask::new(child_depth, link));
        }

        debug!(
            "Expanded {} (depth {}): {} candidates, {} queued",
            task.url,
            task.depth,
            candidates.len(),
            self.queue.len()
        );

        Some(candidates)
    }

    fn name(&self) -> &'static str {
        "links"
    }

    fn pages_expanded(&self) -> u64 {
        self.pages_expanded
    }
}
