//! Crawler module for candidate discovery and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - HTML link extraction and sitemap parsing
//! - Link-following and sitemap frontiers sharing one visited set
//! - The per-candidate pipeline and its upsert policy
//! - Overall crawl coordination under a concurrency cap

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod pipeline;
mod sitemap;
mod upsert;
mod visited;

pub use coordinator::{run_crawl, run_crawl_with_store, Coordinator, CrawlMode};
pub use fetcher::{build_http_client, FetchError, PageFetcher};
pub use frontier::{CrawlTask, FrontierSource, LinkFrontier};
pub use parser::extract_links;
pub use pipeline::ProductPipeline;
pub use sitemap::{
    enumerate_sitemap_files, list_sitemap_links, parse_sitemap, SitemapCache, SitemapError,
    SitemapFrontier,
};
pub use upsert::{Reconciliation, UpsertPolicy};
pub use visited::VisitedSet;
