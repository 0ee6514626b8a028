//! Per-candidate processing
//!
//! fetch -> classify -> extract -> upsert. Each step that can fail maps to a
//! [`TaskOutcome`]; nothing here aborts the crawl.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::frontier::CrawlTask;
use crate::crawler::upsert::{Reconciliation, UpsertPolicy};
use crate::product::ProductRecord;
use crate::scrape::{ExtractResult, GenuineProductClassifier, ProductExtractor};
use crate::state::TaskOutcome;
use crate::storage::ProductStore;
use scraper::Html;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Result of looking at a fetched page
enum PageVerdict {
    NotProduct,
    Scraped(ExtractResult<Option<ProductRecord>>),
}

/// Turns product candidates into store writes
pub struct ProductPipeline {
    fetcher: PageFetcher,
    classifier: GenuineProductClassifier,
    extractor: ProductExtractor,
    store: Arc<dyn ProductStore>,
    policy: UpsertPolicy,
}

impl ProductPipeline {
    pub fn new(
        fetcher: PageFetcher,
        classifier: GenuineProductClassifier,
        extractor: ProductExtractor,
        store: Arc<dyn ProductStore>,
        policy: UpsertPolicy,
    ) -> Self {
        Self {
            fetcher,
            classifier,
            extractor,
            store,
            policy,
        }
    }

    pub fn policy(&self) -> UpsertPolicy {
        self.policy
    }

    /// Processes one candidate end to end
    pub async fn process(&self, task: &CrawlTask) -> TaskOutcome {
        debug!("Processing {} (depth {})", task.url, task.depth);

        let body = match self.fetcher.fetch_text(&task.url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to fetch product page: {}", e);
                return TaskOutcome::FetchFailed;
            }
        };

        let record = match self.inspect(&body) {
            PageVerdict::NotProduct => {
                info!("Skipping {}: not a catalog product", task.url);
                return TaskOutcome::NotProduct;
            }
            PageVerdict::Scraped(Ok(Some(record))) => record,
            PageVerdict::Scraped(Ok(None)) => {
                debug!("No name or price on {}", task.url);
                return TaskOutcome::NoRecord;
            }
            PageVerdict::Scraped(Err(e)) => {
                warn!("Discarding {}: {}", task.url, e);
                return TaskOutcome::ExtractFailed;
            }
        };

        match self.policy.reconcile(self.store.as_ref(), &record) {
            Ok(Reconciliation::Inserted) => TaskOutcome::Inserted,
            Ok(Reconciliation::Updated) => TaskOutcome::Updated,
            Ok(Reconciliation::Skipped) => TaskOutcome::Skipped,
            Err(e) => {
                error!("Failed to store {} from {}: {}", record.name, task.url, e);
                TaskOutcome::StoreFailed
            }
        }
    }

    // The parsed document is not Send, so it never lives across an await.
    fn inspect(&self, body: &str) -> PageVerdict {
        let document = Html::parse_document(body);
        if !self.classifier.is_genuine_product(&document) {
            return PageVerdict::NotProduct;
        }
        PageVerdict::Scraped(self.extractor.extract(&document))
    }
}
