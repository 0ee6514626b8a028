//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Opening the product store and recording the run
//! - Pulling candidate batches from a frontier
//! - Dispatching candidates to the product pipeline under a fetch cap
//! - Collecting per-candidate outcomes into a report

use crate::config::{Config, SaturationPolicy};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::frontier::{FrontierSource, LinkFrontier};
use crate::crawler::pipeline::ProductPipeline;
use crate::crawler::sitemap::{SitemapCache, SitemapFrontier};
use crate::crawler::upsert::UpsertPolicy;
use crate::crawler::visited::VisitedSet;
use crate::output::CrawlReport;
use crate::scrape::{GenuineProductClassifier, ProductExtractor};
use crate::state::TaskOutcome;
use crate::storage::{ProductStore, RunStatus, SqliteProductStore};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, warn};

/// How candidates are discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    /// Breadth-first link following from the configured seeds
    Links,
    /// Enumeration of the product sitemap files
    Sitemap,
}

impl CrawlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrawlMode::Links => "links",
            CrawlMode::Sitemap => "sitemap",
        }
    }

    /// Staleness threshold the mode's upsert policy uses
    pub fn freshness_threshold_hours(&self, config: &Config) -> i64 {
        match self {
            CrawlMode::Links => config.crawler.freshness_threshold_hours,
            CrawlMode::Sitemap => config.sitemap.freshness_threshold_hours,
        }
    }
}

/// Main crawler coordinator structure
///
/// Every candidate runs on its own task and holds one semaphore permit for
/// its whole lifetime, so at most `max_concurrent` candidates are in flight.
pub struct Coordinator {
    pipeline: Arc<ProductPipeline>,
    permits: Arc<Semaphore>,
    max_concurrent: usize,
    saturation: SaturationPolicy,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `pipeline` - Processing applied to every candidate
    /// * `max_concurrent` - Upper bound on candidates in flight (at least 1)
    /// * `saturation` - What to do with a candidate when no slot is free
    pub fn new(
        pipeline: Arc<ProductPipeline>,
        max_concurrent: usize,
        saturation: SaturationPolicy,
    ) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            pipeline,
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            saturation,
        }
    }

    /// Runs the main crawl loop until the frontier is exhausted
    ///
    /// With [`SaturationPolicy::Wait`] the loop blocks until a slot frees up,
    /// which also stops the frontier from running ahead. With
    /// [`SaturationPolicy::Drop`] a candidate that finds no free slot is
    /// recorded as [`TaskOutcome::Dropped`] and never retried.
    ///
    /// Returns once every dispatched candidate has finished.
    pub async fn run(&self, mut frontier: Box<dyn FrontierSource>) -> CrawlReport {
        info!(
            "Starting {} crawl: {} fetch slots, {} when saturated, products refreshed after {}h",
            frontier.name(),
            self.max_concurrent,
            self.saturation.as_str(),
            self.pipeline.policy().threshold_hours()
        );

        let start_time = Instant::now();
        let mut report = CrawlReport::new();
        let mut tasks: JoinSet<TaskOutcome> = JoinSet::new();

        while let Some(batch) = frontier.next_batch().await {
            for task in batch {
                let permit = match self.saturation {
                    SaturationPolicy::Wait => self.permits.clone().acquire_owned().await.ok(),
                    SaturationPolicy::Drop => self.permits.clone().try_acquire_owned().ok(),
                };

                let permit = match permit {
                    Some(permit) => permit,
                    None => {
                        warn!("No fetch slot free, dropping {}", task.url);
                        report.record(TaskOutcome::Dropped);
                        continue;
                    }
                };

                report.max_depth_dispatched = report.max_depth_dispatched.max(task.depth);

                let pipeline = self.pipeline.clone();
                tasks.spawn(async move {
                    let _permit = permit;
                    pipeline.process(&task).await
                });

                while let Some(joined) = tasks.try_join_next() {
                    Self::collect(&mut report, joined, start_time);
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            Self::collect(&mut report, joined, start_time);
        }

        report.pages_expanded = frontier.pages_expanded();
        report.elapsed = start_time.elapsed();

        info!(
            "Crawl completed: {} candidates in {:?} ({} inserted, {} updated, {} skipped, {} failed)",
            report.total(),
            report.elapsed,
            report.count(TaskOutcome::Inserted),
            report.count(TaskOutcome::Updated),
            report.count(TaskOutcome::Skipped),
            report.failures()
        );

        report
    }

    fn collect(
        report: &mut CrawlReport,
        joined: Result<TaskOutcome, JoinError>,
        start_time: Instant,
    ) {
        match joined {
            Ok(outcome) => report.record(outcome),
            Err(e) => {
                error!("Crawl task aborted: {}", e);
                report.record(TaskOutcome::Aborted);
            }
        }

        let done = report.total();
        if done % 25 == 0 {
            let rate = done as f64 / start_time.elapsed().as_secs_f64();
            info!(
                "Progress: {} candidates done, {} inserted, {:.2} candidates/sec",
                done,
                report.count(TaskOutcome::Inserted),
                rate
            );
        }
    }
}

/// Runs a complete crawl against the configured database
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `mode` - Link following or sitemap enumeration
/// * `config_hash` - Hash of the configuration file, stored with the run
pub async fn run_crawl(
    config: &Config,
    mode: CrawlMode,
    config_hash: &str,
) -> crate::Result<CrawlReport> {
    let store = Arc::new(SqliteProductStore::new(Path::new(
        &config.output.database_path,
    ))?);
    run_crawl_with_store(config, mode, config_hash, store).await
}

/// Runs a complete crawl writing to `store`
///
/// A crawl run row is opened before the first fetch and closed with the
/// outcome totals. Per-candidate failures never abort the run.
pub async fn run_crawl_with_store(
    config: &Config,
    mode: CrawlMode,
    config_hash: &str,
    store: Arc<SqliteProductStore>,
) -> crate::Result<CrawlReport> {
    let run_id = store.create_run(mode.as_str(), config_hash)?;
    info!("Starting crawl run {} ({})", run_id, mode.as_str());

    let report = match build_and_run(config, mode, store.clone()).await {
        Ok(report) => report,
        Err(e) => {
            store.finish_run(run_id, RunStatus::Failed, &Default::default())?;
            return Err(e);
        }
    };

    store.finish_run(run_id, RunStatus::Completed, &report.run_counts())?;
    let run = store.get_run(run_id)?;
    info!(
        "Crawl run {} {} (started {}): {} inserted, {} updated, {} failed",
        run.id,
        run.status.to_db_string(),
        run.started_at,
        run.counts.inserted,
        run.counts.updated,
        run.counts.failed
    );

    Ok(report)
}

async fn build_and_run(
    config: &Config,
    mode: CrawlMode,
    store: Arc<SqliteProductStore>,
) -> crate::Result<CrawlReport> {
    let fetcher = PageFetcher::new(&config.fetcher)?;
    let visited = VisitedSet::new();
    let policy = UpsertPolicy::new(mode.freshness_threshold_hours(config));

    let store: Arc<dyn ProductStore> = store;
    let pipeline = ProductPipeline::new(
        fetcher.clone(),
        GenuineProductClassifier::new(config.site.genuine_category_paths.clone())?,
        ProductExtractor::new()?,
        store,
        policy,
    );

    let frontier: Box<dyn FrontierSource> = match mode {
        CrawlMode::Links => Box::new(LinkFrontier::new(
            &config.crawler.seeds,
            visited,
            fetcher,
            config.crawler.max_depth,
        )),
        CrawlMode::Sitemap => Box::new(SitemapFrontier::new(
            &config.sitemap,
            SitemapCache::new(),
            fetcher,
            visited,
        )),
    };

    let coordinator = Coordinator::new(
        Arc::new(pipeline),
        config.crawler.max_concurrent_fetches as usize,
        config.crawler.saturation,
    );

    Ok(coordinator.run(frontier).await)
}
