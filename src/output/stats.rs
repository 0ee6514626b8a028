//! Crawl reports and database statistics
//!
//! This module provides the in-memory report built while a crawl runs and
//! the statistics read back from the product store for `--stats`.

use crate::state::TaskOutcome;
use crate::storage::{ProductStore, RunCounts, RunRecord, SqliteProductStore, StorageResult};
use std::collections::HashMap;
use std::time::Duration;

/// Totals for one crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Count of candidates by outcome
    pub outcomes: HashMap<TaskOutcome, u64>,

    /// Listing pages fetched to discover links
    pub pages_expanded: u64,

    /// Deepest task handed to the pipeline
    pub max_depth_dispatched: u32,

    pub elapsed: Duration,
}

impl CrawlReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one finished candidate
    pub fn record(&mut self, outcome: TaskOutcome) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
    }

    pub fn count(&self, outcome: TaskOutcome) -> u64 {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Number of candidates that reached a terminal outcome
    pub fn total(&self) -> u64 {
        self.outcomes.values().sum()
    }

    /// Number of candidates that wrote to the product store
    pub fn writes(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|(outcome, _)| outcome.is_write())
            .map(|(_, count)| count)
            .sum()
    }

    pub fn failures(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|(outcome, _)| outcome.is_failure())
            .map(|(_, count)| count)
            .sum()
    }

    /// Totals persisted with the run
    pub fn run_counts(&self) -> RunCounts {
        RunCounts {
            inserted: self.count(TaskOutcome::Inserted),
            updated: self.count(TaskOutcome::Updated),
            skipped: self.count(TaskOutcome::Skipped),
            failed: self.failures(),
            dropped: self.count(TaskOutcome::Dropped),
        }
    }
}

/// Prints a finished crawl's report to stdout
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");
    println!("  Candidates processed: {}", report.total());
    println!("  Products written: {}", report.writes());
    println!("  Listing pages expanded: {}", report.pages_expanded);
    println!("  Deepest task dispatched: {}", report.max_depth_dispatched);
    println!("  Elapsed: {:.1}s", report.elapsed.as_secs_f64());
    println!();

    println!("Outcomes:");
    for outcome in TaskOutcome::ALL {
        let count = report.count(outcome);
        if count > 0 {
            println!("  {}: {}", outcome, count);
        }
    }
}

/// Product store statistics
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Total number of stored products
    pub total_products: u64,

    /// Product counts per category, largest first
    pub categories: Vec<(String, u64)>,

    /// Most recent runs, newest first
    pub recent_runs: Vec<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The product store to query
/// * `run_limit` - How many recent runs to include
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(
    store: &SqliteProductStore,
    run_limit: usize,
) -> StorageResult<CrawlStatistics> {
    Ok(CrawlStatistics {
        total_products: store.count_products()?,
        categories: store.category_breakdown()?,
        recent_runs: store.recent_runs(run_limit)?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Product Statistics ===\n");

    println!("Overview:");
    println!("  Total products: {}", stats.total_products);
    println!();

    if !stats.categories.is_empty() {
        println!("Products by Category:");
        for (category, count) in &stats.categories {
            let percentage = if stats.total_products > 0 {
                (*count as f64 / stats.total_products as f64) * 100.0
            } else {
                0.0
            };
            let name = if category.is_empty() {
                "(none)"
            } else {
                category
            };
            println!("  {}: {} ({:.1}%)", name, count, percentage);
        }
        println!();
    }

    if !stats.recent_runs.is_empty() {
        println!("Recent Runs:");
        for run in &stats.recent_runs {
            println!(
                "  #{} [{}] {} {} -> {}: inserted {}, updated {}, skipped {}, failed {}, dropped {}",
                run.id,
                run.mode,
                run.status.to_db_string(),
                run.started_at,
                run.finished_at.as_deref().unwrap_or("-"),
                run.counts.inserted,
                run.counts.updated,
                run.counts.skipped,
                run.counts.failed,
                run.counts.dropped
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::ProductRecord;
    use crate::storage::RunStatus;
    use rust_decimal::Decimal;

    #[test]
    fn test_report_counts() {
        let mut report = CrawlReport::new();
        report.record(TaskOutcome::Inserted);
        report.record(TaskOutcome::Inserted);
        report.record(TaskOutcome::Skipped);
        report.record(TaskOutcome::FetchFailed);
        report.record(TaskOutcome::ExtractFailed);
        report.record(TaskOutcome::Dropped);
        report.record(TaskOutcome::Updated);

        assert_eq!(report.count(TaskOutcome::Inserted), 2);
        assert_eq!(report.count(TaskOutcome::Updated), 1);
        assert_eq!(report.total(), 7);
        assert_eq!(report.writes(), 3);
        assert_eq!(report.failures(), 2);

        let counts = report.run_counts();
        assert_eq!(counts.inserted, 2);
        assert_eq!(counts.updated, 1);
        assert_eq!(counts.skipped, 1);
        assert_eq!(counts.failed, 2);
        assert_eq!(counts.dropped, 1);
    }

    #[test]
    fn test_load_statistics() {
        let store = SqliteProductStore::open_in_memory().unwrap();
        store
            .insert(&ProductRecord::builder("Paine", "Brutarie", Decimal::new(450, 2)).build())
            .unwrap();
        let run_id = store.create_run("sitemap", "hash").unwrap();
        store
            .finish_run(run_id, RunStatus::Completed, &RunCounts::default())
            .unwrap();

        let stats = load_statistics(&store, 10).unwrap();
        assert_eq!(stats.total_products, 1);
        assert_eq!(stats.categories, vec![("Brutarie".to_string(), 1)]);
        assert_eq!(stats.recent_runs.len(), 1);
        assert_eq!(stats.recent_runs[0].mode, "sitemap");
    }
}
