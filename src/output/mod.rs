//! Output module for crawl reports and statistics
//!
//! This module handles:
//! - Aggregating per-candidate outcomes into a crawl report
//! - Reading product and run statistics back from the database

pub mod stats;

pub use stats::{load_statistics, print_report, print_statistics, CrawlReport, CrawlStatistics};
