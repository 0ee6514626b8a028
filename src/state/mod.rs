//! State module for tracking crawl progress
//!
//! This module provides the per-candidate outcome recorded by the crawl
//! pipeline.
//!
//! # Components
//!
//! - `TaskOutcome`: Terminal result of one product candidate (inserted, skipped, failed, ...)

mod outcome;

// Re-export main types
pub use outcome::TaskOutcome;
