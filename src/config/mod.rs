//! Configuration module for Pantry Crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section except `[output]` may be omitted; the defaults target the
//! Auchan.ro catalog.
//!
//! # Example
//!
//! ```no_run
//! use pantry_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FetcherConfig, OutputConfig, SaturationPolicy, SiteConfig,
    SitemapConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

pub use validation::INDEX_PLACEHOLDER;
