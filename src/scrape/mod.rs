//! Product page scraping
//!
//! This module turns a fetched product page into a [`ProductRecord`]:
//! - Selector definitions for the catalog's markup
//! - The breadcrumb check that rejects soft-404 product pages
//! - Table-driven field extraction
//!
//! [`ProductRecord`]: crate::product::ProductRecord

mod classifier;
mod extractor;
mod selectors;

pub use classifier::GenuineProductClassifier;
pub use extractor::{parse_decimal, parse_price, ProductExtractor};
pub use selectors::SiteSelectors;

use thiserror::Error;

/// Errors raised while scraping a product page
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A recognised property carried a value that is not a number
    #[error("Invalid number for '{label}': '{value}'")]
    InvalidNumber { label: String, value: String },

    /// A built-in selector failed to compile
    #[error("Invalid selector '{0}'")]
    Selector(String),
}

/// Result type alias for scraping operations
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;
