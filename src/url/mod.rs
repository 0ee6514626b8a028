//! URL handling module for Pantry Crawler
//!
//! This module provides URL validation, product-page detection and the
//! normalization used to key the visited set.

mod classify;
mod normalize;

pub use classify::{is_product_page, is_valid_url};
pub use normalize::{normalize_url, visited_key};
