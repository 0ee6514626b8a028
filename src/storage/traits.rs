//! Storage traits and error types
//!
//! This module defines the product store interface the crawl pipeline writes
//! through, and its error type.

use crate::product::{ProductRecord, StoredProduct};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Product persistence used by the upsert policy
///
/// Implementations are shared by every crawl task, so all methods take
/// `&self` and the trait requires `Send + Sync`. The store owns the
/// `last_modified` timestamp: `insert` and `update` stamp the current time.
pub trait ProductStore: Send + Sync {
    // ===== Product Lookup =====

    /// Finds a product by exact name
    ///
    /// If several rows share the name, the oldest (lowest id) is returned.
    fn find_by_name(&self, name: &str) -> StorageResult<Option<StoredProduct>>;

    /// Counts stored products
    fn count_products(&self) -> StorageResult<u64>;

    // ===== Product Writes =====

    /// Inserts a new product
    ///
    /// # Returns
    ///
    /// The id assigned to the product
    fn insert(&self, record: &ProductRecord) -> StorageResult<i64>;

    /// Overwrites every scraped field of product `id` and refreshes its timestamp
    ///
    /// # Errors
    ///
    /// `StorageError::ProductNotFound` if no product has that id
    fn update(&self, id: i64, record: &ProductRecord) -> StorageResult<()>;
}
