//! Staleness-gated upsert
//!
//! A scraped product is inserted when its name is new. A product that
//! already exists is overwritten only once its stored copy is at least
//! `threshold_hours` old; younger copies are left untouched.

use crate::product::ProductRecord;
use crate::storage::{ProductStore, StorageResult};
use chrono::{DateTime, Utc};
use tracing::info;

/// What the upsert did with one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    Inserted,
    Updated,
    Skipped,
}

/// Upsert rule for one crawl mode
///
/// Link crawls use a 12 hour threshold and sitemap crawls 24 hours. A
/// threshold of 0 refreshes every existing product.
#[derive(Debug, Clone, Copy)]
pub struct UpsertPolicy {
    threshold_hours: i64,
}

impl UpsertPolicy {
    pub fn new(threshold_hours: i64) -> Self {
        Self { threshold_hours }
    }

    pub fn threshold_hours(&self) -> i64 {
        self.threshold_hours
    }

    /// Inserts or refreshes `record` as of now
    pub fn reconcile(
        &self,
        store: &dyn ProductStore,
        record: &ProductRecord,
    ) -> StorageResult<Reconciliation> {
        self.reconcile_at(store, record, Utc::now())
    }

    /// Inserts or refreshes `record`, judging staleness against `now`
    ///
    /// Lookup is by exact name. Age is measured in whole elapsed hours, so a
    /// copy stored 11h59m ago is 11 hours old.
    pub fn reconcile_at(
        &self,
        store: &dyn ProductStore,
        record: &ProductRecord,
        now: DateTime<Utc>,
    ) -> StorageResult<Reconciliation> {
        let existing = match store.find_by_name(&record.name)? {
            Some(existing) => existing,
            None => {
                let id = store.insert(record)?;
                info!("Inserted product {} (id {})", record.name, id);
                return Ok(Reconciliation::Inserted);
            }
        };

        let age_hours = (now - existing.last_modified).num_hours();
        if age_hours >= self.threshold_hours {
            store.update(existing.id, record)?;
            info!(
                "Updated product {} (id {}, {}h old)",
                record.name, existing.id, age_hours
            );
            Ok(Reconciliation::Updated)
        } else {
            info!(
                "Product {} is not eligible for update ({}h old, threshold {}h)",
                record.name, age_hours, self.threshold_hours
            );
            Ok(Reconciliation::Skipped)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteProductStore;
    use chrono::Duration;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn record(price: &str) -> ProductRecord {
        ProductRecord::builder(
            "Branza Cottage 180g".to_string(),
            "Lactate".to_string(),
            Decimal::from_str(price).unwrap(),
        )
        .build()
    }

    fn store_with_age(hours: i64) -> (SqliteProductStore, i64, DateTime<Utc>) {
        let store = SqliteProductStore::open_in_memory().unwrap();
        let id = store.insert(&record("8.49")).unwrap();
        let now = Utc::now();
        store
            .set_last_modified(id, now - Duration::hours(hours))
            .unwrap();
        (store, id, now)
    }

    #[test]
    fn test_new_product_inserted() {
        let store = SqliteProductStore::open_in_memory().unwrap();
        let policy = UpsertPolicy::new(12);

        let result = policy.reconcile(&store, &record("8.49")).unwrap();
        assert_eq!(result, Reconciliation::Inserted);
        assert_eq!(store.count_products().unwrap(), 1);
    }

    #[test]
    fn test_fresh_product_skipped() {
        let (store, _, now) = store_with_age(11);
        let policy = UpsertPolicy::new(12);

        let result = policy.reconcile_at(&store, &record("9.99"), now).unwrap();
        assert_eq!(result, Reconciliation::Skipped);

        let stored = store.find_by_name("Branza Cottage 180g").unwrap().unwrap();
        assert_eq!(stored.record.price, Decimal::from_str("8.49").unwrap());
    }

    #[test]
    fn test_stale_product_updated_at_threshold() {
        let (store, id, now) = store_with_age(12);
        let policy = UpsertPolicy::new(12);

        let result = policy.reconcile_at(&store, &record("9.99"), now).unwrap();
        assert_eq!(result, Reconciliation::Updated);

        let stored = store.find_by_name("Branza Cottage 180g").unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.record.price, Decimal::from_str("9.99").unwrap());
        assert_eq!(store.count_products().unwrap(), 1);
    }

    #[test]
    fn test_sitemap_threshold() {
        let (store, _, now) = store_with_age(23);
        let policy = UpsertPolicy::new(24);
        assert_eq!(
            policy.reconcile_at(&store, &record("9.99"), now).unwrap(),
            Reconciliation::Skipped
        );

        let (store, _, now) = store_with_age(30);
        assert_eq!(
            policy.reconcile_at(&store, &record("9.99"), now).unwrap(),
            Reconciliation::Updated
        );
    }

    #[test]
    fn test_zero_threshold_always_refreshes() {
        let (store, _, now) = store_with_age(0);
        let policy = UpsertPolicy::new(0);
        assert_eq!(
            policy.reconcile_at(&store, &record("9.99"), now).unwrap(),
            Reconciliation::Updated
        );
    }
}
