//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ProductStore trait,
//! plus crawl run bookkeeping.

use crate::product::{Nutrition, ProductRecord, StoredProduct};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ProductStore, StorageError, StorageResult};
use crate::storage::{RunCounts, RunRecord, RunStatus};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

const PRODUCT_COLUMNS: &str = "id, name, category, price, product_type, speciality, \
     storage_conditions, weight, shelf_life, ingredients, kcal_per_100g, kj_per_100g, fats, \
     saturated_fats, carbohydrates, sugars, salt, fiber, proteins, last_modified";

const RUN_COLUMNS: &str = "id, mode, started_at, finished_at, config_hash, status, \
     inserted, updated, skipped, failed, dropped";

/// SQLite product store
///
/// The connection sits behind a mutex so one store can be shared by every
/// crawl task.
pub struct SqliteProductStore {
    conn: Mutex<Connection>,
}

impl SqliteProductStore {
    /// Opens or creates the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteProductStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Overrides a product's modification time
    ///
    /// Used to backdate records when exercising the freshness policy.
    pub fn set_last_modified(&self, id: i64, at: DateTime<Utc>) -> StorageResult<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE products SET last_modified = ?1 WHERE id = ?2",
            params![at.to_rfc3339(), id],
        )?;
        if changed == 0 {
            return Err(StorageError::ProductNotFound(id));
        }
        Ok(())
    }

    /// Product counts per category, largest first
    pub fn category_breakdown(&self) -> StorageResult<Vec<(String, u64)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT category, COUNT(*) FROM products GROUP BY category ORDER BY COUNT(*) DESC, category",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
        })?;

        let breakdown = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(breakdown)
    }

    // ===== Run Management =====

    /// Creates a new crawl run
    ///
    /// # Arguments
    ///
    /// * `mode` - Frontier the run uses (`links` or `sitemap`)
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    pub fn create_run(&self, mode: &str, config_hash: &str) -> StorageResult<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO crawl_runs (mode, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![
                mode,
                Utc::now().to_rfc3339(),
                config_hash,
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Marks a run as finished and records its outcome totals
    pub fn finish_run(&self, run_id: i64, status: RunStatus, counts: &RunCounts) -> StorageResult<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE crawl_runs
             SET status = ?1, finished_at = ?2, inserted = ?3, updated = ?4,
                 skipped = ?5, failed = ?6, dropped = ?7
             WHERE id = ?8",
            params![
                status.to_db_string(),
                Utc::now().to_rfc3339(),
                counts.inserted as i64,
                counts.updated as i64,
                counts.skipped as i64,
                counts.failed as i64,
                counts.dropped as i64,
                run_id
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    /// Gets a run by ID
    pub fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM crawl_runs WHERE id = ?1", RUN_COLUMNS),
            params![run_id],
            run_from_row,
        )
        .optional()?
        .ok_or(StorageError::RunNotFound(run_id))
    }

    /// Gets the most recent runs, newest first
    pub fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM crawl_runs ORDER BY id DESC LIMIT ?1",
            RUN_COLUMNS
        ))?;

        let runs = stmt
            .query_map(params![limit as i64], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }
}

impl ProductStore for SqliteProductStore {
    // ===== Product Lookup =====

    fn find_by_name(&self, name: &str) -> StorageResult<Option<StoredProduct>> {
        let conn = self.conn()?;
        let raw = conn
            .query_row(
                &format!(
                    "SELECT {} FROM products WHERE name = ?1 ORDER BY id ASC LIMIT 1",
                    PRODUCT_COLUMNS
                ),
                params![name],
                RawProduct::from_row,
            )
            .optional()?;

        raw.map(RawProduct::into_stored).transpose()
    }

    fn count_products(&self) -> StorageResult<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Product Writes =====

    fn insert(&self, record: &ProductRecord) -> StorageResult<i64> {
        let conn = self.conn()?;
        let n = &record.nutrition;
        conn.execute(
            "INSERT INTO products (
                name, category, price, product_type, speciality, storage_conditions,
                weight, shelf_life, ingredients, kcal_per_100g, kj_per_100g, fats,
                saturated_fats, carbohydrates, sugars, salt, fiber, proteins, last_modified
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
            params![
                record.name,
                record.category,
                record.price.to_string(),
                record.product_type,
                record.speciality,
                record.storage_conditions,
                decimal_to_db(record.weight),
                record.shelf_life,
                record.ingredients,
                decimal_to_db(n.kcal_per_100g),
                decimal_to_db(n.kj_per_100g),
                decimal_to_db(n.fats),
                decimal_to_db(n.saturated_fats),
                decimal_to_db(n.carbohydrates),
                decimal_to_db(n.sugars),
                decimal_to_db(n.salt),
                decimal_to_db(n.fiber),
                decimal_to_db(n.proteins),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, id: i64, record: &ProductRecord) -> StorageResult<()> {
        let conn = self.conn()?;
        let n = &record.nutrition;
        let changed = conn.execute(
            "UPDATE products SET
                name = ?1, category = ?2, price = ?3, product_type = ?4, speciality = ?5,
                storage_conditions = ?6, weight = ?7, shelf_life = ?8, ingredients = ?9,
                kcal_per_100g = ?10, kj_per_100g = ?11, fats = ?12, saturated_fats = ?13,
                carbohydrates = ?14, sugars = ?15, salt = ?16, fiber = ?17, proteins = ?18,
                last_modified = ?19
             WHERE id = ?20",
            params![
                record.name,
                record.category,
                record.price.to_string(),
                record.product_type,
                record.speciality,
                record.storage_conditions,
                decimal_to_db(record.weight),
                record.shelf_life,
                record.ingredients,
                decimal_to_db(n.kcal_per_100g),
                decimal_to_db(n.kj_per_100g),
                decimal_to_db(n.fats),
                decimal_to_db(n.saturated_fats),
                decimal_to_db(n.carbohydrates),
                decimal_to_db(n.sugars),
                decimal_to_db(n.salt),
                decimal_to_db(n.fiber),
                decimal_to_db(n.proteins),
                Utc::now().to_rfc3339(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::ProductNotFound(id));
        }
        Ok(())
    }
}

/// Product row as stored, before decimals and timestamps are parsed
struct RawProduct {
    id: i64,
    name: String,
    category: String,
    price: String,
    product_type: Option<String>,
    speciality: Option<String>,
    storage_conditions: Option<String>,
    weight: Option<String>,
    shelf_life: Option<String>,
    ingredients: Option<String>,
    nutrition: [Option<String>; 9],
    last_modified: String,
}

impl RawProduct {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            category: row.get(2)?,
            price: row.get(3)?,
            product_type: row.get(4)?,
            speciality: row.get(5)?,
            storage_conditions: row.get(6)?,
            weight: row.get(7)?,
            shelf_life: row.get(8)?,
            ingredients: row.get(9)?,
            nutrition: [
                row.get(10)?,
                row.get(11)?,
                row.get(12)?,
                row.get(13)?,
                row.get(14)?,
                row.get(15)?,
                row.get(16)?,
                row.get(17)?,
                row.get(18)?,
            ],
            last_modified: row.get(19)?,
        })
    }

    fn into_stored(self) -> StorageResult<StoredProduct> {
        let [kcal, kj, fats, saturated, carbohydrates, sugars, salt, fiber, proteins] =
            self.nutrition;

        let record = ProductRecord {
            price: decimal_from_db("price", &self.price)?,
            weight: optional_decimal_from_db("weight", self.weight)?,
            nutrition: Nutrition {
                kcal_per_100g: optional_decimal_from_db("kcal_per_100g", kcal)?,
                kj_per_100g: optional_decimal_from_db("kj_per_100g", kj)?,
                fats: optional_decimal_from_db("fats", fats)?,
                saturated_fats: optional_decimal_from_db("saturated_fats", saturated)?,
                carbohydrates: optional_decimal_from_db("carbohydrates", carbohydrates)?,
                sugars: optional_decimal_from_db("sugars", sugars)?,
                salt: optional_decimal_from_db("salt", salt)?,
                fiber: optional_decimal_from_db("fiber", fiber)?,
                proteins: optional_decimal_from_db("proteins", proteins)?,
            },
            name: self.name,
            category: self.category,
            product_type: self.product_type,
            speciality: self.speciality,
            storage_conditions: self.storage_conditions,
            shelf_life: self.shelf_life,
            ingredients: self.ingredients,
        };

        let last_modified = DateTime::parse_from_rfc3339(&self.last_modified)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                StorageError::Corrupt(format!(
                    "product {} has invalid last_modified '{}': {}",
                    self.id, self.last_modified, e
                ))
            })?;

        Ok(StoredProduct {
            id: self.id,
            record,
            last_modified,
        })
    }
}

fn decimal_to_db(value: Option<Decimal>) -> Option<String> {
    value.map(|d| d.to_string())
}

fn decimal_from_db(column: &str, value: &str) -> StorageResult<Decimal> {
    Decimal::from_str(value).map_err(|e| {
        StorageError::Corrupt(format!("column {} holds '{}': {}", column, value, e))
    })
}

fn optional_decimal_from_db(column: &str, value: Option<String>) -> StorageResult<Option<Decimal>> {
    value.map(|v| decimal_from_db(column, &v)).transpose()
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        mode: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?).unwrap_or(RunStatus::Failed),
        counts: RunCounts {
            inserted: row.get::<_, i64>(6)? as u64,
            updated: row.get::<_, i64>(7)? as u64,
            skipped: row.get::<_, i64>(8)? as u64,
            failed: row.get::<_, i64>(9)? as u64,
            dropped: row.get::<_, i64>(10)? as u64,
        },
    })
}
