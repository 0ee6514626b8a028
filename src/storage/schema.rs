//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Pantry Crawler database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Scraped products; decimals are stored as text to keep their exact scale
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    category TEXT NOT NULL,
    price TEXT NOT NULL,
    product_type TEXT,
    speciality TEXT,
    storage_conditions TEXT,
    weight TEXT,
    shelf_life TEXT,
    ingredients TEXT,
    kcal_per_100g TEXT,
    kj_per_100g TEXT,
    fats TEXT,
    saturated_fats TEXT,
    carbohydrates TEXT,
    sugars TEXT,
    salt TEXT,
    fiber TEXT,
    proteins TEXT,
    last_modified TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_products_name ON products(name);
CREATE INDEX IF NOT EXISTS idx_products_category ON products(category);

-- Track crawl runs
CREATE TABLE IF NOT EXISTS crawl_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    mode TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    inserted INTEGER NOT NULL DEFAULT 0,
    updated INTEGER NOT NULL DEFAULT 0,
    skipped INTEGER NOT NULL DEFAULT 0,
    failed INTEGER NOT NULL DEFAULT 0,
    dropped INTEGER NOT NULL DEFAULT 0
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
