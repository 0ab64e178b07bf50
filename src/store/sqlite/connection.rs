use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::store::StoreError;

pub type SqlitePool = Pool<SqliteConnectionManager>;

fn with_pragmas(manager: SqliteConnectionManager) -> SqliteConnectionManager {
    manager.with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON"))
}

pub fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool, StoreError> {
    if let Some(parent) = Path::new(&config.path).parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            StoreError::Validation(format!("Failed to create database directory: {}", e))
        })?;
    }

    let manager = with_pragmas(SqliteConnectionManager::file(&config.path));

    let pool = Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(Duration::from_secs(config.connection_timeout_seconds))
        .build(manager)?;
    Ok(pool)
}

/// Pool over a private in-memory database. Capped at one connection so every
/// handle sees the same database; used by the test suite and local demos.
pub fn create_memory_pool() -> Result<SqlitePool, StoreError> {
    let manager = with_pragmas(SqliteConnectionManager::memory());
    let pool = Pool::builder().max_size(1).build(manager)?;
    Ok(pool)
}

pub fn test_connection(pool: &SqlitePool) -> Result<(), StoreError> {
    let conn = pool.get()?;
    conn.query_row("SELECT 1", [], |_| Ok(()))?;
    Ok(())
}

pub fn init_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    let conn = pool.get()?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS tours (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            slug TEXT NOT NULL,
            duration REAL NOT NULL,
            max_group_size INTEGER NOT NULL,
            difficulty TEXT NOT NULL,
            price REAL NOT NULL,
            price_discount REAL,
            summary TEXT NOT NULL,
            description TEXT,
            image_cover TEXT,
            images TEXT NOT NULL DEFAULT '[]',
            ratings_average REAL NOT NULL DEFAULT 4.5,
            ratings_quantity INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_tours_slug ON tours(slug);
        CREATE INDEX IF NOT EXISTS idx_tours_price ON tours(price);
        CREATE INDEX IF NOT EXISTS idx_tours_ratings ON tours(ratings_average);

        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            photo TEXT,
            role TEXT NOT NULL DEFAULT 'user',
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS reviews (
            id TEXT PRIMARY KEY,
            review TEXT NOT NULL,
            rating REAL NOT NULL,
            tour_id TEXT NOT NULL REFERENCES tours(id) ON DELETE CASCADE,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 0,
            UNIQUE(tour_id, user_id)
        );

        CREATE INDEX IF NOT EXISTS idx_reviews_tour ON reviews(tour_id);
        CREATE INDEX IF NOT EXISTS idx_reviews_user ON reviews(user_id);
        "#,
    )?;

    Ok(())
}
