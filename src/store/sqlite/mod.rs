pub mod connection;
pub mod queries;

use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::models::tour::TourStats;
use crate::query::QuerySpec;
use crate::store::{Resource, StoreError};
use connection::SqlitePool;

/// Cloneable handle to the SQLite store. Constructed explicitly at startup
/// and threaded through handler state; rusqlite calls run on the blocking
/// pool, and each listing spec executes exactly one statement.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn open(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = connection::create_pool(config)?;
        connection::init_schema(&pool)?;
        Ok(Self { pool })
    }

    /// Private in-memory store, used by tests and local experiments
    pub fn in_memory() -> Result<Self, StoreError> {
        let pool = connection::create_memory_pool()?;
        connection::init_schema(&pool)?;
        Ok(Self { pool })
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || connection::test_connection(&pool)).await?
    }

    pub async fn find<R: Resource>(&self, spec: QuerySpec) -> Result<Vec<JsonValue>, StoreError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || queries::find::<R>(&pool, &spec)).await?
    }

    pub async fn find_by_id<R: Resource>(&self, id: Uuid) -> Result<Option<R>, StoreError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || queries::find_by_id::<R>(&pool, id)).await?
    }

    pub async fn create<R: Resource>(&self, draft: R::Draft) -> Result<R, StoreError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || queries::create::<R>(&pool, &draft)).await?
    }

    pub async fn update_by_id<R: Resource>(
        &self,
        id: Uuid,
        patch: R::Patch,
    ) -> Result<Option<R>, StoreError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || queries::update_by_id::<R>(&pool, id, &patch)).await?
    }

    pub async fn delete_by_id<R: Resource>(&self, id: Uuid) -> Result<bool, StoreError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || queries::delete_by_id::<R>(&pool, id)).await?
    }

    pub async fn tour_by_id_or_slug(&self, key: String) -> Result<Option<JsonValue>, StoreError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || queries::tour_by_id_or_slug(&pool, &key)).await?
    }

    pub async fn tour_stats(&self) -> Result<Vec<TourStats>, StoreError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || queries::tour_stats(&pool)).await?
    }
}
