use rusqlite::{Connection, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use super::StoreError;

/// A persisted record type the generic handlers can operate on.
///
/// Implementors describe their table shape and supply the per-table SQL for
/// writes; the store provides the generic find/create/update/delete surface
/// on top. `COLUMNS` is the whitelist the query pipeline validates filter,
/// sort, and projection fields against; the internal `version` column stays
/// out of it.
pub trait Resource: Serialize + Sized + Send + 'static {
    /// Table name
    const TABLE: &'static str;

    /// Singular resource name used in error messages ("tour", "user", ...)
    const RESOURCE: &'static str;

    /// Queryable columns, excluding internal bookkeeping
    const COLUMNS: &'static [&'static str];

    /// TEXT columns that hold JSON documents and decode as such in listings
    const JSON_COLUMNS: &'static [&'static str] = &[];

    /// INTEGER columns that decode as booleans in listings
    const BOOL_COLUMNS: &'static [&'static str] = &[];

    /// Payload accepted on create
    type Draft: DeserializeOwned + Send + 'static;

    /// Payload accepted on update; every field optional
    type Patch: DeserializeOwned + Send + 'static;

    /// Map a full row (all public columns, by name) to the typed record
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Validate and insert a new record under the given id, running any
    /// schema-level side effects (slug derivation, aggregate upkeep)
    fn insert(conn: &Connection, id: Uuid, draft: &Self::Draft) -> Result<(), StoreError>;

    /// Validate and apply a partial update, returning the number of rows
    /// matched (0 when the id does not exist)
    fn update(conn: &Connection, id: Uuid, patch: &Self::Patch) -> Result<usize, StoreError>;

    /// Hook invoked after a record was deleted, with a snapshot of the
    /// removed record
    fn after_delete(_conn: &Connection, _record: &Self) -> Result<(), StoreError> {
        Ok(())
    }
}
