use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::{json, Value as JsonValue};
use tracing::debug;
use uuid::Uuid;

use crate::models::review::Review;
use crate::models::tour::{Tour, TourStats};
use crate::query::{FilterValue, QuerySpec};
use crate::store::sqlite::connection::SqlitePool;
use crate::store::{Resource, StoreError};

fn select_columns<R: Resource>(spec: &QuerySpec) -> Vec<String> {
    match &spec.fields {
        Some(fields) => fields.clone(),
        None => R::COLUMNS.iter().map(|c| c.to_string()).collect(),
    }
}

/// Assemble the single SELECT a query spec describes. Field names were
/// validated against the resource's column whitelist upstream; values are
/// always bound as positional parameters.
fn build_select<R: Resource>(spec: &QuerySpec, columns: &[String]) -> (String, Vec<Value>) {
    let mut sql = format!("SELECT {} FROM {}", columns.join(", "), R::TABLE);
    let mut params: Vec<Value> = Vec::new();

    if !spec.filters.is_empty() {
        let clauses: Vec<String> = spec
            .filters
            .iter()
            .enumerate()
            .map(|(i, f)| format!("{} {} ?{}", f.field, f.op.sql(), i + 1))
            .collect();
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));

        for filter in &spec.filters {
            params.push(match &filter.value {
                FilterValue::Number(n) => Value::Real(*n),
                FilterValue::Bool(b) => Value::Integer(*b as i64),
                FilterValue::Text(s) => Value::Text(s.clone()),
            });
        }
    }

    if !spec.sort.is_empty() {
        let keys: Vec<String> = spec
            .sort
            .iter()
            .map(|k| format!("{} {}", k.field, k.direction.sql()))
            .collect();
        sql.push_str(" ORDER BY ");
        sql.push_str(&keys.join(", "));
    }

    if spec.limit > 0 {
        sql.push_str(&format!(" LIMIT {} OFFSET {}", spec.limit, spec.skip));
    }

    (sql, params)
}

/// Map a projected row to a JSON document, decoding JSON-in-TEXT and boolean
/// columns per the resource's declarations.
fn row_to_document<R: Resource>(
    row: &rusqlite::Row<'_>,
    columns: &[String],
) -> rusqlite::Result<JsonValue> {
    let mut doc = serde_json::Map::with_capacity(columns.len());
    for (i, col) in columns.iter().enumerate() {
        let value = match row.get_ref(i)? {
            ValueRef::Null => JsonValue::Null,
            ValueRef::Integer(n) => {
                if R::BOOL_COLUMNS.contains(&col.as_str()) {
                    json!(n != 0)
                } else {
                    json!(n)
                }
            }
            ValueRef::Real(f) => json!(f),
            ValueRef::Text(bytes) => {
                let text = String::from_utf8_lossy(bytes).into_owned();
                if R::JSON_COLUMNS.contains(&col.as_str()) {
                    serde_json::from_str(&text).unwrap_or(JsonValue::String(text))
                } else {
                    JsonValue::String(text)
                }
            }
            ValueRef::Blob(_) => JsonValue::Null,
        };
        doc.insert(col.clone(), value);
    }
    Ok(JsonValue::Object(doc))
}

pub fn find<R: Resource>(pool: &SqlitePool, spec: &QuerySpec) -> Result<Vec<JsonValue>, StoreError> {
    let conn = pool.get()?;
    let columns = select_columns::<R>(spec);
    let (sql, params) = build_select::<R>(spec, &columns);
    debug!("Generated SQL: {}", sql);

    let mut stmt = conn.prepare(&sql)?;
    let docs = stmt
        .query_map(params_from_iter(params), |row| {
            row_to_document::<R>(row, &columns)
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(docs)
}

pub(crate) fn get_by_id<R: Resource>(conn: &Connection, id: Uuid) -> Result<Option<R>, StoreError> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id = ?1",
        R::COLUMNS.join(", "),
        R::TABLE
    );
    let record = conn
        .query_row(&sql, params![id.to_string()], |row| R::from_row(row))
        .optional()?;
    Ok(record)
}

pub fn find_by_id<R: Resource>(pool: &SqlitePool, id: Uuid) -> Result<Option<R>, StoreError> {
    let conn = pool.get()?;
    get_by_id::<R>(&conn, id)
}

pub fn create<R: Resource>(pool: &SqlitePool, draft: &R::Draft) -> Result<R, StoreError> {
    let conn = pool.get()?;
    let id = Uuid::new_v4();
    R::insert(&conn, id, draft)?;
    get_by_id::<R>(&conn, id)?.ok_or(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
}

pub fn update_by_id<R: Resource>(
    pool: &SqlitePool,
    id: Uuid,
    patch: &R::Patch,
) -> Result<Option<R>, StoreError> {
    let conn = pool.get()?;
    let matched = R::update(&conn, id, patch)?;
    if matched == 0 {
        return Ok(None);
    }
    get_by_id::<R>(&conn, id)
}

pub fn delete_by_id<R: Resource>(pool: &SqlitePool, id: Uuid) -> Result<bool, StoreError> {
    let conn = pool.get()?;
    let Some(record) = get_by_id::<R>(&conn, id)? else {
        return Ok(false);
    };
    conn.execute(
        &format!("DELETE FROM {} WHERE id = ?1", R::TABLE),
        params![id.to_string()],
    )?;
    R::after_delete(&conn, &record)?;
    Ok(true)
}

/// Tour lookup by id or slug, with the tour's reviews eagerly joined into the
/// returned document.
pub fn tour_by_id_or_slug(pool: &SqlitePool, key: &str) -> Result<Option<JsonValue>, StoreError> {
    let conn = pool.get()?;

    let tour = match Uuid::parse_str(key) {
        Ok(id) => get_by_id::<Tour>(&conn, id)?,
        Err(_) => {
            let sql = format!(
                "SELECT {} FROM tours WHERE slug = ?1",
                Tour::COLUMNS.join(", ")
            );
            conn.query_row(&sql, params![key], |row| Tour::from_row(row))
                .optional()?
        }
    };
    let Some(tour) = tour else {
        return Ok(None);
    };

    let sql = format!(
        "SELECT {} FROM reviews WHERE tour_id = ?1 ORDER BY created_at DESC",
        Review::COLUMNS.join(", ")
    );
    let mut stmt = conn.prepare(&sql)?;
    let reviews = stmt
        .query_map(params![tour.id.to_string()], |row| Review::from_row(row))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut doc = serde_json::to_value(&tour)?;
    doc["reviews"] = serde_json::to_value(&reviews)?;
    Ok(Some(doc))
}

/// Aggregate statistics per difficulty over well-rated tours.
pub fn tour_stats(pool: &SqlitePool) -> Result<Vec<TourStats>, StoreError> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(
        "SELECT difficulty, COUNT(*) AS num_tours, SUM(ratings_quantity) AS num_ratings, \
         AVG(ratings_average) AS avg_rating, AVG(price) AS avg_price, \
         MIN(price) AS min_price, MAX(price) AS max_price \
         FROM tours WHERE ratings_average >= 4.5 \
         GROUP BY difficulty ORDER BY avg_price",
    )?;
    let stats = stmt
        .query_map([], |row| {
            Ok(TourStats {
                difficulty: row.get("difficulty")?,
                num_tours: row.get("num_tours")?,
                num_ratings: row.get("num_ratings")?,
                avg_rating: row.get("avg_rating")?,
                avg_price: row.get("avg_price")?,
                min_price: row.get("min_price")?,
                max_price: row.get("max_price")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(stats)
}
