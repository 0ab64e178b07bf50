use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::parse_uuid;
use crate::store::sqlite::queries::get_by_id;
use crate::store::{write_error, Resource, StoreError};

/// A user's review of a tour. One review per user per tour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub review: String,
    pub rating: f64,
    pub tour_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Create payload. `tour_id` may be omitted on the nested route, where it is
/// filled in from the path.
#[derive(Debug, Deserialize)]
pub struct ReviewDraft {
    pub review: String,
    pub rating: f64,
    #[serde(default)]
    pub tour_id: Option<Uuid>,
    pub user_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewPatch {
    pub review: Option<String>,
    pub rating: Option<f64>,
}

fn validate(review: &str, rating: f64) -> Result<(), StoreError> {
    if review.trim().is_empty() {
        return Err(StoreError::Validation(
            "Review can not be empty".to_string(),
        ));
    }
    if !(1.0..=5.0).contains(&rating) {
        return Err(StoreError::Validation(
            "Rating must be between 1.0 and 5.0".to_string(),
        ));
    }
    Ok(())
}

/// Recompute the owning tour's rating aggregates from its current reviews,
/// falling back to the defaults (0 reviews, 4.5 average) when none remain.
pub(crate) fn recalc_tour_ratings(conn: &Connection, tour_id: &str) -> Result<(), StoreError> {
    let (count, avg): (i64, Option<f64>) = conn.query_row(
        "SELECT COUNT(*), AVG(rating) FROM reviews WHERE tour_id = ?1",
        params![tour_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let (quantity, average) = match avg {
        Some(avg) if count > 0 => (count, (avg * 10.0).round() / 10.0),
        _ => (0, 4.5),
    };
    conn.execute(
        "UPDATE tours SET ratings_quantity = ?1, ratings_average = ?2 WHERE id = ?3",
        params![quantity, average, tour_id],
    )?;
    Ok(())
}

impl Resource for Review {
    const TABLE: &'static str = "reviews";
    const RESOURCE: &'static str = "review";
    const COLUMNS: &'static [&'static str] =
        &["id", "review", "rating", "tour_id", "user_id", "created_at"];

    type Draft = ReviewDraft;
    type Patch = ReviewPatch;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_uuid(row.get("id")?)?,
            review: row.get("review")?,
            rating: row.get("rating")?,
            tour_id: parse_uuid(row.get("tour_id")?)?,
            user_id: parse_uuid(row.get("user_id")?)?,
            created_at: row.get("created_at")?,
        })
    }

    fn insert(conn: &Connection, id: Uuid, draft: &ReviewDraft) -> Result<(), StoreError> {
        let tour_id = draft
            .tour_id
            .ok_or_else(|| StoreError::Validation("Review must belong to a tour".to_string()))?;
        validate(&draft.review, draft.rating)?;

        conn.execute(
            "INSERT INTO reviews (id, review, rating, tour_id, user_id, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id.to_string(),
                draft.review,
                draft.rating,
                tour_id.to_string(),
                draft.user_id.to_string(),
                Utc::now(),
            ],
        )
        .map_err(write_error)?;

        recalc_tour_ratings(conn, &tour_id.to_string())
    }

    fn update(conn: &Connection, id: Uuid, patch: &ReviewPatch) -> Result<usize, StoreError> {
        let Some(current) = get_by_id::<Review>(conn, id)? else {
            return Ok(0);
        };

        let review = patch.review.clone().unwrap_or(current.review);
        let rating = patch.rating.unwrap_or(current.rating);
        validate(&review, rating)?;

        let matched = conn
            .execute(
                "UPDATE reviews SET review = ?1, rating = ?2, version = version + 1 \
                 WHERE id = ?3",
                params![review, rating, id.to_string()],
            )
            .map_err(write_error)?;

        recalc_tour_ratings(conn, &current.tour_id.to_string())?;
        Ok(matched)
    }

    fn after_delete(conn: &Connection, record: &Self) -> Result<(), StoreError> {
        recalc_tour_ratings(conn, &record.tour_id.to_string())
    }
}
