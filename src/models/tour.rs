use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::{invalid_column, parse_uuid};
use crate::store::sqlite::queries::get_by_id;
use crate::store::{write_error, Resource, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Difficult,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Difficult => "difficult",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "difficult" => Ok(Self::Difficult),
            other => Err(format!("unknown difficulty: {}", other)),
        }
    }
}

/// A bookable tour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tour {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub duration: f64,
    pub max_group_size: i64,
    pub difficulty: Difficulty,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_discount: Option<f64>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_cover: Option<String>,
    pub images: Vec<String>,
    pub ratings_average: f64,
    pub ratings_quantity: i64,
    pub created_at: DateTime<Utc>,
}

/// Create payload
#[derive(Debug, Deserialize)]
pub struct TourDraft {
    pub name: String,
    pub duration: f64,
    pub max_group_size: i64,
    pub difficulty: Difficulty,
    pub price: f64,
    #[serde(default)]
    pub price_discount: Option<f64>,
    pub summary: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_cover: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub ratings_average: Option<f64>,
    #[serde(default)]
    pub ratings_quantity: Option<i64>,
}

/// Update payload; absent fields keep their current value. Optional columns
/// (`price_discount`, `description`, `image_cover`) can be replaced but not
/// cleared back to null through a patch.
#[derive(Debug, Default, Deserialize)]
pub struct TourPatch {
    pub name: Option<String>,
    pub duration: Option<f64>,
    pub max_group_size: Option<i64>,
    pub difficulty: Option<Difficulty>,
    pub price: Option<f64>,
    pub price_discount: Option<f64>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub image_cover: Option<String>,
    pub images: Option<Vec<String>>,
    pub ratings_average: Option<f64>,
}

/// Aggregate row for the per-difficulty statistics endpoint
#[derive(Debug, Clone, Serialize)]
pub struct TourStats {
    pub difficulty: String,
    pub num_tours: i64,
    pub num_ratings: i64,
    pub avg_rating: f64,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

/// Derive the URL slug from a tour name
pub(crate) fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut prev_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            prev_dash = false;
        } else if !prev_dash && !slug.is_empty() {
            slug.push('-');
            prev_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn validate(
    name: &str,
    price: f64,
    price_discount: Option<f64>,
    summary: &str,
    ratings_average: f64,
) -> Result<(), StoreError> {
    let name_len = name.trim().chars().count();
    if !(10..=40).contains(&name_len) {
        return Err(StoreError::Validation(
            "A tour name must have between 10 and 40 characters".to_string(),
        ));
    }
    if price <= 0.0 {
        return Err(StoreError::Validation(
            "A tour price must be above zero".to_string(),
        ));
    }
    if let Some(discount) = price_discount {
        if discount >= price {
            return Err(StoreError::Validation(format!(
                "Discount price ({}) should be below regular price",
                discount
            )));
        }
    }
    if summary.trim().is_empty() {
        return Err(StoreError::Validation(
            "A tour must have a summary".to_string(),
        ));
    }
    if !(1.0..=5.0).contains(&ratings_average) {
        return Err(StoreError::Validation(
            "Rating must be between 1.0 and 5.0".to_string(),
        ));
    }
    Ok(())
}

impl Resource for Tour {
    const TABLE: &'static str = "tours";
    const RESOURCE: &'static str = "tour";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "slug",
        "duration",
        "max_group_size",
        "difficulty",
        "price",
        "price_discount",
        "summary",
        "description",
        "image_cover",
        "images",
        "ratings_average",
        "ratings_quantity",
        "created_at",
    ];
    const JSON_COLUMNS: &'static [&'static str] = &["images"];

    type Draft = TourDraft;
    type Patch = TourPatch;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let difficulty: String = row.get("difficulty")?;
        let images_raw: String = row.get("images")?;
        Ok(Self {
            id: parse_uuid(row.get("id")?)?,
            name: row.get("name")?,
            slug: row.get("slug")?,
            duration: row.get("duration")?,
            max_group_size: row.get("max_group_size")?,
            difficulty: difficulty.parse().map_err(invalid_column)?,
            price: row.get("price")?,
            price_discount: row.get("price_discount")?,
            summary: row.get("summary")?,
            description: row.get("description")?,
            image_cover: row.get("image_cover")?,
            images: serde_json::from_str(&images_raw).unwrap_or_default(),
            ratings_average: row.get("ratings_average")?,
            ratings_quantity: row.get("ratings_quantity")?,
            created_at: row.get("created_at")?,
        })
    }

    fn insert(conn: &Connection, id: Uuid, draft: &TourDraft) -> Result<(), StoreError> {
        let ratings_average = draft.ratings_average.unwrap_or(4.5);
        validate(
            &draft.name,
            draft.price,
            draft.price_discount,
            &draft.summary,
            ratings_average,
        )?;
        let images = serde_json::to_string(&draft.images)?;

        conn.execute(
            "INSERT INTO tours (id, name, slug, duration, max_group_size, difficulty, price, \
             price_discount, summary, description, image_cover, images, ratings_average, \
             ratings_quantity, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                id.to_string(),
                draft.name,
                slugify(&draft.name),
                draft.duration,
                draft.max_group_size,
                draft.difficulty.as_str(),
                draft.price,
                draft.price_discount,
                draft.summary,
                draft.description,
                draft.image_cover,
                images,
                ratings_average,
                draft.ratings_quantity.unwrap_or(0),
                Utc::now(),
            ],
        )
        .map_err(write_error)?;
        Ok(())
    }

    fn update(conn: &Connection, id: Uuid, patch: &TourPatch) -> Result<usize, StoreError> {
        let Some(current) = get_by_id::<Tour>(conn, id)? else {
            return Ok(0);
        };

        let name = patch.name.clone().unwrap_or(current.name);
        let price = patch.price.unwrap_or(current.price);
        let price_discount = patch.price_discount.or(current.price_discount);
        let summary = patch.summary.clone().unwrap_or(current.summary);
        let ratings_average = patch.ratings_average.unwrap_or(current.ratings_average);
        validate(&name, price, price_discount, &summary, ratings_average)?;

        let images = serde_json::to_string(patch.images.as_ref().unwrap_or(&current.images))?;
        let matched = conn
            .execute(
                "UPDATE tours SET name = ?1, slug = ?2, duration = ?3, max_group_size = ?4, \
                 difficulty = ?5, price = ?6, price_discount = ?7, summary = ?8, \
                 description = ?9, image_cover = ?10, images = ?11, ratings_average = ?12, \
                 version = version + 1 WHERE id = ?13",
                params![
                    name,
                    slugify(&name),
                    patch.duration.unwrap_or(current.duration),
                    patch.max_group_size.unwrap_or(current.max_group_size),
                    patch.difficulty.unwrap_or(current.difficulty).as_str(),
                    price,
                    price_discount,
                    summary,
                    patch.description.clone().or(current.description),
                    patch.image_cover.clone().or(current.image_cover),
                    images,
                    ratings_average,
                    id.to_string(),
                ],
            )
            .map_err(write_error)?;
        Ok(matched)
    }
}
