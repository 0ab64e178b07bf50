use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::review::ReviewDraft;
use crate::models::tour::TourStats;
use crate::models::{Review, Tour};
use crate::query::{PageLimits, QueryFeatures, QuerySpec};
use crate::store::{Resource, SqliteStore};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: SqliteStore,
    pub page_limits: PageLimits,
}

/// Success envelope: `status`, an optional `results` count for listings, and
/// the payload under `data.data`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<usize>,
    pub data: DataEnvelope<T>,
}

#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn single(data: T) -> Self {
        Self {
            status: "success",
            results: None,
            data: DataEnvelope { data },
        }
    }

    pub fn list(data: T, results: usize) -> Self {
        Self {
            status: "success",
            results: Some(results),
            data: DataEnvelope { data },
        }
    }
}

/// Run the full feature pipeline over the raw query parameters
fn build_spec<R: Resource>(
    params: &BTreeMap<String, String>,
    limits: &PageLimits,
) -> Result<QuerySpec, ApiError> {
    Ok(QueryFeatures::new(params, R::COLUMNS)
        .filter()?
        .sort()?
        .limit_fields()?
        .paginate(limits)?
        .into_spec())
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "natours-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// List records of one resource type, shaped by the query string
pub async fn list<R: Resource>(
    State(state): State<AppState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let spec = build_spec::<R>(&params, &state.page_limits)?;
    let records = state.store.find::<R>(spec).await?;
    let results = records.len();
    info!(resource = R::RESOURCE, results, "List request completed");
    Ok(Json(ApiResponse::list(records, results)))
}

/// Fetch a single record by id
pub async fn get_one<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<R>>, ApiError> {
    let record = state
        .store
        .find_by_id::<R>(id)
        .await?
        .ok_or(ApiError::NotFound(R::RESOURCE))?;
    Ok(Json(ApiResponse::single(record)))
}

/// Insert a new record from the request body
pub async fn create<R: Resource>(
    State(state): State<AppState>,
    Json(draft): Json<R::Draft>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.store.create::<R>(draft).await?;
    info!(resource = R::RESOURCE, "Record created");
    Ok((StatusCode::CREATED, Json(ApiResponse::single(record))))
}

/// Apply a partial update by id, re-validating schema constraints
pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<R::Patch>,
) -> Result<Json<ApiResponse<R>>, ApiError> {
    let record = state
        .store
        .update_by_id::<R>(id, patch)
        .await?
        .ok_or(ApiError::NotFound(R::RESOURCE))?;
    Ok(Json(ApiResponse::single(record)))
}

/// Delete by id; 204 with an empty body on success
pub async fn delete_one<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.store.delete_by_id::<R>(id).await? {
        info!(resource = R::RESOURCE, %id, "Record deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(R::RESOURCE))
    }
}

/// Tour lookup by id or slug, with its reviews populated
pub async fn get_tour(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<JsonValue>>, ApiError> {
    let doc = state
        .store
        .tour_by_id_or_slug(key)
        .await?
        .ok_or(ApiError::NotFound(Tour::RESOURCE))?;
    Ok(Json(ApiResponse::single(doc)))
}

/// The `top-5-cheap` alias: preset control parameters, then the normal
/// listing pipeline
pub async fn top_tours(
    State(state): State<AppState>,
    Query(mut params): Query<BTreeMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    params.insert("limit".to_string(), "5".to_string());
    params.insert("sort".to_string(), "-ratings_average,price".to_string());
    params.insert(
        "fields".to_string(),
        "name,price,ratings_average,summary,difficulty".to_string(),
    );

    let spec = build_spec::<Tour>(&params, &state.page_limits)?;
    let records = state.store.find::<Tour>(spec).await?;
    let results = records.len();
    Ok(Json(ApiResponse::list(records, results)))
}

/// Aggregate tour statistics per difficulty
pub async fn tour_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TourStats>>>, ApiError> {
    let stats = state.store.tour_stats().await?;
    Ok(Json(ApiResponse::single(stats)))
}

/// Reviews of one tour, scoped by the path parameter
pub async fn list_tour_reviews(
    State(state): State<AppState>,
    Path(tour_id): Path<Uuid>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let spec = build_spec::<Review>(&params, &state.page_limits)?.scoped("tour_id", tour_id);
    let records = state.store.find::<Review>(spec).await?;
    let results = records.len();
    Ok(Json(ApiResponse::list(records, results)))
}

/// Create a review under a tour; the owning tour defaults from the path when
/// the body omits it
pub async fn create_tour_review(
    State(state): State<AppState>,
    Path(tour_id): Path<Uuid>,
    Json(mut draft): Json<ReviewDraft>,
) -> Result<impl IntoResponse, ApiError> {
    if draft.tour_id.is_none() {
        draft.tour_id = Some(tour_id);
    }
    let record = state.store.create::<Review>(draft).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::single(record))))
}
