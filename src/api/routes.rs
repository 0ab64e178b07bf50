use axum::{middleware, routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create, create_tour_review, delete_one, get_one, get_tour, health, list, list_tour_reviews,
    top_tours, tour_stats, update, AppState,
};
use super::middleware::logging_middleware;
use crate::models::{Review, Tour, User};

pub fn create_router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health))
        // Tours
        .route("/api/v1/tours", get(list::<Tour>).post(create::<Tour>))
        .route("/api/v1/tours/top-5-cheap", get(top_tours))
        .route("/api/v1/tours/stats", get(tour_stats))
        .route(
            "/api/v1/tours/:id",
            get(get_tour)
                .patch(update::<Tour>)
                .delete(delete_one::<Tour>),
        )
        // Reviews nested under a tour
        .route(
            "/api/v1/tours/:id/reviews",
            get(list_tour_reviews).post(create_tour_review),
        )
        // Users
        .route("/api/v1/users", get(list::<User>).post(create::<User>))
        .route(
            "/api/v1/users/:id",
            get(get_one::<User>)
                .patch(update::<User>)
                .delete(delete_one::<User>),
        )
        // Reviews
        .route(
            "/api/v1/reviews",
            get(list::<Review>).post(create::<Review>),
        )
        .route(
            "/api/v1/reviews/:id",
            get(get_one::<Review>)
                .patch(update::<Review>)
                .delete(delete_one::<Review>),
        )
        // Add middleware (order matters: compression -> logging -> cors -> trace)
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(logging_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // Add shared state
        .with_state(state)
}
