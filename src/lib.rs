// Library exports for testing
pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod query;
pub mod store;
