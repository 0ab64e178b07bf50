//! HTTP surface: router, handlers, and request middleware

pub mod handlers;
pub mod middleware;
pub mod routes;
