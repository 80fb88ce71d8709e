//! Axum router and service wiring.
//!
//! - `services.rs`: repository wiring
//! - `routes/`: handlers, one file per resource
//! - `dto.rs`: query parameters and response bodies
//! - `errors.rs`: `{ success: false, message }` error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router.
pub fn build_app(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
