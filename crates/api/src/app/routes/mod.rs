use axum::{
    Router,
    routing::{get, post},
};

pub mod clients;
pub mod login;
pub mod products;
pub mod system;

/// Router for the public resource endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/products", get(products::list_products))
        .route("/clients", get(clients::list_clients))
        .route("/login", post(login::login))
}
