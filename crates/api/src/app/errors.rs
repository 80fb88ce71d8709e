use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::repository::RepositoryError;

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Storage failures are logged and surfaced as a generic 500.
pub fn repository_error_to_response(err: RepositoryError, message: &'static str) -> axum::response::Response {
    tracing::error!(error = %err, "repository query failed");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, message)
}
