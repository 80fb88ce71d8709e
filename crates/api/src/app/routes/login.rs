use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::dto::{LoginBody, LoginResponse};
use crate::app::errors;
use crate::app::services::AppServices;

/// `POST /login`. The password never appears in the response or the logs.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginBody>,
) -> axum::response::Response {
    let Some(request) = body.into_request() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "CPF e senha são obrigatórios.");
    };

    match services.users.authenticate(&request.cpf, &request.password) {
        Ok(Some(rep)) => {
            tracing::info!(rep_id = %rep.id, "sales rep logged in");
            Json(LoginResponse { success: true, user: rep }).into_response()
        }
        Ok(None) => {
            tracing::warn!("login rejected");
            errors::json_error(StatusCode::UNAUTHORIZED, "CPF ou senha incorretos.")
        }
        Err(e) => errors::repository_error_to_response(e, "Erro ao realizar login"),
    }
}
