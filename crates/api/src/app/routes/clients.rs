use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
};

use forca_core::SalesRepId;

use crate::app::dto::{self, ClientsPayload, ClientsQuery, ClientsResponse};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::repository::PageQuery;

/// `GET /clients?id=&page=&search=`
pub async fn list_clients(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ClientsQuery>,
) -> axum::response::Response {
    let rep: SalesRepId = match query.id.as_deref().unwrap_or_default().parse() {
        Ok(r) => r,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "id do vendedor é obrigatório"),
    };

    let page = PageQuery::new(
        dto::parse_page(query.page.as_deref()),
        services.page_size,
        query.search.unwrap_or_default(),
    );

    let clients = match services.clients.list_for_rep(&rep, &page) {
        Ok(c) => c,
        Err(e) => return errors::repository_error_to_response(e, "Erro ao buscar clientes"),
    };

    Json(ClientsResponse {
        success: true,
        user: ClientsPayload {
            clientes: clients.items,
            has_more: clients.has_more,
        },
    })
    .into_response()
}
