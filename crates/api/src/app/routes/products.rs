use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
};

use forca_core::ClientCode;

use crate::app::dto::{self, ProductsPayload, ProductsResponse, ProductsQuery};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::repository::PageQuery;

/// `GET /products?clienteCodigo=&search=&page=`
///
/// The client code is required but does not narrow the listing.
pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ProductsQuery>,
) -> axum::response::Response {
    let client: ClientCode = match query.cliente_codigo.as_deref().unwrap_or_default().parse() {
        Ok(c) => c,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "clienteCodigo é obrigatório"),
    };

    let page = PageQuery::new(
        dto::parse_page(query.page.as_deref()),
        services.page_size,
        query.search.unwrap_or_default(),
    );

    let products = match services.products.list_active(&client, &page) {
        Ok(p) => p,
        Err(e) => return errors::repository_error_to_response(e, "Erro ao buscar produtos"),
    };

    tracing::debug!(
        client = %client,
        page = page.page,
        search = %page.search,
        returned = products.items.len(),
        "listed products"
    );

    Json(ProductsResponse {
        success: true,
        products: ProductsPayload {
            itens: products.items,
            has_more: products.has_more,
        },
    })
    .into_response()
}
