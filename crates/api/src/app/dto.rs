use serde::{Deserialize, Serialize};

use forca_core::{ClientRecord, LoginRequest, ProductRecord, SalesRep};

/// Lenient page parameter: missing, non-numeric or < 1 all mean page 1.
pub fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|p| p.trim().parse::<u32>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1)
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    #[serde(rename = "clienteCodigo")]
    pub cliente_codigo: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClientsQuery {
    pub id: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
}

/// Login body with every field optional so missing ones become a 400
/// instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct LoginBody {
    pub cpf: Option<String>,
    pub password: Option<String>,
}

impl LoginBody {
    pub fn into_request(self) -> Option<LoginRequest> {
        let cpf = self.cpf.filter(|c| !c.trim().is_empty())?;
        let password = self.password.filter(|p| !p.is_empty())?;
        Some(LoginRequest { cpf, password })
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct ProductsPayload {
    pub itens: Vec<ProductRecord>,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub success: bool,
    pub products: ProductsPayload,
}

#[derive(Debug, Serialize)]
pub struct ClientsPayload {
    pub clientes: Vec<ClientRecord>,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
pub struct ClientsResponse {
    pub success: bool,
    pub user: ClientsPayload,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: SalesRep,
}
