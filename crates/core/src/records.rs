//! Records exchanged with the backend.
//!
//! Field names on the wire follow the ERP views (`CODIGO`, `DESCRICAO`, ...);
//! the Rust side uses descriptive names.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::DomainResult;
use crate::id::{ClientCode, ProductCode, SalesRepId};
use crate::money::{Money, parse_price};

/// One product row of the catalog. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "CODIGO")]
    pub code: ProductCode,
    #[serde(rename = "DESCRICAO")]
    pub description: String,
    #[serde(rename = "UNIDADE")]
    pub unit: String,
    #[serde(rename = "FAMILIA")]
    pub family: String,
    /// Stock on hand, string-encoded as the ERP sends it.
    #[serde(rename = "ESTOQUE")]
    pub stock: String,
    /// Unit price, comma-decimal formatted (`"10,50"`).
    #[serde(rename = "PRECO")]
    pub price: String,
}

impl ProductRecord {
    /// Parsed unit price. See [`parse_price`] for the accepted formats.
    pub fn unit_price(&self) -> DomainResult<Money> {
        parse_price(&self.price)
    }
}

impl Entity for ProductRecord {
    type Id = ProductCode;

    fn id(&self) -> &Self::Id {
        &self.code
    }
}

/// Client assigned to a sales rep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    #[serde(rename = "CODIGO")]
    pub code: ClientCode,
    #[serde(rename = "CNPJ", default)]
    pub cnpj: String,
    #[serde(rename = "RAZAOSOC")]
    pub name: String,
    #[serde(rename = "CONTATO", default)]
    pub contact: String,
    #[serde(rename = "ENDERECO", default)]
    pub address: String,
    #[serde(rename = "CIDADE", default)]
    pub city: String,
    /// Price table assigned to the client, if any.
    #[serde(rename = "TABELA", default)]
    pub price_table: Option<String>,
    #[serde(rename = "REAJUSTE", default)]
    pub price_adjustment: Option<String>,
}

impl Entity for ClientRecord {
    type Id = ClientCode;

    fn id(&self) -> &Self::Id {
        &self.code
    }
}

/// Authenticated sales representative as returned by `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRep {
    #[serde(rename = "ID")]
    pub id: SalesRepId,
    #[serde(rename = "NOME")]
    pub name: String,
}

/// Body of `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub cpf: String,
    pub password: String,
}
