//! Parameters the product screen is opened with.

use serde::{Deserialize, Serialize};

use forca_core::{ClientCode, ClientRecord, DomainError, DomainResult};

/// Raw route parameters as the navigator passes them.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawProductsRoute {
    #[serde(rename = "clienteCodigo", default)]
    cliente_codigo: String,
    #[serde(rename = "clienteNome", default)]
    cliente_nome: String,
    #[serde(rename = "clienteTabela", default)]
    cliente_tabela: Option<String>,
}

/// Validated navigation parameters for the product screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProductsRoute")]
pub struct ProductsRoute {
    #[serde(rename = "clienteCodigo")]
    pub cliente_codigo: ClientCode,
    #[serde(rename = "clienteNome")]
    pub cliente_nome: String,
    #[serde(rename = "clienteTabela")]
    pub cliente_tabela: Option<String>,
}

impl ProductsRoute {
    pub fn new(codigo: &str, nome: &str, tabela: Option<&str>) -> DomainResult<Self> {
        let cliente_codigo = ClientCode::parse(codigo)?;
        let cliente_nome = nome.trim();
        if cliente_nome.is_empty() {
            return Err(DomainError::validation("client name must not be empty"));
        }
        let cliente_tabela = tabela
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Ok(Self {
            cliente_codigo,
            cliente_nome: cliente_nome.to_string(),
            cliente_tabela,
        })
    }

    /// Route for a client picked from the client list.
    pub fn for_client(client: &ClientRecord) -> DomainResult<Self> {
        Self::new(client.code.as_str(), &client.name, client.price_table.as_deref())
    }
}

impl TryFrom<RawProductsRoute> for ProductsRoute {
    type Error = DomainError;

    fn try_from(raw: RawProductsRoute) -> Result<Self, Self::Error> {
        Self::new(&raw.cliente_codigo, &raw.cliente_nome, raw.cliente_tabela.as_deref())
    }
}
