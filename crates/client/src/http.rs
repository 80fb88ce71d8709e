//! reqwest implementation of the backend contract.
//!
//! Transport failures map to [`FetchError::Network`], non-2xx statuses to
//! [`FetchError::Server`] and undecodable bodies to [`FetchError::Malformed`].
//! `hasMore` is recomputed locally from the page size; the server's flag is
//! not trusted.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use forca_catalog::{FetchError, FetchRequest, FetchedPage, ProductFetcher};
use forca_core::{ClientRecord, LoginRequest, ProductRecord, SalesRep, SalesRepId};

use crate::config::ClientConfig;

#[derive(Debug, Deserialize)]
struct ProductsEnvelope {
    products: ProductsBody,
}

#[derive(Debug, Deserialize)]
struct ProductsBody {
    itens: Vec<ProductRecord>,
}

#[derive(Debug, Deserialize)]
struct ClientsEnvelope {
    user: ClientsBody,
}

#[derive(Debug, Deserialize)]
struct ClientsBody {
    clientes: Vec<ClientRecord>,
}

#[derive(Debug, Deserialize)]
struct LoginEnvelope {
    user: SalesRep,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// One page of the sales rep's clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientsPage {
    pub clients: Vec<ClientRecord>,
    pub has_more: bool,
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    api_url: String,
    page_size: usize,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// `GET /clients?id=&page=&search=`
    pub async fn fetch_clients(&self, rep: &SalesRepId, page: u32, search: &str) -> Result<ClientsPage, FetchError> {
        let page = page.max(1).to_string();
        let response = self
            .client
            .get(self.url("/clients"))
            .query(&[
                ("id", rep.as_str()),
                ("page", page.as_str()),
                ("search", search),
            ])
            .send()
            .await
            .map_err(network)?;

        let body: ClientsEnvelope = decode(response).await?;
        let has_more = self.page_size > 0 && body.user.clientes.len() == self.page_size;
        Ok(ClientsPage {
            clients: body.user.clientes,
            has_more,
        })
    }

    /// `POST /login`. Wrong credentials come back as `Server { status: 401, .. }`.
    pub async fn login(&self, cpf: &str, password: &str) -> Result<SalesRep, FetchError> {
        let request = LoginRequest {
            cpf: cpf.to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .post(self.url("/login"))
            .json(&request)
            .send()
            .await
            .map_err(network)?;

        let body: LoginEnvelope = decode(response).await?;
        tracing::info!(rep_id = %body.user.id, "logged in");
        Ok(body.user)
    }
}

#[async_trait]
impl ProductFetcher for HttpBackend {
    async fn fetch_page(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError> {
        let page = request.page.to_string();
        let response = self
            .client
            .get(self.url("/products"))
            .query(&[
                ("clienteCodigo", request.client.as_str()),
                ("search", request.search.as_str()),
                ("page", page.as_str()),
            ])
            .send()
            .await
            .map_err(network)?;

        let body: ProductsEnvelope = decode(response).await?;
        tracing::debug!(
            page = request.page,
            search = %request.search,
            items = body.products.itens.len(),
            "fetched product page"
        );
        Ok(FetchedPage::from_items(body.products.itens, request.page_size))
    }
}

fn network(err: reqwest::Error) -> FetchError {
    FetchError::Network(err.to_string())
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, FetchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(server_error(status, response).await);
    }
    let bytes = response.bytes().await.map_err(network)?;
    serde_json::from_slice(&bytes).map_err(|e| FetchError::Malformed(e.to_string()))
}

async fn server_error(status: StatusCode, response: Response) -> FetchError {
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|b| b.message)
        .unwrap_or(text);
    FetchError::Server {
        status: status.as_u16(),
        message,
    }
}
