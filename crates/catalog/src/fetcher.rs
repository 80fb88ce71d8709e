//! Catalog fetcher contract.
//!
//! The network layer implements [`ProductFetcher`]; the store and session only
//! see [`FetchRequest`] / [`FetchedPage`] / [`FetchError`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use forca_core::{ClientCode, ProductRecord};

/// Products per page. A configuration constant, never read from the server.
pub const PRODUCT_PAGE_SIZE: usize = 50;

/// Generic message shown to the user when a catalog fetch fails.
pub const USER_FETCH_ERROR_MESSAGE: &str = "Ocorreu um erro ao buscar os produtos.";

/// One page request: scoped by client, search term and page number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchRequest {
    pub client: ClientCode,
    pub search: String,
    /// 1-based page number.
    pub page: u32,
    pub page_size: usize,
}

impl FetchRequest {
    pub fn new(client: ClientCode, search: impl Into<String>, page: u32, page_size: usize) -> Self {
        Self {
            client,
            search: search.into(),
            page: page.max(1),
            page_size,
        }
    }
}

/// Result of one page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub items: Vec<ProductRecord>,
    pub has_more: bool,
}

impl FetchedPage {
    /// Build a page, deriving `has_more` from "the page came back full".
    ///
    /// This is a lower-bound signal only: when the last page is exactly full it
    /// reports `true`, and the next fetch comes back empty with `false`.
    pub fn from_items(items: Vec<ProductRecord>, page_size: usize) -> Self {
        let has_more = page_size > 0 && items.len() == page_size;
        Self { items, has_more }
    }

    /// The empty continuation returned once the catalog is exhausted.
    pub fn exhausted() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport failure or timeout.
    #[error("network error: {0}")]
    Network(String),
    /// Non-success status from the backend.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    /// Success status but a payload that does not match the contract.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// The message shown to the user, whatever the underlying cause.
    pub fn user_message(&self) -> &'static str {
        USER_FETCH_ERROR_MESSAGE
    }

    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }
}

/// Source of product pages (the backend `GET /products` contract).
#[async_trait]
pub trait ProductFetcher: Send + Sync {
    async fn fetch_page(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError>;
}

#[async_trait]
impl<F> ProductFetcher for Arc<F>
where
    F: ProductFetcher + ?Sized,
{
    async fn fetch_page(&self, request: &FetchRequest) -> Result<FetchedPage, FetchError> {
        (**self).fetch_page(request).await
    }
}
