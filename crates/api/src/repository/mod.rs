//! Query-side storage abstractions for the sales-rep backend.
//!
//! The relational database is an external collaborator; handlers only see
//! these traits. [`InMemoryRepository`] backs dev runs and tests.

pub mod in_memory;

pub use in_memory::{InMemoryRepository, Seed, SeedClient, SeedProduct, SeedUser};

use thiserror::Error;

use forca_core::{ClientCode, ClientRecord, ProductRecord, SalesRep, SalesRepId};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// One page of a filtered, ordered listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// 1-based.
    pub page: u32,
    pub limit: usize,
    pub search: String,
}

impl PageQuery {
    pub fn new(page: u32, limit: usize, search: impl Into<String>) -> Self {
        Self {
            page: page.max(1),
            limit,
            search: search.into(),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page.max(1) as usize - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// "The page came back full"; the same heuristic the client applies.
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn from_rows(items: Vec<T>, limit: usize) -> Self {
        let has_more = limit > 0 && items.len() == limit;
        Self { items, has_more }
    }
}

/// Active products, filtered by a case-insensitive match on description or
/// code, ordered by code.
pub trait ProductRepository: Send + Sync {
    fn list_active(&self, client: &ClientCode, query: &PageQuery) -> Result<Page<ProductRecord>, RepositoryError>;
}

/// Active clients owned by a sales rep, filtered on name or code.
pub trait ClientRepository: Send + Sync {
    fn list_for_rep(&self, rep: &SalesRepId, query: &PageQuery) -> Result<Page<ClientRecord>, RepositoryError>;
}

/// Credential check for `POST /login`.
pub trait UserDirectory: Send + Sync {
    /// `Ok(None)` for unknown CPF or wrong password; the two are not
    /// distinguished.
    fn authenticate(&self, cpf: &str, password: &str) -> Result<Option<SalesRep>, RepositoryError>;
}

/// Keep only the digits of a CPF (`"123.456.789-01"` → `"12345678901"`).
pub fn normalize_cpf(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}
