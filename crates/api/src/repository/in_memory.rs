use std::sync::RwLock;

use serde::Deserialize;

use forca_core::{ClientCode, ClientRecord, ProductRecord, SalesRep, SalesRepId};

use super::{
    ClientRepository, Page, PageQuery, ProductRepository, RepositoryError, UserDirectory, normalize_cpf,
};

fn active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedProduct {
    #[serde(flatten)]
    pub record: ProductRecord,
    #[serde(default = "active")]
    pub active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedClient {
    #[serde(flatten)]
    pub record: ClientRecord,
    pub sales_rep: SalesRepId,
    #[serde(default = "active")]
    pub active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    #[serde(flatten)]
    pub rep: SalesRep,
    pub cpf: String,
    pub password: String,
    #[serde(default = "active")]
    pub active: bool,
}

/// Dev/test data set, usually loaded from a JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub products: Vec<SeedProduct>,
    #[serde(default)]
    pub clients: Vec<SeedClient>,
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

/// In-memory repository for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    products: RwLock<Vec<SeedProduct>>,
    clients: RwLock<Vec<SeedClient>>,
    users: RwLock<Vec<SeedUser>>,
}

fn poisoned(what: &str) -> RepositoryError {
    RepositoryError::Unavailable(format!("{what} lock poisoned"))
}

fn matches(haystacks: &[&str], needle: &str) -> bool {
    needle.is_empty() || haystacks.iter().any(|h| h.to_uppercase().contains(needle))
}

fn paginate<T: Clone>(rows: Vec<&T>, query: &PageQuery) -> Page<T> {
    let items: Vec<T> = rows
        .into_iter()
        .skip(query.offset())
        .take(query.limit)
        .cloned()
        .collect();
    Page::from_rows(items, query.limit)
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: Seed) -> Self {
        Self {
            products: RwLock::new(seed.products),
            clients: RwLock::new(seed.clients),
            users: RwLock::new(seed.users),
        }
    }

    pub fn insert_product(&self, record: ProductRecord, active: bool) {
        if let Ok(mut rows) = self.products.write() {
            rows.push(SeedProduct { record, active });
        }
    }

    pub fn insert_client(&self, record: ClientRecord, sales_rep: SalesRepId, active: bool) {
        if let Ok(mut rows) = self.clients.write() {
            rows.push(SeedClient { record, sales_rep, active });
        }
    }

    pub fn insert_user(&self, rep: SalesRep, cpf: impl Into<String>, password: impl Into<String>) {
        if let Ok(mut rows) = self.users.write() {
            rows.push(SeedUser {
                rep,
                cpf: cpf.into(),
                password: password.into(),
                active: true,
            });
        }
    }
}

impl ProductRepository for InMemoryRepository {
    fn list_active(&self, _client: &ClientCode, query: &PageQuery) -> Result<Page<ProductRecord>, RepositoryError> {
        let rows = self.products.read().map_err(|_| poisoned("products"))?;
        let needle = query.search.trim().to_uppercase();

        let mut hits: Vec<&ProductRecord> = rows
            .iter()
            .filter(|p| p.active)
            .map(|p| &p.record)
            .filter(|r| matches(&[&r.description, r.code.as_str()], &needle))
            .collect();
        hits.sort_by(|a, b| a.code.cmp(&b.code));

        Ok(paginate(hits, query))
    }
}

impl ClientRepository for InMemoryRepository {
    fn list_for_rep(&self, rep: &SalesRepId, query: &PageQuery) -> Result<Page<ClientRecord>, RepositoryError> {
        let rows = self.clients.read().map_err(|_| poisoned("clients"))?;
        let needle = query.search.trim().to_uppercase();

        let mut hits: Vec<&ClientRecord> = rows
            .iter()
            .filter(|c| c.active && &c.sales_rep == rep)
            .map(|c| &c.record)
            .filter(|r| matches(&[&r.name, r.code.as_str()], &needle))
            .collect();
        hits.sort_by(|a, b| a.code.cmp(&b.code).then_with(|| a.name.cmp(&b.name)));

        Ok(paginate(hits, query))
    }
}

impl UserDirectory for InMemoryRepository {
    fn authenticate(&self, cpf: &str, password: &str) -> Result<Option<SalesRep>, RepositoryError> {
        let rows = self.users.read().map_err(|_| poisoned("users"))?;
        let cpf = normalize_cpf(cpf);

        Ok(rows
            .iter()
            .find(|u| u.active && normalize_cpf(&u.cpf) == cpf)
            .filter(|u| u.password == password)
            .map(|u| u.rep.clone()))
    }
}
