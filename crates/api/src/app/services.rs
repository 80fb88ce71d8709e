use std::sync::Arc;

use crate::repository::{ClientRepository, InMemoryRepository, ProductRepository, UserDirectory};
use crate::settings::{Settings, SettingsError};

/// Everything the handlers need, shared behind an `Arc`.
pub struct AppServices {
    pub products: Arc<dyn ProductRepository>,
    pub clients: Arc<dyn ClientRepository>,
    pub users: Arc<dyn UserDirectory>,
    pub page_size: usize,
}

impl AppServices {
    /// Wire all three concerns to one repository.
    pub fn from_repository<R>(repo: Arc<R>, page_size: usize) -> Self
    where
        R: ProductRepository + ClientRepository + UserDirectory + 'static,
    {
        Self {
            products: repo.clone(),
            clients: repo.clone(),
            users: repo,
            page_size,
        }
    }
}

pub fn build_services(settings: &Settings) -> Result<Arc<AppServices>, SettingsError> {
    let seed = settings.load_seed()?;
    tracing::info!(
        products = seed.products.len(),
        clients = seed.clients.len(),
        users = seed.users.len(),
        "loaded seed data"
    );
    let repo = Arc::new(InMemoryRepository::from_seed(seed));
    Ok(Arc::new(AppServices::from_repository(repo, settings.page_size)))
}
