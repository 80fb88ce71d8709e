//! Backend runtime settings, read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use forca_catalog::PRODUCT_PAGE_SIZE;

use crate::repository::Seed;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("failed to read seed file {path}: {source}")]
    SeedIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse seed file {path}: {source}")]
    SeedParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub page_size: usize,
    /// JSON file loaded into the in-memory repository at startup.
    pub seed_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            page_size: PRODUCT_PAGE_SIZE,
            seed_path: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Recognized keys: `PORT`, `FORCA_BIND_ADDR` (wins over `PORT`),
    /// `FORCA_SEED_FILE`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let mut settings = Self::default();

        if let Some(port) = lookup("PORT").filter(|v| !v.trim().is_empty()) {
            let port: u16 = port.trim().parse().map_err(|_| SettingsError::Invalid {
                key: "PORT",
                value: port.clone(),
            })?;
            settings.bind_addr.set_port(port);
        }

        if let Some(addr) = lookup("FORCA_BIND_ADDR").filter(|v| !v.trim().is_empty()) {
            settings.bind_addr = addr.trim().parse().map_err(|_| SettingsError::Invalid {
                key: "FORCA_BIND_ADDR",
                value: addr.clone(),
            })?;
        }

        settings.seed_path = lookup("FORCA_SEED_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(settings)
    }

    pub fn load_seed(&self) -> Result<Seed, SettingsError> {
        let Some(path) = &self.seed_path else {
            return Ok(Seed::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::SeedIo {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SettingsError::SeedParse {
            path: path.clone(),
            source,
        })
    }
}
