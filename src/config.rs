// 🔧 Configuration - environment (.env aware) with CLI overrides applied by the binaries

use crate::db::SqliteStore;
use crate::store::{MemoryStore, ReceiptStore};
use anyhow::{bail, Context, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE: &str = "receipts.db";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StorageBackend {
    Memory,
    Sqlite,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "sqlite" => Ok(StorageBackend::Sqlite),
            other => bail!("unknown storage backend {other:?} (expected \"memory\" or \"sqlite\")"),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => f.write_str("memory"),
            StorageBackend::Sqlite => f.write_str("sqlite"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub database_path: PathBuf,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            storage: StorageBackend::Memory,
            database_path: PathBuf::from(DEFAULT_DATABASE),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; unset variables fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let port = match lookup("RECEIPTS_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("RECEIPTS_PORT must be a port number, got {raw:?}"))?,
            None => defaults.port,
        };

        let storage = match lookup("RECEIPTS_STORAGE") {
            Some(raw) => raw.parse()?,
            None => defaults.storage,
        };

        Ok(Config {
            host: lookup("RECEIPTS_HOST").unwrap_or(defaults.host),
            port,
            storage,
            database_path: lookup("RECEIPTS_DATABASE")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            log_filter: lookup("RUST_LOG").unwrap_or(defaults.log_filter),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Open the configured backend
    pub fn open_store(&self) -> Result<Arc<dyn ReceiptStore>> {
        let store: Arc<dyn ReceiptStore> = match self.storage {
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
            StorageBackend::Sqlite => Arc::new(
                SqliteStore::open(&self.database_path).with_context(|| {
                    format!("Failed to open database {}", self.database_path.display())
                })?,
            ),
        };

        tracing::info!(storage = %self.storage, "receipt store ready");
        Ok(store)
    }
}
