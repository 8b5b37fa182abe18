// Receipt Points - Core Library
// Exposes all modules for use in the CLI, the API server, and tests

pub mod config;
pub mod db;
pub mod deduplication;
pub mod error;
pub mod logging;
pub mod processor;
pub mod receipt;
pub mod rules;
pub mod schema;
pub mod store;

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use config::{Config, StorageBackend};
pub use db::{setup_database, SqliteStore};
pub use deduplication::{is_duplicate, item_signature, DuplicateKey};
pub use error::ReceiptError;
pub use processor::{ProcessedReceipt, ReceiptProcessor};
pub use receipt::{Item, Receipt, StoredReceipt};
pub use rules::{breakdown, score, PointsBreakdown, PointsRule, RuleScore};
pub use schema::{validate, ValidationError};
pub use store::{MemoryStore, ReceiptStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
