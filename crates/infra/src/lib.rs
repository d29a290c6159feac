//! Infrastructure layer: persistence adapters, configuration, change feed.

pub mod config;
pub mod db;
pub mod realtime;
pub mod store;

pub use config::{AppConfig, ConfigError, DatabaseConfig};
pub use realtime::{BroadcastChangeFeed, ChangeFeed, ItemChange, NotifyingStore};
pub use store::{
    InMemoryInventoryStore, InventoryStore, PostgresInventoryStore, StoreError, StoreResult,
};
