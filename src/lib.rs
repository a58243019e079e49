//! snitch-config - configuration store for the DOM Snitch scanning UI
//!
//! Loads scanner configuration documents (caller-supplied, cached, or
//! fetched), persists the derived settings into a key-value store, and
//! answers the scanning engine's "is this URL / heuristic in scope" queries.

pub mod alert;
pub mod config;
pub mod fetch;
pub mod store;
pub mod types;

pub use alert::{Alert, LogAlert};
pub use config::{ApplyOutcome, ConfigDocument, ConfigStore, HeuristicCatalog, Settings};
pub use fetch::{ConfigFetcher, ConfigSource, HttpFetcher};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreKey};
pub use types::{ConfigError, Result};
