//! Scanner configuration
//!
//! A configuration document is fetched or supplied, normalized against the
//! heuristic catalog, and fanned out into the key-value store. The store is
//! then queried by the scanning engine to decide what is in scope.

mod catalog;
mod document;
pub mod extension;
mod loader;
mod scope;
mod settings;

pub use catalog::{normalize_key, HeuristicCatalog};
pub use document::{parse_document, ConfigDocument, IgnoreRule, PLACEHOLDER_PROFILE};
pub use extension::{ConfigExtension, NoExtension};
pub use loader::{ApplyOutcome, ConfigStore, UnknownHeuristicPolicy};
pub use scope::{strip_query_and_fragment, ScopePattern, UrlScope};
pub use settings::{Settings, SETTINGS_ENV_VAR};
