//! Extension points around load and export
//!
//! An extension sees every document after the built-in fields have been
//! persisted, and every exported document before it is returned. Fields the
//! crate does not know about are available in [`ConfigDocument::extra`].

use crate::config::ConfigDocument;
use crate::store::KeyValueStore;
use crate::types::Result;

pub trait ConfigExtension: Send + Sync {
    fn load_extended(&self, _config: &ConfigDocument, _store: &dyn KeyValueStore) -> Result<()> {
        Ok(())
    }

    fn export_extended(
        &self,
        config: ConfigDocument,
        _store: &dyn KeyValueStore,
    ) -> Result<ConfigDocument> {
        Ok(config)
    }
}

/// The default: no extra fields are loaded or exported
#[derive(Debug, Default, Clone, Copy)]
pub struct NoExtension;

impl ConfigExtension for NoExtension {}
