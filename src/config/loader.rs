//! Configuration store: load pipeline, scope queries and export
//!
//! Resolution order for `apply_config`:
//! 1. A document passed by the caller (persisted immediately)
//! 2. The cached document in the store (returned as-is, not persisted)
//! 3. The override source in the store, else the bundled default document

use crate::alert::{Alert, LogAlert, LOAD_FAILURE_MESSAGE};
use crate::config::extension::{ConfigExtension, NoExtension};
use crate::config::{
    parse_document, ConfigDocument, HeuristicCatalog, IgnoreRule, UrlScope, PLACEHOLDER_PROFILE,
};
use crate::fetch::{ConfigFetcher, ConfigSource};
use crate::store::{read_json, write_json, KeyValueStore, StoreKey};
use crate::types::mode::{self, DOM_SNITCH_COMPONENT};
use crate::types::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Map;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Delay before a cached document is handed back, so callers always observe
/// the result after `apply_config` has yielded at least once.
const CACHED_RESULT_DELAY: Duration = Duration::from_millis(10);

const ENABLED_SENTINEL: &str = "true";

/// Heuristic display name -> 0/1 enablement flag
type EnabledHeuristics = BTreeMap<String, u8>;

/// What to do with heuristic names the catalog does not know
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownHeuristicPolicy {
    /// Keep the name verbatim (trimmed) and log a warning
    #[default]
    PassThrough,
    /// Skip the heuristic, or the whole ignore rule that names it
    Drop,
    /// Fail the load before anything is written
    Reject,
}

/// Result of `apply_config`
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// The config-enable flag is set to something other than "true"
    Disabled,
    /// A caller-supplied document was persisted
    Applied(ConfigDocument),
    /// The cached document was returned without being persisted
    Cached(ConfigDocument),
    /// A fetched document was persisted
    Fetched(ConfigDocument),
    /// The fetched document was unusable; persisted state is unchanged
    Failed(String),
}

impl ApplyOutcome {
    pub fn document(&self) -> Option<&ConfigDocument> {
        match self {
            ApplyOutcome::Applied(doc) | ApplyOutcome::Cached(doc) | ApplyOutcome::Fetched(doc) => {
                Some(doc)
            }
            ApplyOutcome::Disabled | ApplyOutcome::Failed(_) => None,
        }
    }
}

pub struct ConfigStore {
    store: Arc<dyn KeyValueStore>,
    fetcher: Arc<dyn ConfigFetcher>,
    catalog: Arc<HeuristicCatalog>,
    alert: Arc<dyn Alert>,
    extension: Box<dyn ConfigExtension>,
    unknown_heuristics: UnknownHeuristicPolicy,

    /// Active-mode bitmask; `None` until a document with `components` loads
    default_mode: Option<u32>,
}

impl ConfigStore {
    pub fn new(store: Arc<dyn KeyValueStore>, fetcher: Arc<dyn ConfigFetcher>) -> Self {
        Self {
            store,
            fetcher,
            catalog: Arc::new(HeuristicCatalog::builtin()),
            alert: Arc::new(LogAlert),
            extension: Box::new(NoExtension),
            unknown_heuristics: UnknownHeuristicPolicy::default(),
            default_mode: None,
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<HeuristicCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_alert(mut self, alert: Arc<dyn Alert>) -> Self {
        self.alert = alert;
        self
    }

    pub fn with_extension(mut self, extension: Box<dyn ConfigExtension>) -> Self {
        self.extension = extension;
        self
    }

    pub fn with_unknown_heuristics(mut self, policy: UnknownHeuristicPolicy) -> Self {
        self.unknown_heuristics = policy;
        self
    }

    pub fn default_mode(&self) -> Option<u32> {
        self.default_mode
    }

    pub fn set_default_mode(&mut self, mode: Option<u32>) {
        self.default_mode = mode;
    }

    pub fn catalog(&self) -> &HeuristicCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn use_debugging(&self) -> bool {
        self.store.get(StoreKey::Debug.as_str()).as_deref() == Some(ENABLED_SENTINEL)
    }

    /// False only when the enable flag is present, non-empty and not "true"
    pub fn is_config_enabled(&self) -> bool {
        match self.store.get(StoreKey::ConfigEnable.as_str()) {
            Some(flag) if !flag.is_empty() => flag == ENABLED_SENTINEL,
            _ => true,
        }
    }

    pub fn set_config_enabled(&self, enabled: bool) -> Result<()> {
        let value = if enabled { ENABLED_SENTINEL } else { "false" };
        self.store.set(StoreKey::ConfigEnable.as_str(), value)
    }

    /// Store an override location for the configuration document
    pub fn set_config_url(&self, location: &str) -> Result<()> {
        ConfigSource::parse(location)?;
        self.store.set(StoreKey::ConfigUrl.as_str(), location.trim())
    }

    /// The stored override, or the bundled default document
    pub fn config_source(&self) -> Result<ConfigSource> {
        match self.store.get(StoreKey::ConfigUrl.as_str()) {
            Some(location) if !location.is_empty() => ConfigSource::parse(&location),
            _ => Ok(ConfigSource::default_bundled()),
        }
    }

    pub fn cache_config(&self, config: &ConfigDocument) -> Result<()> {
        write_json(self.store.as_ref(), StoreKey::CachedConfig.as_str(), config)
    }

    pub fn clear_cached_config(&self) -> Result<()> {
        self.store.delete(StoreKey::CachedConfig.as_str())
    }

    /// Apply `config` if given, otherwise resolve one from the cache or the
    /// configured source.
    pub async fn apply_config(&mut self, config: Option<ConfigDocument>) -> Result<ApplyOutcome> {
        if !self.is_config_enabled() {
            info!("Configuration updates are disabled; skipping apply");
            return Ok(ApplyOutcome::Disabled);
        }

        match config {
            Some(mut config) => {
                self.load_config(&mut config)?;
                Ok(ApplyOutcome::Applied(config))
            }
            None => self.resolve_config().await,
        }
    }

    async fn resolve_config(&mut self) -> Result<ApplyOutcome> {
        if let Some(cached) = self.cached_config()? {
            debug!("Using cached configuration");
            tokio::time::sleep(CACHED_RESULT_DELAY).await;
            return Ok(ApplyOutcome::Cached(cached));
        }

        let fetched = match self.config_source() {
            Ok(source) => {
                info!("Loading configuration from {}", source);
                self.fetcher
                    .fetch(&source)
                    .await
                    .and_then(|raw| parse_document(&raw))
            }
            Err(e) => Err(e),
        };

        let mut config = match fetched {
            Ok(config) => config,
            Err(e) => return self.fail_load(e),
        };

        match self.load_config(&mut config) {
            Ok(()) => Ok(ApplyOutcome::Fetched(config)),
            Err(e @ (ConfigError::InvalidScopePattern { .. } | ConfigError::UnknownHeuristic(_))) => {
                self.fail_load(e)
            }
            Err(e) => Err(e),
        }
    }

    fn fail_load(&mut self, error: ConfigError) -> Result<ApplyOutcome> {
        warn!("Configuration could not be loaded: {}", error);
        self.alert.alert(LOAD_FAILURE_MESSAGE);

        // An inert document still reaches the extension hook
        self.load_config(&mut ConfigDocument::default())?;
        Ok(ApplyOutcome::Failed(error.to_string()))
    }

    /// Cached document, if present and readable. An unreadable cache entry
    /// is deleted.
    fn cached_config(&self) -> Result<Option<ConfigDocument>> {
        let key = StoreKey::CachedConfig.as_str();
        let raw = match self.store.get(key) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(None),
        };

        match serde_json::from_str(&raw) {
            Ok(config) => Ok(Some(config)),
            Err(e) => {
                debug!("Discarding unreadable cached configuration: {}", e);
                self.store.delete(key)?;
                Ok(None)
            }
        }
    }

    /// Normalize `config` and persist every field it carries. Fields are
    /// replaced wholesale; absent fields leave the stored value alone.
    ///
    /// All validation happens before the first write, so an error leaves the
    /// store untouched. Ignore-rule heuristic names are rewritten in place.
    pub fn load_config(&mut self, config: &mut ConfigDocument) -> Result<()> {
        let enabled = match &config.heuristics {
            Some(names) => Some(self.enabled_heuristics(names)?),
            None => None,
        };

        let ignore_rules = match &config.ignore_rules {
            Some(rules) => Some(self.normalize_ignore_rules(rules)?),
            None => None,
        };

        if let Some(scope) = &config.scope {
            UrlScope::compile(scope)?;
        }

        let store = self.store.as_ref();

        if let Some(enabled) = enabled {
            debug!("Enabling {} heuristics", enabled.len());
            write_json(store, StoreKey::EnabledHeuristics.as_str(), &enabled)?;
        }

        if let Some(rules) = ignore_rules {
            debug!("Storing {} ignore rules", rules.len());
            write_json(store, StoreKey::IgnoreRules.as_str(), &rules)?;
            config.ignore_rules = Some(rules);
        }

        if let Some(origins) = &config.safe_origins {
            write_json(store, StoreKey::SafeOrigins.as_str(), origins)?;
        }

        if let Some(scope) = &config.scope {
            debug!("Storing {} scope patterns", scope.len());
            write_json(store, StoreKey::Scope.as_str(), scope)?;
        }

        if let Some(components) = &config.components {
            let bits = components
                .iter()
                .filter(|c| c.as_str() == DOM_SNITCH_COMPONENT)
                .fold(0, |bits, _| bits | mode::PASSIVE);
            self.default_mode = Some(bits);
        }

        self.extension.load_extended(config, store)
    }

    fn resolve_heuristic(&self, name: &str) -> Result<Option<String>> {
        if let Some(display) = self.catalog.resolve(name) {
            return Ok(Some(display.to_string()));
        }

        match self.unknown_heuristics {
            UnknownHeuristicPolicy::PassThrough => {
                warn!("Unknown heuristic '{}' kept as-is", name);
                Ok(Some(name.trim().to_string()))
            }
            UnknownHeuristicPolicy::Drop => {
                warn!("Unknown heuristic '{}' dropped", name);
                Ok(None)
            }
            UnknownHeuristicPolicy::Reject => Err(ConfigError::UnknownHeuristic(name.to_string())),
        }
    }

    fn enabled_heuristics(&self, names: &[String]) -> Result<EnabledHeuristics> {
        let mut enabled = EnabledHeuristics::new();
        for name in names {
            if let Some(display) = self.resolve_heuristic(name)? {
                enabled.insert(display, 1);
            }
        }
        Ok(enabled)
    }

    fn normalize_ignore_rules(&self, rules: &[IgnoreRule]) -> Result<Vec<IgnoreRule>> {
        let mut normalized = Vec::with_capacity(rules.len());
        for rule in rules {
            if let Some(heuristic) = self.resolve_heuristic(&rule.heuristic)? {
                normalized.push(IgnoreRule {
                    heuristic,
                    criteria: rule.criteria.clone(),
                });
            }
        }
        Ok(normalized)
    }

    /// Whether findings from `heuristic` (display name) should be reported.
    ///
    /// A heuristic seen for the first time is recorded as disabled.
    pub fn is_type_in_scope(&self, heuristic: &str) -> Result<bool> {
        let store = self.store.as_ref();
        let key = StoreKey::EnabledHeuristics.as_str();
        let mut selected: EnabledHeuristics = read_json(store, key)?;

        if let Some(flag) = selected.get(heuristic) {
            return Ok(*flag != 0);
        }

        debug!("Recording unseen heuristic '{}' as disabled", heuristic);
        selected.insert(heuristic.to_string(), 0);
        write_json(store, key, &selected)?;
        Ok(false)
    }

    /// Whether `url` matches the stored scope. An empty scope matches all.
    pub fn is_url_in_scope(&self, url: &str) -> Result<bool> {
        let patterns: Vec<String> = read_json(self.store.as_ref(), StoreKey::Scope.as_str())?;
        Ok(UrlScope::compile_lossy(&patterns).contains(url))
    }

    /// URL scope is always checked; the heuristic check is skipped when
    /// `ignore_type_check` is set.
    pub fn is_in_scope(&self, url: &str, heuristic: &str, ignore_type_check: bool) -> Result<bool> {
        Ok(self.is_url_in_scope(url)? && (ignore_type_check || self.is_type_in_scope(heuristic)?))
    }

    /// Rebuild a shareable document from the persisted settings
    pub fn export_config(&self) -> Result<ConfigDocument> {
        let store = self.store.as_ref();

        let components = match self.default_mode {
            Some(bits) if mode::is_passive(bits) => vec![DOM_SNITCH_COMPONENT.to_string()],
            _ => Vec::new(),
        };

        let selected: EnabledHeuristics = read_json(store, StoreKey::EnabledHeuristics.as_str())?;
        let heuristics = selected
            .into_iter()
            .filter(|(_, flag)| *flag != 0)
            .map(|(name, _)| name)
            .collect();

        let config = ConfigDocument {
            profile: Some(PLACEHOLDER_PROFILE.to_string()),
            components: Some(components),
            scope: Some(read_json(store, StoreKey::Scope.as_str())?),
            heuristics: Some(heuristics),
            safe_origins: Some(read_json(store, StoreKey::SafeOrigins.as_str())?),
            ignore_rules: Some(read_json(store, StoreKey::IgnoreRules.as_str())?),
            extra: Map::new(),
        };

        self.extension.export_extended(config, store)
    }
}
