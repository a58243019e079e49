//! Configuration document retrieval
//!
//! Documents come from a remote URL, a local file, or a resource bundled
//! into the binary. Remote requests are conditional on a modification date of
//! the Unix epoch so intermediate caches never serve a stale copy.

use crate::types::{ConfigError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use include_dir::{include_dir, Dir};
use reqwest::header::IF_MODIFIED_SINCE;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use url::Url;

static RESOURCES: Dir = include_dir!("$CARGO_MANIFEST_DIR/resources");

/// Bundled document used when no override URL is stored
pub const DEFAULT_CONFIG_RESOURCE: &str = "config/default_config.json";

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Where a configuration document lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Remote(Url),
    File(PathBuf),
    Bundled(String),
}

impl ConfigSource {
    pub fn default_bundled() -> Self {
        ConfigSource::Bundled(DEFAULT_CONFIG_RESOURCE.to_string())
    }

    /// Interpret a stored override: `http(s)://` is remote, `file://` or a
    /// bare path is local, `bundled:<path>` is an embedded resource.
    pub fn parse(location: &str) -> Result<Self> {
        let location = location.trim();
        if location.is_empty() {
            return Err(ConfigError::InvalidSource("empty location".to_string()));
        }

        match Url::parse(location) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(ConfigSource::Remote(url)),
                "file" => url
                    .to_file_path()
                    .map(ConfigSource::File)
                    .map_err(|_| ConfigError::InvalidSource(location.to_string())),
                "bundled" => Ok(ConfigSource::Bundled(
                    url.path().trim_start_matches('/').to_string(),
                )),
                other => Err(ConfigError::InvalidSource(format!(
                    "unsupported scheme '{}' in {}",
                    other, location
                ))),
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Ok(ConfigSource::File(PathBuf::from(location)))
            }
            Err(e) => Err(ConfigError::InvalidSource(format!("{}: {}", location, e))),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Remote(url) => write!(f, "{}", url),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Bundled(path) => write!(f, "bundled:{}", path),
        }
    }
}

/// Retrieves raw document text; parsing is left to the caller
#[async_trait]
pub trait ConfigFetcher: Send + Sync {
    async fn fetch(&self, source: &ConfigSource) -> Result<String>;
}

/// Fetcher backed by reqwest for remote sources
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { client })
    }

    async fn fetch_remote(&self, url: &Url) -> Result<String> {
        let fetch_error = |reason: String| ConfigError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url.clone())
            .header(IF_MODIFIED_SINCE, epoch_http_date())
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP status {}", status)));
        }

        response.text().await.map_err(|e| fetch_error(e.to_string()))
    }
}

#[async_trait]
impl ConfigFetcher for HttpFetcher {
    async fn fetch(&self, source: &ConfigSource) -> Result<String> {
        debug!("Fetching configuration from {}", source);

        match source {
            ConfigSource::Remote(url) => self.fetch_remote(url).await,
            ConfigSource::File(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                ConfigError::Fetch {
                    url: path.display().to_string(),
                    reason: e.to_string(),
                }
            }),
            ConfigSource::Bundled(path) => bundled_resource(path).map(str::to_string),
        }
    }
}

/// Look up a resource embedded at build time
pub fn bundled_resource(path: &str) -> Result<&'static str> {
    RESOURCES
        .get_file(path)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| ConfigError::ResourceNotFound(path.to_string()))
}

/// `If-Modified-Since` value for the Unix epoch, in IMF-fixdate form
pub fn epoch_http_date() -> String {
    DateTime::<Utc>::from_timestamp(0, 0)
        .unwrap_or_default()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}
