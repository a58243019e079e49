use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Malformed configuration document: {0}")]
    MalformedDocument(String),

    #[error("Failed to fetch configuration from {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("Invalid configuration source: {0}")]
    InvalidSource(String),

    #[error("Bundled resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Invalid scope pattern '{pattern}': {source}")]
    InvalidScopePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Unknown heuristic: {0}")]
    UnknownHeuristic(String),

    #[error("Corrupt store entry '{key}': {source}")]
    CorruptEntry {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
