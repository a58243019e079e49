//! URL scope matching
//!
//! A scope pattern is a URL without its scheme in which `*` stands for one or
//! more word, dot, or hyphen characters. Everything else is regex syntax, with
//! backslashes taken literally. Patterns match as case-insensitive prefixes of
//! `http://` or `https://` URLs, after the URL's query string and fragment are
//! removed.

use crate::types::{ConfigError, Result};
use regex::Regex;
use tracing::warn;

const WILDCARD: &str = r"[\w.-]+";

/// A single compiled scope pattern
#[derive(Debug, Clone)]
pub struct ScopePattern {
    regex: Regex,
}

impl ScopePattern {
    pub fn compile(pattern: &str) -> Result<Self> {
        let trimmed = pattern.strip_suffix('/').unwrap_or(pattern);
        let body = trimmed.replace('\\', "\\\\").replace('*', WILDCARD);

        let regex = Regex::new(&format!("(?i)^https?://{}", body)).map_err(|source| {
            ConfigError::InvalidScopePattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(Self { regex })
    }

    /// Match against a URL that has already had its query and fragment removed
    pub fn matches(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }
}

/// The set of patterns that define what the scanner acts on.
///
/// An empty scope puts every URL in scope.
#[derive(Debug, Clone, Default)]
pub struct UrlScope {
    patterns: Vec<ScopePattern>,
}

impl UrlScope {
    /// Compile every pattern, failing on the first invalid one
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| ScopePattern::compile(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Compile what can be compiled; invalid patterns are logged and skipped
    pub fn compile_lossy<S: AsRef<str>>(patterns: &[S]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|p| match ScopePattern::compile(p.as_ref()) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Skipping scope pattern: {}", e);
                    None
                }
            })
            .collect();

        Self { patterns }
    }

    pub fn contains(&self, url: &str) -> bool {
        if self.patterns.is_empty() {
            return true;
        }

        let url = strip_query_and_fragment(url);
        self.patterns.iter().any(|p| p.matches(url))
    }
}

/// Remove everything from the first `?` or `#` onwards
pub fn strip_query_and_fragment(url: &str) -> &str {
    match url.find(['?', '#']) {
        Some(idx) => &url[..idx],
        None => url,
    }
}
