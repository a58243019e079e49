//! Built-in heuristic catalog
//!
//! Maps a normalized heuristic key (lowercase, no whitespace or hyphens) to
//! the display name the scanning engine reports findings under.

use std::collections::HashMap;

/// Immutable lookup table from normalized key to display name.
#[derive(Debug, Clone)]
pub struct HeuristicCatalog {
    entries: HashMap<String, String>,
}

impl HeuristicCatalog {
    /// Catalog of the heuristics shipped with DOM Snitch
    pub fn builtin() -> Self {
        Self::from_display_names(builtin_display_names())
    }

    /// Build a catalog from display names, deriving each key by normalization
    pub fn from_display_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = names
            .into_iter()
            .map(|name| {
                let name = name.into();
                (normalize_key(&name), name)
            })
            .collect();

        Self { entries }
    }

    /// Resolve any spelling of a heuristic name to its display name
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.entries.get(&normalize_key(name)).map(String::as_str)
    }

    /// All display names, sorted
    pub fn display_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.values().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for HeuristicCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Lowercase and strip whitespace and hyphens: "Plug-ins" -> "plugins"
pub fn normalize_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn builtin_display_names() -> [&'static str; 9] {
    [
        "HTTP headers",
        "Invalid JSON",
        "Mixed content",
        "Reflected input",
        "Untrusted code",
        "Script inclusion",
        "XPC monitor",
        "Plug-ins",
        "External UI",
    ]
}
