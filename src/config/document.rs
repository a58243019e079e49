//! Configuration document format
//!
//! Documents are JSON, optionally prefixed by a single block comment. Every
//! field is optional; an absent field leaves the matching persisted setting
//! untouched when the document is loaded.

use crate::types::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile label written by export until the user names the profile
pub const PLACEHOLDER_PROFILE: &str = "<Enter profile name>";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heuristics: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_origins: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_rules: Option<Vec<IgnoreRule>>,

    /// Fields this crate does not interpret, kept for extensions
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Suppresses findings of one heuristic that match the remaining criteria
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnoreRule {
    pub heuristic: String,

    #[serde(flatten)]
    pub criteria: Map<String, Value>,
}

/// Parse raw document text: drop newlines, strip one leading block comment,
/// then decode JSON.
pub fn parse_document(raw: &str) -> Result<ConfigDocument> {
    let flattened = raw.replace('\n', "");
    let body = strip_leading_comment(&flattened);

    serde_json::from_str(body).map_err(|e| ConfigError::MalformedDocument(e.to_string()))
}

fn strip_leading_comment(text: &str) -> &str {
    if let Some(rest) = text.strip_prefix("/*") {
        if let Some(end) = rest.find("*/") {
            return &rest[end + 2..];
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_document() {
        let doc = parse_document(r#"{"scope": ["*.example.com/*"], "heuristics": ["Mixed content"]}"#)
            .unwrap();
        assert_eq!(doc.scope, Some(vec!["*.example.com/*".to_string()]));
        assert_eq!(doc.heuristics, Some(vec!["Mixed content".to_string()]));
        assert!(doc.safe_origins.is_none());
    }

    #[test]
    fn test_parse_strips_leading_comment() {
        let raw = "/* Copyright notice\n * spanning lines\n */\n{\n  \"safeOrigins\": [\"https://a.test\"]\n}\n";
        let doc = parse_document(raw).unwrap();
        assert_eq!(doc.safe_origins, Some(vec!["https://a.test".to_string()]));
    }

    #[test]
    fn test_comment_not_at_start_is_not_stripped() {
        let raw = " /* note */ {}";
        assert!(parse_document(raw).is_err());
    }

    #[test]
    fn test_unterminated_comment_fails() {
        assert!(matches!(
            parse_document("/* never closed {}"),
            Err(ConfigError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_ignore_rule_keeps_criteria() {
        let doc = parse_document(
            r#"{"ignoreRules": [{"heuristic": "Reflected input", "url": "https://x.test/", "conditions": "q"}]}"#,
        )
        .unwrap();
        let rules = doc.ignore_rules.unwrap();
        assert_eq!(rules[0].heuristic, "Reflected input");
        assert_eq!(rules[0].criteria["url"], "https://x.test/");
        assert_eq!(rules[0].criteria["conditions"], "q");
    }

    #[test]
    fn test_unknown_fields_are_retained() {
        let doc = parse_document(r#"{"reporting": {"endpoint": "https://r.test"}}"#).unwrap();
        assert_eq!(
            doc,
            ConfigDocument {
                extra: doc.extra.clone(),
                ..Default::default()
            }
        );
        assert!(doc.extra.contains_key("reporting"));
    }

    #[test]
    fn test_serialize_uses_camel_case() {
        let doc = ConfigDocument {
            safe_origins: Some(vec![]),
            ignore_rules: Some(vec![]),
            ..Default::default()
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("safeOrigins").is_some());
        assert!(json.get("ignoreRules").is_some());
        assert!(json.get("scope").is_none());
    }

    #[test]
    fn test_bundled_default_parses() {
        let raw = include_str!("../../resources/config/default_config.json");
        let doc = parse_document(raw).unwrap();
        assert_eq!(doc.components, Some(vec!["DOMSnitch".to_string()]));
        assert_eq!(doc.heuristics.map(|h| h.len()), Some(9));
    }
}
