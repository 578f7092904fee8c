//! Redirect rule model.
//!
//! A redirect is the unit of work the sync engine moves to the remote
//! workspace. Its identity for diffing and deletion is the `from` path.

use serde::{Deserialize, Serialize};

/// A single redirect rule as read from an input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redirect {
    /// Source path, e.g. `/old-page`. Identity key.
    pub from: String,

    /// Destination path or URL. Not required for `410` rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    /// Redirect status code (`301`, `302`, `307`, `308`, `410`).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// RFC 3339 timestamp after which the rule expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl Redirect {
    /// Create a redirect carrying only its key, as used in deletion lists.
    pub fn key_only(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: None,
            kind: None,
            end_date: None,
        }
    }

    /// Identity key used for diffing and deletion.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.from
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_wire_format() {
        let json = r#"{"from":"/a","to":"/b","type":"301","endDate":"2030-01-01T00:00:00Z"}"#;
        let redirect: Redirect = serde_json::from_str(json).unwrap();
        assert_eq!(redirect.key(), "/a");
        assert_eq!(redirect.kind.as_deref(), Some("301"));
        assert_eq!(redirect.end_date.as_deref(), Some("2030-01-01T00:00:00Z"));
    }

    #[test]
    fn test_key_only_serializes_just_from() {
        let json = serde_json::to_string(&Redirect::key_only("/gone")).unwrap();
        assert_eq!(json, r#"{"from":"/gone"}"#);
    }
}
