//! Record validation and redirect type normalization.
//!
//! Every record is checked before any batch is planned. Redirect types go
//! through three-tier resolution: exact code → synonym lookup → error with
//! the closest suggestion. All issues are collected and reported together.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::model::{OperationKind, Redirect};

// ── Valid value sets (O(1) lookups) ──────────────────────────

pub static VALID_TYPES: LazyLock<HashSet<&str>> =
    LazyLock::new(|| ["301", "302", "307", "308", "410"].into_iter().collect());

/// Type that marks a rule as "gone" and needs no destination.
const GONE: &str = "410";

// ── Synonym maps ─────────────────────────────────────────────

pub static TYPE_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("permanent", "301"),
        ("moved", "301"),
        ("moved_permanently", "301"),
        ("temporary", "302"),
        ("found", "302"),
        ("temp", "302"),
        ("temporary_redirect", "307"),
        ("permanent_redirect", "308"),
        ("gone", "410"),
        ("removed", "410"),
    ]
    .into_iter()
    .collect()
});

/// A single problem found in an input record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Zero-based position of the record in the input.
    pub index: usize,
    /// Offending field name (wire name).
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "record {} `{}`: {}", self.index + 1, self.field, self.message)
    }
}

/// Normalize a redirect type via exact match or synonym lookup.
///
/// Returns the canonical status code, or an error with the original input
/// and an optional suggestion.
pub fn normalize_type(input: &str) -> std::result::Result<String, (String, Option<String>)> {
    let lower = input.trim().to_lowercase().replace(['-', ' '], "_");

    // Tier 1: exact match
    if VALID_TYPES.contains(lower.as_str()) {
        return Ok(lower);
    }

    // Tier 2: synonym lookup
    if let Some(&canonical) = TYPE_SYNONYMS.get(lower.as_str()) {
        return Ok(canonical.to_string());
    }

    // Tier 3: find closest suggestion
    let suggestion = find_closest_match(&lower, &VALID_TYPES, &TYPE_SYNONYMS);
    Err((input.to_string(), suggestion))
}

/// Validate and normalize records for a run of the given kind.
///
/// Import records need a well-formed `from`, a known type, a destination
/// unless the type is `410`, and an RFC 3339 `endDate` when one is given.
/// Delete records only need a well-formed `from`.
///
/// # Errors
///
/// Returns [`Error::Validation`] listing every issue found.
pub fn validate_records(kind: OperationKind, records: Vec<Redirect>) -> Result<Vec<Redirect>> {
    let mut issues = Vec::new();
    let mut normalized = Vec::with_capacity(records.len());

    for (index, mut record) in records.into_iter().enumerate() {
        check_from(index, &record.from, &mut issues);

        if kind == OperationKind::Import {
            if let Some(raw) = record.kind.as_deref() {
                match normalize_type(raw) {
                    Ok(canonical) => record.kind = Some(canonical),
                    Err((input, suggestion)) => issues.push(ValidationIssue {
                        index,
                        field: "type",
                        message: match suggestion {
                            Some(s) => format!("unknown type '{input}' (did you mean {s}?)"),
                            None => format!("unknown type '{input}'"),
                        },
                    }),
                }
            }

            let gone = record.kind.as_deref() == Some(GONE);
            let has_target = record.to.as_deref().is_some_and(|t| !t.trim().is_empty());
            if !gone && !has_target {
                issues.push(ValidationIssue {
                    index,
                    field: "to",
                    message: "destination is required unless type is 410".to_string(),
                });
            }

            if let Some(end) = record.end_date.as_deref() {
                if chrono::DateTime::parse_from_rfc3339(end).is_err() {
                    issues.push(ValidationIssue {
                        index,
                        field: "endDate",
                        message: format!("'{end}' is not an RFC 3339 timestamp"),
                    });
                }
            }
        }

        normalized.push(record);
    }

    if issues.is_empty() {
        Ok(normalized)
    } else {
        Err(Error::Validation { issues })
    }
}

fn check_from(index: usize, from: &str, issues: &mut Vec<ValidationIssue>) {
    let message = if from.trim().is_empty() {
        "source path is empty"
    } else if !from.starts_with('/') {
        "source path must start with '/'"
    } else if from.chars().any(char::is_whitespace) {
        "source path must not contain whitespace"
    } else {
        return;
    };
    issues.push(ValidationIssue {
        index,
        field: "from",
        message: message.to_string(),
    });
}

/// Find the closest matching value across valid set and synonyms.
fn find_closest_match(
    input: &str,
    valid: &HashSet<&str>,
    synonyms: &HashMap<&str, &str>,
) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;

    for &v in valid.iter().chain(synonyms.keys()) {
        let dist = levenshtein_distance(input, v);
        if dist <= 2 && best.is_none_or(|(_, d)| dist < d) {
            // For synonyms, show what it maps to
            let shown = synonyms.get(v).copied().unwrap_or(v);
            best = Some((shown, dist));
        }
    }

    best.map(|(v, _)| v.to_string())
}

// ── Levenshtein distance ─────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redirect(from: &str, to: Option<&str>, kind: Option<&str>) -> Redirect {
        Redirect {
            from: from.to_string(),
            to: to.map(String::from),
            kind: kind.map(String::from),
            end_date: None,
        }
    }

    #[test]
    fn test_normalize_type() {
        assert_eq!(normalize_type("301"), Ok("301".to_string()));
        assert_eq!(normalize_type("Permanent"), Ok("301".to_string()));
        assert_eq!(normalize_type("temporary-redirect"), Ok("307".to_string()));
        assert_eq!(normalize_type("gone"), Ok("410".to_string()));
        assert!(normalize_type("nonsense").is_err());
    }

    #[test]
    fn test_normalize_type_suggests_close_match() {
        let (input, suggestion) = normalize_type("permanant").unwrap_err();
        assert_eq!(input, "permanant");
        assert_eq!(suggestion.as_deref(), Some("301"));
    }

    #[test]
    fn test_import_records_normalized() {
        let records = vec![redirect("/a", Some("/b"), Some("permanent"))];
        let out = validate_records(OperationKind::Import, records).unwrap();
        assert_eq!(out[0].kind.as_deref(), Some("301"));
    }

    #[test]
    fn test_gone_needs_no_destination() {
        let records = vec![redirect("/a", None, Some("410"))];
        assert!(validate_records(OperationKind::Import, records).is_ok());
    }

    #[test]
    fn test_collects_every_issue() {
        let mut bad_date = redirect("/c", Some("/d"), None);
        bad_date.end_date = Some("tomorrow".to_string());
        let records = vec![
            redirect("no-slash", Some("/x"), None),
            redirect("/a", None, Some("302")),
            bad_date,
        ];

        let Err(Error::Validation { issues }) = validate_records(OperationKind::Import, records)
        else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = issues.iter().map(|i| (i.index, i.field)).collect();
        assert_eq!(fields, vec![(0, "from"), (1, "to"), (2, "endDate")]);
    }

    #[test]
    fn test_delete_records_only_need_key() {
        let records = vec![Redirect::key_only("/stale")];
        assert!(validate_records(OperationKind::Delete, records).is_ok());

        let records = vec![Redirect::key_only("")];
        assert!(validate_records(OperationKind::Delete, records).is_err());
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
        assert_eq!(levenshtein_distance("abc", "abd"), 1);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }
}
