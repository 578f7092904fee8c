//! Input fingerprinting for resumable runs.
//!
//! A fingerprint is a SHA256 digest over the execution context and the raw
//! input bytes. It is only a resume key: two invocations with the same
//! account, workspace, and file content share checkpoint progress. It is
//! not used to verify integrity.

use sha2::{Digest, Sha256};

/// Compute the fingerprint of an input within an account/workspace.
///
/// Each part is length-prefixed before hashing, so moving bytes between
/// the account and workspace ids can never produce the same digest.
#[must_use]
pub fn fingerprint(account: &str, workspace: &str, raw: &[u8]) -> String {
    let mut hasher = Sha256::new();
    for part in [account.as_bytes(), workspace.as_bytes(), raw] {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    format!("{:x}", hasher.finalize())
}

/// Shortened fingerprint for human-facing output.
#[must_use]
pub fn short(fingerprint: &str) -> &str {
    &fingerprint[..fingerprint.len().min(12)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_deterministic() {
        let a = fingerprint("acct", "ws", b"[{\"from\":\"/a\"}]");
        let b = fingerprint("acct", "ws", b"[{\"from\":\"/a\"}]");

        assert_eq!(a, b);
        assert_eq!(a.len(), 64); // SHA256 produces 64 hex chars
    }

    #[test]
    fn test_fingerprint_changes_with_each_part() {
        let base = fingerprint("acct", "ws", b"data");

        assert_ne!(base, fingerprint("acct2", "ws", b"data"));
        assert_ne!(base, fingerprint("acct", "ws2", b"data"));
        assert_ne!(base, fingerprint("acct", "ws", b"data2"));
    }

    #[test]
    fn test_fingerprint_part_boundaries_matter() {
        assert_ne!(fingerprint("ab", "c", b""), fingerprint("a", "bc", b""));
        assert_ne!(fingerprint("a", "", b"b"), fingerprint("a", "b", b""));
    }

    #[test]
    fn test_short() {
        assert_eq!(short("0123456789abcdef"), "0123456789ab");
        assert_eq!(short("abc"), "abc");
    }
}
