//! Stale-record reconciliation for destructive sync.
//!
//! After an import has fully completed, keys that existed remotely before
//! the import but are absent from it are stale. They are written to a
//! stale list and removed by a second, Delete-kind run of the same engine.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::Redirect;
use crate::sync::file::write_records;

/// Subdirectory of the state directory holding stale lists.
pub const STALE_DIR: &str = "stale";

/// Compute `previous − current` by identity key.
///
/// The result is sorted and free of duplicates, so the stale list written
/// from it (and therefore its fingerprint) is stable across retries.
#[must_use]
pub fn stale_keys<P, C>(previous: P, current: C) -> Vec<String>
where
    P: IntoIterator,
    P::Item: AsRef<str>,
    C: IntoIterator,
    C::Item: AsRef<str>,
{
    let current: BTreeSet<String> = current.into_iter().map(|k| k.as_ref().to_string()).collect();
    previous
        .into_iter()
        .map(|k| k.as_ref().to_string())
        .filter(|k| !current.contains(k))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Path of the stale list for an import fingerprint.
#[must_use]
pub fn stale_list_path(state_dir: &Path, import_fingerprint: &str) -> PathBuf {
    state_dir
        .join(STALE_DIR)
        .join(format!("{import_fingerprint}.json"))
}

/// Write stale keys as a record list usable by `redsync delete`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_stale_list(path: &Path, keys: &[String]) -> Result<()> {
    let records: Vec<Redirect> = keys.iter().map(Redirect::key_only).collect();
    write_records(path, &records)
}
