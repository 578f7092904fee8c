//! Durable checkpoint store.
//!
//! One JSON document holds the committed batch count for every
//! (operation kind, fingerprint) pair:
//!
//! ```json
//! { "imports": { "<fingerprint>": { "counter": 3 } }, "deletes": {} }
//! ```
//!
//! Every mutation rewrites the whole document through [`atomic_write`], so a
//! crash right after [`CheckpointStore::save`] returns leaves either the old
//! or the new document on disk, never a torn one.
//!
//! There is no cross-process locking: two processes working on the same
//! fingerprint at once is outside the contract.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::model::OperationKind;
use crate::sync::file::atomic_write;

/// File name of the checkpoint document inside the state directory.
pub const CHECKPOINT_FILE: &str = "checkpoints.json";

/// Progress of one fingerprint under one operation kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckpointRecord {
    pub kind: OperationKind,
    pub fingerprint: String,
    /// Number of batches confirmed committed by the remote.
    pub committed_batch_count: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Entry {
    counter: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CheckpointDocument {
    #[serde(default)]
    imports: BTreeMap<String, Entry>,
    #[serde(default)]
    deletes: BTreeMap<String, Entry>,
}

impl CheckpointDocument {
    fn namespace(&self, kind: OperationKind) -> &BTreeMap<String, Entry> {
        match kind {
            OperationKind::Import => &self.imports,
            OperationKind::Delete => &self.deletes,
        }
    }

    fn namespace_mut(&mut self, kind: OperationKind) -> &mut BTreeMap<String, Entry> {
        match kind {
            OperationKind::Import => &mut self.imports,
            OperationKind::Delete => &mut self.deletes,
        }
    }
}

/// File-backed key-value store of committed batch counts.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Store at `<state_dir>/checkpoints.json`.
    #[must_use]
    pub fn in_dir(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(CHECKPOINT_FILE),
        }
    }

    /// Location of the checkpoint document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up the checkpoint for a fingerprint.
    ///
    /// Absence means the fingerprint was never started or has completed.
    ///
    /// # Errors
    ///
    /// Returns an error if the document exists but cannot be read or parsed.
    pub fn get(&self, kind: OperationKind, fingerprint: &str) -> Result<Option<CheckpointRecord>> {
        let doc = self.load()?;
        Ok(doc.namespace(kind).get(fingerprint).map(|entry| CheckpointRecord {
            kind,
            fingerprint: fingerprint.to_string(),
            committed_batch_count: entry.counter,
        }))
    }

    /// Durably record the committed batch count for a fingerprint.
    ///
    /// Returns only after the new document has been synced and renamed
    /// into place.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or written.
    pub fn save(&self, kind: OperationKind, fingerprint: &str, committed: usize) -> Result<()> {
        let mut doc = self.load()?;
        doc.namespace_mut(kind)
            .insert(fingerprint.to_string(), Entry { counter: committed });
        self.store(&doc)?;
        trace!(%kind, fingerprint, committed, "Checkpoint saved");
        Ok(())
    }

    /// Remove the checkpoint for a fingerprint.
    ///
    /// Returns `true` if an entry existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or written.
    pub fn clear(&self, kind: OperationKind, fingerprint: &str) -> Result<bool> {
        let mut doc = self.load()?;
        let existed = doc.namespace_mut(kind).remove(fingerprint).is_some();
        if existed {
            self.store(&doc)?;
            debug!(%kind, fingerprint, "Checkpoint cleared");
        }
        Ok(existed)
    }

    /// List every stored checkpoint, imports first.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or parsed.
    pub fn list(&self) -> Result<Vec<CheckpointRecord>> {
        let doc = self.load()?;
        Ok(OperationKind::ALL
            .into_iter()
            .flat_map(|kind| {
                doc.namespace(kind)
                    .iter()
                    .map(move |(fingerprint, entry)| CheckpointRecord {
                        kind,
                        fingerprint: fingerprint.clone(),
                        committed_batch_count: entry.counter,
                    })
            })
            .collect())
    }

    /// Remove every checkpoint. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or written.
    pub fn clear_all(&self) -> Result<usize> {
        let doc = self.load()?;
        let removed = doc.imports.len() + doc.deletes.len();
        if removed > 0 {
            self.store(&CheckpointDocument::default())?;
        }
        Ok(removed)
    }

    fn load(&self) -> Result<CheckpointDocument> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CheckpointDocument::default()),
            Err(e) => return Err(e.into()),
        };

        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(CheckpointDocument::default());
        }

        serde_json::from_slice(&content).map_err(|e| Error::CheckpointCorrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn store(&self, doc: &CheckpointDocument) -> Result<()> {
        let mut content = serde_json::to_vec_pretty(doc)?;
        content.push(b'\n');
        atomic_write(&self.path, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_absent() {
        let temp_dir = TempDir::new().unwrap();
        let store = CheckpointStore::in_dir(temp_dir.path());

        assert_eq!(store.get(OperationKind::Import, "fp").unwrap(), None);
        assert!(!store.path().exists(), "reads must not create the document");
    }

    #[test]
    fn test_save_then_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = CheckpointStore::in_dir(temp_dir.path());

        store.save(OperationKind::Import, "fp", 0).unwrap();
        store.save(OperationKind::Import, "fp", 2).unwrap();

        let record = store.get(OperationKind::Import, "fp").unwrap().unwrap();
        assert_eq!(record.committed_batch_count, 2);
        assert_eq!(store.get(OperationKind::Delete, "fp").unwrap(), None);
    }

    #[test]
    fn test_document_layout() {
        let temp_dir = TempDir::new().unwrap();
        let store = CheckpointStore::in_dir(temp_dir.path());

        store.save(OperationKind::Import, "abc", 1).unwrap();
        store.save(OperationKind::Delete, "def", 4).unwrap();

        let doc: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(
            doc,
            serde_json::json!({
                "imports": { "abc": { "counter": 1 } },
                "deletes": { "def": { "counter": 4 } }
            })
        );
    }

    #[test]
    fn test_clear_removes_only_target() {
        let temp_dir = TempDir::new().unwrap();
        let store = CheckpointStore::in_dir(temp_dir.path());

        store.save(OperationKind::Import, "a", 1).unwrap();
        store.save(OperationKind::Import, "b", 1).unwrap();
        store.save(OperationKind::Delete, "a", 1).unwrap();

        assert!(store.clear(OperationKind::Import, "a").unwrap());
        assert!(!store.clear(OperationKind::Import, "a").unwrap());

        assert_eq!(store.get(OperationKind::Import, "a").unwrap(), None);
        assert!(store.get(OperationKind::Import, "b").unwrap().is_some());
        assert!(store.get(OperationKind::Delete, "a").unwrap().is_some());
    }

    #[test]
    fn test_list_and_clear_all() {
        let temp_dir = TempDir::new().unwrap();
        let store = CheckpointStore::in_dir(temp_dir.path());

        store.save(OperationKind::Delete, "d1", 3).unwrap();
        store.save(OperationKind::Import, "i1", 1).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].kind, OperationKind::Import);
        assert_eq!(listed[1].fingerprint, "d1");

        assert_eq!(store.clear_all().unwrap(), 2);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_tolerates_missing_namespace() {
        let temp_dir = TempDir::new().unwrap();
        let store = CheckpointStore::in_dir(temp_dir.path());
        fs::write(store.path(), r#"{"imports":{"fp":{"counter":5}}}"#).unwrap();

        let record = store.get(OperationKind::Import, "fp").unwrap().unwrap();
        assert_eq!(record.committed_batch_count, 5);
    }

    #[test]
    fn test_corrupt_document() {
        let temp_dir = TempDir::new().unwrap();
        let store = CheckpointStore::in_dir(temp_dir.path());
        fs::write(store.path(), "{\"imports\": {").unwrap();

        let result = store.get(OperationKind::Import, "fp");
        assert!(matches!(result, Err(Error::CheckpointCorrupt { .. })));
    }
}
