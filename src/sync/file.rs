//! File operations for sync inputs and state.
//!
//! This module provides safe file operations that prevent data corruption:
//! - Atomic writes: write to temp file, sync to disk, then rename
//! - Record input reading (JSON array or JSONL) that keeps the raw bytes
//!   for fingerprinting

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::Redirect;

/// Write content to a file atomically.
///
/// This function:
/// 1. Writes content to a uniquely named temporary file next to the target
/// 2. Calls `fsync` to ensure data is on disk
/// 3. Atomically renames the temp file to the target path
///
/// If any step fails, the original file (if any) remains untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| Error::InvalidArgument(format!("Not a file path: {}", path.display())))?;
    let temp_path = path.with_file_name(format!(
        ".{file_name}.{}.tmp",
        &uuid::Uuid::new_v4().to_string()[..8]
    ));

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let written = write_then_rename(&temp_path, path, content);

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    // Persist the rename itself
    #[cfg(unix)]
    if let Some(parent) = path.parent() {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

fn write_then_rename(temp_path: &Path, path: &Path, content: &[u8]) -> std::io::Result<()> {
    let file = File::create(temp_path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(content)?;
    writer.flush()?;
    // Sync to disk before rename
    writer.get_ref().sync_all()?;
    fs::rename(temp_path, path)
}

/// A record input loaded from disk.
///
/// Keeps the exact bytes read so that fingerprints are computed over the
/// file content rather than over a re-serialization.
#[derive(Debug, Clone)]
pub struct RecordInput {
    /// Where the input came from.
    pub path: PathBuf,
    /// Raw file content.
    pub raw: Vec<u8>,
    /// Parsed records, in file order.
    pub records: Vec<Redirect>,
}

impl RecordInput {
    /// Read and parse a record file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] if the file cannot be read and
    /// [`Error::Parse`] if it is not a JSON array or JSONL of records.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let records = parse_records(path, &raw)?;
        Ok(Self {
            path: path.to_path_buf(),
            raw,
            records,
        })
    }
}

/// Parse records from a JSON array or JSONL document.
///
/// The format is chosen from the first non-whitespace byte: `[` means a
/// JSON array, anything else is treated as one record per line.
///
/// # Errors
///
/// Returns [`Error::Parse`] naming the path (and line, for JSONL).
pub fn parse_records(path: &Path, raw: &[u8]) -> Result<Vec<Redirect>> {
    let text = std::str::from_utf8(raw).map_err(|e| Error::Parse {
        path: path.to_path_buf(),
        message: format!("not valid UTF-8: {e}"),
    })?;

    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(|e| Error::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        });
    }

    let mut records = Vec::new();
    for (line_num, line) in trimmed.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: Redirect = serde_json::from_str(line).map_err(|e| Error::Parse {
            path: path.to_path_buf(),
            message: format!("line {}: {e}", line_num + 1),
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Write records as a pretty JSON array, atomically.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_records(path: &Path, records: &[Redirect]) -> Result<()> {
    let mut content = serde_json::to_vec_pretty(records)?;
    content.push(b'\n');
    atomic_write(path, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("state.json");

        atomic_write(&path, b"{}").unwrap();
        atomic_write(&path, b"{\"a\":1}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"a\":1}");
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "temp files must be renamed away");
    }

    #[test]
    fn test_load_json_array() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("redirects.json");
        fs::write(&path, r#"[{"from":"/a","to":"/b"},{"from":"/c","to":"/d"}]"#).unwrap();

        let input = RecordInput::load(&path).unwrap();
        assert_eq!(input.records.len(), 2);
        assert_eq!(input.records[1].from, "/c");
        assert_eq!(input.raw, fs::read(&path).unwrap());
    }

    #[test]
    fn test_load_jsonl_skips_blank_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("redirects.jsonl");
        fs::write(&path, "{\"from\":\"/a\",\"to\":\"/b\"}\n\n{\"from\":\"/c\",\"to\":\"/d\"}\n").unwrap();

        let input = RecordInput::load(&path).unwrap();
        assert_eq!(input.records.len(), 2);
    }

    #[test]
    fn test_jsonl_parse_error_names_line() {
        let err = parse_records(Path::new("in.jsonl"), b"{\"from\":\"/a\"}\nnot json\n").unwrap_err();
        assert!(matches!(err, Error::Parse { ref message, .. } if message.starts_with("line 2")));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = RecordInput::load(Path::new("/nonexistent/redirects.json"));
        assert!(matches!(result, Err(Error::Read { .. })));
    }

    #[test]
    fn test_write_records_reloads() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stale.json");
        write_records(&path, &[Redirect::key_only("/x")]).unwrap();

        let input = RecordInput::load(&path).unwrap();
        assert_eq!(input.records, vec![Redirect::key_only("/x")]);
    }
}
