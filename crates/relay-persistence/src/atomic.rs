//! Atomic file operations for crash-safe persistence.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{PersistenceError, Result};

/// Creates a directory and its parents if missing.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|source| PersistenceError::DirectoryError {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Writes data to a file atomically.
///
/// The data goes to a temporary file in the same directory which is then
/// renamed over the target, so readers never observe a half-written file.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    // Same directory keeps the rename on one filesystem
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut temp_file =
        tempfile::NamedTempFile::new_in(dir).map_err(|source| PersistenceError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;

    temp_file
        .write_all(data)
        .and_then(|_| temp_file.flush())
        .map_err(|source| PersistenceError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;

    temp_file
        .persist(path)
        .map_err(|e| PersistenceError::WriteError {
            path: path.to_path_buf(),
            source: e.error,
        })?;

    Ok(())
}

/// Writes JSON data to a file atomically, pretty-printed.
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    atomic_write(path, json.as_bytes())
}

/// Reads and deserializes JSON from a file.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).map_err(|source| PersistenceError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str(&data)?;
    Ok(value)
}

/// Reads JSON from a file, returning None if the file doesn't exist.
pub fn read_json_optional<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    read_json(path).map(Some)
}

/// Lists `*.json` files directly inside `dir`. A missing directory is empty.
pub fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(|source| PersistenceError::ReadError {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| PersistenceError::ReadError {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Moves an unreadable file aside to `<name>.corrupt` and returns the new path.
pub fn quarantine(path: &Path) -> Result<PathBuf> {
    let mut target = path.as_os_str().to_owned();
    target.push(".corrupt");
    let target = PathBuf::from(target);
    fs::rename(path, &target).map_err(|source| PersistenceError::WriteError {
        path: target.clone(),
        source,
    })?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::tempdir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Record {
        name: String,
        count: u32,
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/users/alice.json");

        atomic_write(&path, b"{}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("kb.json");

        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_read_json_optional() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("record.json");

        let missing: Option<Record> = read_json_optional(&path).unwrap();
        assert!(missing.is_none());

        let record = Record {
            name: "contact".into(),
            count: 3,
        };
        atomic_write_json(&path, &record).unwrap();
        assert_eq!(read_json_optional::<Record>(&path).unwrap(), Some(record));
    }

    #[test]
    fn test_read_json_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let err = read_json::<Record>(&path).unwrap_err();
        assert!(matches!(err, PersistenceError::SerializeError(_)));
    }

    #[test]
    fn test_list_json_files_filters_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("1.json"), "{}").unwrap();
        fs::write(dir.path().join("2.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join("3.json.corrupt"), "x").unwrap();

        let files = list_json_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);

        assert!(list_json_files(&dir.path().join("missing")).unwrap().is_empty());
    }

    #[test]
    fn test_quarantine_moves_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("9.json");
        fs::write(&path, "garbage").unwrap();

        let moved = quarantine(&path).unwrap();

        assert!(!path.exists());
        assert!(moved.ends_with("9.json.corrupt"));
        assert_eq!(fs::read_to_string(moved).unwrap(), "garbage");
    }
}
