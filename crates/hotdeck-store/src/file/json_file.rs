//! JSON object file with per-key updates

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::errors::{from_serde, io_error, not_an_object, Result};
use crate::file::atomic::atomic_write;

/// SHA256 of the file bytes, used to tell our own writes from external edits
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A file holding exactly one JSON object
///
/// A missing or empty file reads as an empty object.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole record
    pub fn read(&self) -> Result<Map<String, Value>> {
        self.read_with_fingerprint().map(|(record, _)| record)
    }

    /// Read the record together with the fingerprint of the bytes read
    ///
    /// The fingerprint is `None` when the file does not exist.
    pub fn read_with_fingerprint(&self) -> Result<(Map<String, Value>, Option<Fingerprint>)> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok((Map::new(), None)),
            Err(e) => return Err(io_error("read_store", e)),
        };

        let fingerprint = Some(Fingerprint::of(&bytes));
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok((Map::new(), fingerprint));
        }

        match serde_json::from_slice::<Value>(&bytes).map_err(|e| from_serde("read_store", e))? {
            Value::Object(record) => Ok((record, fingerprint)),
            _ => Err(not_an_object(&self.path)),
        }
    }

    /// Current fingerprint, `None` if the file does not exist
    pub fn fingerprint(&self) -> Result<Option<Fingerprint>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(Fingerprint::of(&bytes))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("fingerprint_store", e)),
        }
    }

    /// Set one top-level key, leaving every other key as it is on disk
    pub fn upsert(&self, key: &str, value: Value) -> Result<Fingerprint> {
        self.upsert_many([(key.to_string(), value)])
    }

    /// Set several top-level keys in one atomic write
    pub fn upsert_many(
        &self,
        entries: impl IntoIterator<Item = (String, Value)>,
    ) -> Result<Fingerprint> {
        let mut record = self.read()?;
        for (key, value) in entries {
            record.insert(key, value);
        }
        self.write_record(&record)
    }

    /// Remove a top-level key. Returns the new fingerprint, or `None` if the
    /// key was absent and nothing was written.
    pub fn delete(&self, key: &str) -> Result<Option<Fingerprint>> {
        let mut record = self.read()?;
        if record.remove(key).is_none() {
            return Ok(None);
        }
        self.write_record(&record).map(Some)
    }

    fn write_record(&self, record: &Map<String, Value>) -> Result<Fingerprint> {
        let bytes = serde_json::to_vec_pretty(record).map_err(|e| from_serde("write_store", e))?;
        atomic_write(&self.path, &bytes)?;
        Ok(Fingerprint::of(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup() -> (JsonFile, TempDir) {
        let dir = TempDir::new().unwrap();
        let file = JsonFile::new(dir.path().join("store.json"));
        (file, dir)
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let (file, _dir) = setup();
        assert!(file.read().unwrap().is_empty());
        assert!(file.fingerprint().unwrap().is_none());
    }

    #[test]
    fn test_upsert_preserves_other_keys() {
        let (file, _dir) = setup();
        file.upsert("a", json!(1)).unwrap();
        file.upsert("b", json!({"nested": true})).unwrap();
        file.upsert("a", json!(2)).unwrap();

        let record = file.read().unwrap();
        assert_eq!(record["a"], json!(2));
        assert_eq!(record["b"], json!({"nested": true}));
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let (file, _dir) = setup();
        let written = file.upsert("a", json!(1)).unwrap();
        assert_eq!(file.fingerprint().unwrap(), Some(written.clone()));

        fs::write(file.path(), br#"{"a": 5}"#).unwrap();
        assert_ne!(file.fingerprint().unwrap(), Some(written));
    }

    #[test]
    fn test_non_object_is_rejected() {
        let (file, _dir) = setup();
        fs::write(file.path(), b"[1, 2]").unwrap();
        assert!(file.read().is_err());
    }

    #[test]
    fn test_delete_missing_key_writes_nothing() {
        let (file, _dir) = setup();
        assert!(file.delete("a").unwrap().is_none());
        assert!(!file.path().exists());
    }
}
