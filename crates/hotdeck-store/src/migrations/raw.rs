//! Untyped view of a store file used by migrations

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

/// The raw JSON object of one store, addressed by dotted paths
/// (`"__internal__.migrations.version"`).
///
/// Intermediate objects are created on `set`; a non-object in the middle of
/// a path is replaced.
#[derive(Debug)]
pub struct RawStore<'a> {
    record: &'a mut Map<String, Value>,
    dir: PathBuf,
}

impl<'a> RawStore<'a> {
    pub fn new(record: &'a mut Map<String, Value>, dir: impl Into<PathBuf>) -> Self {
        Self {
            record,
            dir: dir.into(),
        }
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.record.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut Value> {
        let mut segments = path.split('.');
        let mut current = self.record.get_mut(segments.next()?)?;
        for segment in segments {
            current = current.as_object_mut()?.get_mut(segment)?;
        }
        Some(current)
    }

    pub fn has(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn set(&mut self, path: &str, value: Value) {
        let (parents, leaf) = match path.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, path),
        };

        let mut target = &mut *self.record;
        if let Some(parents) = parents {
            for segment in parents.split('.') {
                let slot = target
                    .entry(segment.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                target = match slot {
                    Value::Object(map) => map,
                    _ => unreachable!("slot was just made an object"),
                };
            }
        }
        target.insert(leaf.to_string(), value);
    }

    /// Remove the value at `path`, returning it if present
    pub fn delete(&mut self, path: &str) -> Option<Value> {
        match path.rsplit_once('.') {
            Some((parents, leaf)) => self.get_mut(parents)?.as_object_mut()?.remove(leaf),
            None => self.record.remove(path),
        }
    }

    /// Directory holding the store file
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of another file next to the store file
    pub fn companion_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    pub fn as_object(&self) -> &Map<String, Value> {
        self.record
    }
}
