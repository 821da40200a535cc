//! Store configuration
//!
//! Every persistent store is described by one `StoreConfig`: where its file
//! lives, which application version is running, and when writes happen.

use std::path::{Path, PathBuf};

use crate::migrations::SchemaVersion;

/// When in-memory changes reach the disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Flush after every `update` call
    #[default]
    Immediate,
    /// Keep changes pending until `flush()` is called
    Deferred,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    name: String,
    dir: PathBuf,
    file_name: Option<String>,
    app_version: Option<SchemaVersion>,
    write_mode: WriteMode,
}

impl StoreConfig {
    /// Store `name` persisted under `dir` as `<name>.json`
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            file_name: None,
            app_version: None,
            write_mode: WriteMode::default(),
        }
    }

    /// Override the file name (default `<name>.json`)
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Running application version; newer migrations are not applied
    pub fn with_app_version(mut self, version: SchemaVersion) -> Self {
        self.app_version = Some(version);
        self
    }

    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn app_version(&self) -> Option<&SchemaVersion> {
        self.app_version.as_ref()
    }

    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    /// Full path of the backing file
    pub fn path(&self) -> PathBuf {
        match &self.file_name {
            Some(file_name) => self.dir.join(file_name),
            None => self.dir.join(format!("{}.json", self.name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_name_uses_store_name() {
        let config = StoreConfig::new("lens-hotbar-store", "/data");
        assert_eq!(config.path(), PathBuf::from("/data/lens-hotbar-store.json"));
        assert_eq!(config.write_mode(), WriteMode::Immediate);
    }

    #[test]
    fn test_file_name_override() {
        let config = StoreConfig::new("hotbars", "/data").with_file_name("custom.json");
        assert_eq!(config.path(), PathBuf::from("/data/custom.json"));
    }
}
