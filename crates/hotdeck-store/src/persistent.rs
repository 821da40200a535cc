//! Persistent store engine
//!
//! Binds one in-memory state to one JSON file:
//! - `load()` reads the file, runs migrations and hydrates the state
//! - memory to file: the state's change notifications mark the store dirty
//!   and `flush()` writes only the top-level keys whose projection changed
//! - file to memory: `sync_from_disk()` reloads when the file fingerprint
//!   no longer matches our last read or write

use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use hotdeck_core::errors::{ExError, ExErrorKind};
use hotdeck_core::{log_op_end, log_op_error, log_op_start};
use hotdeck_core_types::schema::{OP_STORE_FLUSH, OP_STORE_LOAD, OP_STORE_RELOAD};

use crate::config::{StoreConfig, WriteMode};
use crate::errors::{from_serde, usage_error, Result};
use crate::file::{Fingerprint, JsonFile};
use crate::migrations::{MigrationRunner, RawStore, SchemaVersion};

/// A domain state that can be persisted by [`PersistentStore`]
pub trait StoreModel {
    /// Serialisable projection; must serialise to a JSON object
    type Model: Serialize + DeserializeOwned;

    /// Replace or merge the state from persisted data
    fn from_model(&mut self, model: Self::Model);

    /// Project the state; `from_model(to_model())` must be a no-op
    fn to_model(&self) -> Self::Model;

    /// Register a callback fired after every state mutation
    fn watch(&mut self, on_change: Box<dyn FnMut()>);
}

pub struct PersistentStore<S: StoreModel> {
    config: StoreConfig,
    file: JsonFile,
    migrations: MigrationRunner,
    state: S,
    /// Set on entry to `load()`, even when it then fails
    load_attempted: bool,
    loaded: bool,
    dirty: Rc<Cell<bool>>,
    /// Top-level keys as last read from or written to disk
    on_disk: Map<String, Value>,
    fingerprint: Option<Fingerprint>,
    schema_version: Option<SchemaVersion>,
}

impl<S: StoreModel> PersistentStore<S> {
    pub fn new(config: StoreConfig, migrations: MigrationRunner, state: S) -> Self {
        let file = JsonFile::new(config.path());
        Self {
            config,
            file,
            migrations,
            state,
            load_attempted: false,
            loaded: false,
            dirty: Rc::new(Cell::new(false)),
            on_disk: Map::new(),
            fingerprint: None,
            schema_version: None,
        }
    }

    /// Read, migrate and hydrate
    ///
    /// May be called once. A failed load leaves the store unloaded and is
    /// not retried: later calls are usage errors.
    pub fn load(&mut self) -> Result<()> {
        if self.load_attempted {
            return Err(usage_error(
                self.config.name(),
                OP_STORE_LOAD,
                "load() may only be called once",
            ));
        }

        self.load_attempted = true;
        let start = Instant::now();
        log_op_start!(OP_STORE_LOAD, store = self.config.name());

        match self.load_inner() {
            Ok(()) => {
                log_op_end!(
                    OP_STORE_LOAD,
                    duration_ms = start.elapsed().as_millis() as u64,
                    store = self.config.name(),
                    schema_version = self.schema_version.as_ref().map(|v| v.to_string()).as_deref()
                );
                Ok(())
            }
            Err(e) => {
                let err = e.with_store(self.config.name());
                log_op_error!(
                    OP_STORE_LOAD,
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    store = self.config.name()
                );
                Err(err)
            }
        }
    }

    fn load_inner(&mut self) -> Result<()> {
        let (mut record, fingerprint) = self.file.read_with_fingerprint()?;
        self.fingerprint = fingerprint;

        let before = record.clone();
        let mut raw = RawStore::new(&mut record, self.config.dir());
        let applied = self.migrations.upgrade(&mut raw)?;
        self.schema_version = match applied {
            Some(version) => Some(version),
            None => self.migrations.current_version(&raw)?,
        };

        if record != before {
            self.persist_migrated(&before, &record)?;
        }

        let model = decode_model::<S::Model>(&record)?;
        self.on_disk = record;
        self.state.from_model(model);

        let dirty = Rc::clone(&self.dirty);
        self.state.watch(Box::new(move || dirty.set(true)));
        self.loaded = true;

        // Normalisation done by from_model (default seeding, padding) reaches disk
        self.write_changes()?;
        Ok(())
    }

    fn persist_migrated(
        &mut self,
        before: &Map<String, Value>,
        after: &Map<String, Value>,
    ) -> Result<()> {
        let changed: Vec<(String, Value)> = after
            .iter()
            .filter(|(key, value)| before.get(*key) != Some(*value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if !changed.is_empty() {
            self.fingerprint = Some(self.file.upsert_many(changed)?);
        }
        for key in before.keys().filter(|key| !after.contains_key(*key)) {
            if let Some(fingerprint) = self.file.delete(key)? {
                self.fingerprint = Some(fingerprint);
            }
        }
        Ok(())
    }

    /// Mutate the state; in `WriteMode::Immediate` changes are flushed at once
    pub fn update<R>(&mut self, f: impl FnOnce(&mut S) -> R) -> Result<R> {
        self.ensure_loaded("store_update")?;
        let result = f(&mut self.state);
        if self.config.write_mode() == WriteMode::Immediate && self.dirty.get() {
            self.flush()?;
        }
        Ok(result)
    }

    /// Write pending changes. Returns the number of top-level keys written.
    pub fn flush(&mut self) -> Result<usize> {
        self.ensure_loaded(OP_STORE_FLUSH)?;
        if !self.dirty.get() {
            return Ok(0);
        }
        self.write_changes()
    }

    fn write_changes(&mut self) -> Result<usize> {
        let start = Instant::now();
        let projection = match serde_json::to_value(self.state.to_model())
            .map_err(|e| from_serde(OP_STORE_FLUSH, e))?
        {
            Value::Object(projection) => projection,
            other => {
                return Err(ExError::new(ExErrorKind::Persistence)
                    .with_op(OP_STORE_FLUSH)
                    .with_store(self.config.name())
                    .with_message(format!("model projected to a non-object: {}", other)))
            }
        };

        let changed: Vec<(String, Value)> = projection
            .into_iter()
            .filter(|(key, value)| self.on_disk.get(key) != Some(value))
            .collect();
        self.dirty.set(false);
        if changed.is_empty() {
            tracing::trace!(store = self.config.name(), "flush skipped, nothing changed");
            return Ok(0);
        }

        let written = changed.len();
        match self.file.upsert_many(changed.clone()) {
            Ok(fingerprint) => {
                self.fingerprint = Some(fingerprint);
                self.on_disk.extend(changed);
                tracing::debug!(
                    component = module_path!(),
                    op = OP_STORE_FLUSH,
                    store = self.config.name(),
                    keys = written,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "store flushed"
                );
                Ok(written)
            }
            Err(e) => {
                // Keep the change pending so a later flush retries
                self.dirty.set(true);
                let err = e.with_store(self.config.name());
                log_op_error!(
                    OP_STORE_FLUSH,
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    store = self.config.name()
                );
                Err(err)
            }
        }
    }

    /// Reload the state if the file changed since our last read or write
    ///
    /// Returns true when a reload happened. The file wins over pending
    /// in-memory changes.
    pub fn sync_from_disk(&mut self) -> Result<bool> {
        self.ensure_loaded(OP_STORE_RELOAD)?;
        let current = self.file.fingerprint()?;
        if current == self.fingerprint {
            return Ok(false);
        }

        let start = Instant::now();
        log_op_start!(OP_STORE_RELOAD, store = self.config.name());

        let (record, fingerprint) = self.file.read_with_fingerprint()?;
        let model = decode_model::<S::Model>(&record).map_err(|e| e.with_store(self.config.name()))?;
        self.on_disk = record;
        self.fingerprint = fingerprint;
        self.state.from_model(model);

        if self.config.write_mode() == WriteMode::Immediate {
            self.write_changes()?;
        }

        log_op_end!(
            OP_STORE_RELOAD,
            duration_ms = start.elapsed().as_millis() as u64,
            store = self.config.name()
        );
        Ok(true)
    }

    fn ensure_loaded(&self, op: &str) -> Result<()> {
        if self.loaded {
            Ok(())
        } else {
            Err(usage_error(
                self.config.name(),
                op,
                "store used before load()",
            ))
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether changes are waiting for `flush()`
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Schema tag after migrations ran
    pub fn schema_version(&self) -> Option<&SchemaVersion> {
        self.schema_version.as_ref()
    }
}

fn decode_model<M: DeserializeOwned>(record: &Map<String, Value>) -> Result<M> {
    serde_json::from_value(Value::Object(record.clone())).map_err(|e| from_serde(OP_STORE_LOAD, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::MigrationDeclaration;
    use hotdeck_core::ChangeNotifier;
    use serde::Deserialize;
    use serde_json::json;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Counter {
        value: i64,
        label: String,
        notifier: ChangeNotifier<()>,
    }

    impl Counter {
        fn set(&mut self, value: i64) {
            self.value = value;
            self.notifier.publish(&());
        }
    }

    #[derive(Serialize, Deserialize)]
    struct CounterModel {
        #[serde(default)]
        value: i64,
        #[serde(default)]
        label: String,
    }

    impl StoreModel for Counter {
        type Model = CounterModel;

        fn from_model(&mut self, model: CounterModel) {
            self.value = model.value;
            self.label = model.label;
            self.notifier.publish(&());
        }

        fn to_model(&self) -> CounterModel {
            CounterModel {
                value: self.value,
                label: self.label.clone(),
            }
        }

        fn watch(&mut self, mut on_change: Box<dyn FnMut()>) {
            self.notifier.subscribe(move |_| on_change());
        }
    }

    fn store(dir: &TempDir, mode: WriteMode) -> PersistentStore<Counter> {
        let config = StoreConfig::new("counter", dir.path()).with_write_mode(mode);
        PersistentStore::new(config, MigrationRunner::empty("counter"), Counter::default())
    }

    fn read(dir: &TempDir) -> Value {
        let text = std::fs::read_to_string(dir.path().join("counter.json")).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn test_load_twice_is_usage_error() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir, WriteMode::Immediate);
        store.load().unwrap();
        let err = store.load().unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Usage);
    }

    #[test]
    fn test_load_after_failed_load_is_usage_error() {
        // Given a file that is not a JSON object
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("counter.json"), b"[]").unwrap();
        let mut store = store(&dir, WriteMode::Immediate);

        // When load fails and is called again
        let first = store.load().unwrap_err();
        let second = store.load().unwrap_err();

        // Then the retry is refused without touching the file
        assert_eq!(first.kind(), ExErrorKind::Persistence);
        assert_eq!(second.kind(), ExErrorKind::Usage);
        assert!(!store.is_loaded());
        assert_eq!(std::fs::read(dir.path().join("counter.json")).unwrap(), b"[]");
    }

    #[test]
    fn test_update_before_load_is_usage_error() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir, WriteMode::Immediate);
        let err = store.update(|c| c.set(1)).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Usage);
    }

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir, WriteMode::Immediate);
        store.load().unwrap();
        assert_eq!(read(&dir), json!({"value": 0, "label": ""}));
    }

    #[test]
    fn test_deferred_mode_coalesces() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir, WriteMode::Deferred);
        store.load().unwrap();

        store.update(|c| c.set(1)).unwrap();
        store.update(|c| c.set(2)).unwrap();
        assert!(store.is_dirty());
        assert_eq!(read(&dir)["value"], json!(0));

        assert_eq!(store.flush().unwrap(), 1);
        assert_eq!(read(&dir)["value"], json!(2));

        // Same value again: dirty but nothing to write
        store.update(|c| c.set(2)).unwrap();
        assert_eq!(store.flush().unwrap(), 0);
    }

    #[test]
    fn test_migration_result_persisted() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::new("counter", dir.path());
        let runner = MigrationRunner::new(
            "counter",
            [MigrationDeclaration::new("1.0.0", |_, raw| {
                raw.set("value", json!(41));
                Ok(())
            })
            .unwrap()],
        );
        let mut store = PersistentStore::new(config, runner, Counter::default());
        store.load().unwrap();

        assert_eq!(store.state().value, 41);
        assert_eq!(store.schema_version().map(|v| v.to_string()).as_deref(), Some("1.0.0"));
        assert_eq!(
            read(&dir)["__internal__"]["migrations"]["version"],
            json!("1.0.0")
        );
    }

    #[test]
    fn test_sync_from_disk_detects_external_write() {
        let dir = TempDir::new().unwrap();
        let mut store = store(&dir, WriteMode::Immediate);
        store.load().unwrap();
        assert!(!store.sync_from_disk().unwrap());

        std::fs::write(
            dir.path().join("counter.json"),
            r#"{"value": 9, "label": "external"}"#,
        )
        .unwrap();
        assert!(store.sync_from_disk().unwrap());
        assert_eq!(store.state().value, 9);
        assert_eq!(store.state().label, "external");
        assert!(!store.sync_from_disk().unwrap());
    }
}
