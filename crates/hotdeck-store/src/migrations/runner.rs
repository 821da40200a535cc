//! Migration runner
//!
//! Applies versioned migrations to a raw store in ascending version order,
//! each at most once per store lifetime.

use std::collections::BTreeMap;
use std::time::Instant;

use serde_json::Value;

use hotdeck_core::{log_op_end, log_op_error, log_op_start};
use hotdeck_core_types::schema::OP_MIGRATE;

use crate::errors::{migration_error, Result};
use crate::migrations::raw::RawStore;
use crate::migrations::version::SchemaVersion;

/// Dotted path of the persisted schema tag
pub const SCHEMA_TAG_PATH: &str = "__internal__.migrations.version";

type MigrationFn = dyn Fn(&MigrationLogger, &mut RawStore) -> Result<()>;

/// One migration step registered for a version
pub struct MigrationDeclaration {
    version: SchemaVersion,
    run: Box<MigrationFn>,
}

impl MigrationDeclaration {
    /// Declare a step for `version`
    ///
    /// Fails with `InvalidVersion` if `version` does not parse.
    pub fn new(
        version: &str,
        run: impl Fn(&MigrationLogger, &mut RawStore) -> Result<()> + 'static,
    ) -> Result<Self> {
        Ok(Self {
            version: SchemaVersion::parse(version)?,
            run: Box::new(run),
        })
    }

    pub fn version(&self) -> &SchemaVersion {
        &self.version
    }
}

impl std::fmt::Debug for MigrationDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationDeclaration")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// Logger handed to each migration, tagged with store and version
#[derive(Debug, Clone)]
pub struct MigrationLogger {
    store: String,
    version: String,
}

impl MigrationLogger {
    fn new(store: &str, version: &SchemaVersion) -> Self {
        Self {
            store: store.to_string(),
            version: version.to_string(),
        }
    }

    pub fn info(&self, message: &str, meta: Option<&Value>) {
        match meta {
            Some(meta) => tracing::info!(
                store = %self.store,
                migration_version = %self.version,
                meta = %meta,
                "{}",
                message
            ),
            None => tracing::info!(
                store = %self.store,
                migration_version = %self.version,
                "{}",
                message
            ),
        }
    }

    pub fn warn(&self, message: &str, meta: Option<&Value>) {
        match meta {
            Some(meta) => tracing::warn!(
                store = %self.store,
                migration_version = %self.version,
                meta = %meta,
                "{}",
                message
            ),
            None => tracing::warn!(
                store = %self.store,
                migration_version = %self.version,
                "{}",
                message
            ),
        }
    }
}

/// Ordered set of migrations for one store
#[derive(Debug)]
pub struct MigrationRunner {
    store: String,
    migrations: BTreeMap<SchemaVersion, Vec<MigrationDeclaration>>,
    target: Option<SchemaVersion>,
}

impl MigrationRunner {
    pub fn new(
        store: impl Into<String>,
        declarations: impl IntoIterator<Item = MigrationDeclaration>,
    ) -> Self {
        let mut migrations: BTreeMap<SchemaVersion, Vec<MigrationDeclaration>> = BTreeMap::new();
        for declaration in declarations {
            migrations
                .entry(declaration.version.clone())
                .or_default()
                .push(declaration);
        }
        Self {
            store: store.into(),
            migrations,
            target: None,
        }
    }

    /// A runner with no migrations
    pub fn empty(store: impl Into<String>) -> Self {
        Self::new(store, Vec::new())
    }

    /// Do not run migrations newer than `version`
    pub fn with_target(mut self, version: SchemaVersion) -> Self {
        self.target = Some(version);
        self
    }

    pub fn store(&self) -> &str {
        &self.store
    }

    /// Read the schema tag of `raw`
    ///
    /// `None` when no tag is stored; an unparsable tag is a migration error.
    pub fn current_version(&self, raw: &RawStore) -> Result<Option<SchemaVersion>> {
        match raw.get(SCHEMA_TAG_PATH) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(tag)) => SchemaVersion::parse(tag).map(Some).map_err(|e| {
                migration_error(
                    &self.store,
                    format!("stored schema tag '{}' is not a version", tag),
                )
                .with_source(e)
            }),
            Some(other) => Err(migration_error(
                &self.store,
                format!("stored schema tag {} is not a string", other),
            )),
        }
    }

    /// Run every pending migration against `raw`
    ///
    /// Returns the newest version applied, or `None` if nothing ran. On
    /// failure the schema tag is left untouched.
    pub fn upgrade(&self, raw: &mut RawStore) -> Result<Option<SchemaVersion>> {
        let start = Instant::now();
        let current = self.current_version(raw)?;

        let pending: Vec<(&SchemaVersion, &Vec<MigrationDeclaration>)> = self
            .migrations
            .iter()
            .filter(|(version, _)| current.as_ref().map_or(true, |c| *version > c))
            .filter(|(version, _)| self.target.as_ref().map_or(true, |t| *version <= t))
            .collect();

        if pending.is_empty() {
            tracing::debug!(
                store = %self.store,
                schema_version = current.as_ref().map(|v| v.to_string()).as_deref(),
                "schema up to date"
            );
            return Ok(None);
        }

        log_op_start!(OP_MIGRATE, store = %self.store, pending = pending.len());

        let mut applied = None;
        for (version, declarations) in pending {
            let logger = MigrationLogger::new(&self.store, version);
            for declaration in declarations {
                if let Err(e) = (declaration.run)(&logger, raw) {
                    let err = migration_error(&self.store, format!("migration {} failed", version))
                        .with_source(e);
                    log_op_error!(
                        OP_MIGRATE,
                        err.clone(),
                        duration_ms = start.elapsed().as_millis() as u64,
                        store = %self.store,
                        migration_version = %version
                    );
                    return Err(err);
                }
            }
            logger.info("migration applied", None);
            applied = Some(version.clone());
        }

        if let Some(version) = &applied {
            raw.set(SCHEMA_TAG_PATH, Value::String(version.to_string()));
        }

        log_op_end!(
            OP_MIGRATE,
            duration_ms = start.elapsed().as_millis() as u64,
            store = %self.store,
            schema_version = applied.as_ref().map(|v| v.to_string()).as_deref()
        );
        Ok(applied)
    }
}
