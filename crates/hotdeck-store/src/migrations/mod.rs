//! Migration framework
//!
//! Provides:
//! - Semantic schema versions with semver precedence
//! - A dotted-path view of the raw store file
//! - The runner that upgrades a store and advances its schema tag

mod raw;
mod runner;
mod version;

pub use raw::RawStore;
pub use runner::{MigrationDeclaration, MigrationLogger, MigrationRunner, SCHEMA_TAG_PATH};
pub use version::SchemaVersion;
