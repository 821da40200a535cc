//! Hotdeck Store - versioned JSON persistence
//!
//! This crate provides:
//! - Semantic schema versions and the migration runner
//! - A JSON object file with atomic, key-by-key writes
//! - `PersistentStore`, binding any `StoreModel` state to its file
//! - `HotbarStore`, the persisted hotbar collection and its migrations

pub mod config;
pub mod errors;
pub mod file;
pub mod hotbar_store;
pub mod migrations;
pub mod persistent;

pub use config::{StoreConfig, WriteMode};
pub use errors::Result;
pub use file::{Fingerprint, JsonFile};
pub use hotbar_store::{HotbarStore, CLUSTER_STORE_FILE, HOTBAR_STORE_NAME};
pub use migrations::{MigrationDeclaration, MigrationLogger, MigrationRunner, RawStore, SchemaVersion};
pub use persistent::{PersistentStore, StoreModel};
