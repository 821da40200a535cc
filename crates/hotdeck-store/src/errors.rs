//! Error handling for hotdeck-store
//!
//! Wraps hotdeck-core ExError with store-specific helpers

use std::path::Path;

use hotdeck_core::errors::{ExError, ExErrorKind};
use hotdeck_core_types::schema::OP_MIGRATE;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a usage error (API called in the wrong lifecycle state)
pub fn usage_error(store: &str, op: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Usage)
        .with_op(op.to_string())
        .with_store(store.to_string())
        .with_message(reason.to_string())
}

/// Create a migration error for `store`
pub fn migration_error(store: &str, message: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::Migration)
        .with_op(OP_MIGRATE)
        .with_store(store.to_string())
        .with_message(message)
}

/// Create an invalid version error
pub fn invalid_version(input: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidVersion)
        .with_op("parse_version")
        .with_message(format!("Invalid version '{}': {}", input, reason))
}

/// Create a serialization error from serde_json::Error
pub fn from_serde(op: &str, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(op.to_string())
        .with_message(err.to_string())
}

/// Create an error for a backing file that is not a JSON object
pub fn not_an_object(path: &Path) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("read_store")
        .with_message(format!("{} does not contain a JSON object", path.display()))
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
