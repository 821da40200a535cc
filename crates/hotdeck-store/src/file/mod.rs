//! Backing file for one persistent store
//!
//! Provides:
//! - Atomic writes (temp file + rename)
//! - Key-by-key upserts that leave unrelated top-level keys untouched
//! - Change fingerprints for detecting external edits

mod atomic;
mod json_file;

pub use atomic::atomic_write;
pub use json_file::{Fingerprint, JsonFile};
