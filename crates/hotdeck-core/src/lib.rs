//! Hotdeck Core - in-memory hotbar semantics
//!
//! This crate provides:
//! - Entity references and slot items pinned to hotbars
//! - The fixed-capacity hotbar slot registry (add/remove/restack)
//! - The hotbar collection with its active cursor and reload reconciliation
//! - A synchronous change notifier used by the persistence layer
//! - The error facility and structured logging facility shared by all crates
//!
//! Persistence lives in `hotdeck-store`; nothing here touches the disk.

pub mod catalog;
pub mod collection;
pub mod errors;
pub mod hotbar;
pub mod logging_facility;
pub mod model;
pub mod notifier;

#[doc(hidden)]
pub use hotdeck_core_types;

// Re-export commonly used types
pub use catalog::{EntitySource, StaticCatalog};
pub use collection::{Direction, HotbarCollection, HotbarEvent, HotbarStoreModel, NewHotbar};
pub use errors::{ExError, ExErrorKind, HotbarError, Result};
pub use hotbar::{AddOutcome, Hotbar, HotbarModel, Slot, SlotIndex, HOTBAR_CAPACITY};
pub use model::{EntityRef, SlotItem};
pub use notifier::{ChangeNotifier, ListenerId};
