//! Source of well-known catalog entities
//!
//! The entity catalog lives outside this crate. Hotbars only need the entry
//! that seeds slot 0 of the default hotbar on first run.

use crate::model::EntityRef;

/// External provider of catalog entity references
pub trait EntitySource {
    /// The "catalog" entry pinned to a freshly created default hotbar
    fn catalog_entity(&self) -> EntityRef;
}

/// Fixed catalog entity, used when no live catalog is wired in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCatalog {
    entity: EntityRef,
}

impl StaticCatalog {
    pub fn new(entity: EntityRef) -> Self {
        Self { entity }
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new(EntityRef::new("catalog-entity", "Catalog").with_source("app"))
    }
}

impl EntitySource for StaticCatalog {
    fn catalog_entity(&self) -> EntityRef {
        self.entity.clone()
    }
}
