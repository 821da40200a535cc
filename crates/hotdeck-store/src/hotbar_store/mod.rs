//! The hotbar store
//!
//! Persists a [`HotbarCollection`] to `lens-hotbar-store.json`, upgrading
//! older files through the migrations in [`migrations`].

pub mod migrations;

use std::path::{Path, PathBuf};

use hotdeck_core::errors::ExError;
use hotdeck_core::{
    AddOutcome, Direction, EntitySource, HotbarCollection, HotbarStoreModel, NewHotbar, SlotItem,
    StaticCatalog,
};

use crate::config::StoreConfig;
use crate::errors::Result;
use crate::migrations::{MigrationRunner, SchemaVersion};
use crate::persistent::{PersistentStore, StoreModel};

pub use migrations::{hotbar_migrations, CLUSTER_STORE_FILE};

/// Store name, also the default file stem
pub const HOTBAR_STORE_NAME: &str = "lens-hotbar-store";

impl StoreModel for HotbarCollection {
    type Model = HotbarStoreModel;

    fn from_model(&mut self, model: HotbarStoreModel) {
        HotbarCollection::from_model(self, model);
    }

    fn to_model(&self) -> HotbarStoreModel {
        HotbarCollection::to_model(self)
    }

    fn watch(&mut self, mut on_change: Box<dyn FnMut()>) {
        self.subscribe(move |_| on_change());
    }
}

pub struct HotbarStore {
    inner: PersistentStore<HotbarCollection>,
}

impl HotbarStore {
    /// Store with the default file name under `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::new(
            StoreConfig::new(HOTBAR_STORE_NAME, dir),
            Box::new(StaticCatalog::default()),
        )
    }

    pub fn new(config: StoreConfig, catalog: Box<dyn EntitySource>) -> Result<Self> {
        Self::from_collection(config, HotbarCollection::new(catalog))
    }

    /// Like `new`, calling `on_overflow` when an implicit pin finds the
    /// active hotbar full
    pub fn with_overflow_handler(
        config: StoreConfig,
        catalog: Box<dyn EntitySource>,
        on_overflow: impl Fn() + 'static,
    ) -> Result<Self> {
        Self::from_collection(
            config,
            HotbarCollection::new(catalog).with_overflow_handler(on_overflow),
        )
    }

    fn from_collection(config: StoreConfig, collection: HotbarCollection) -> Result<Self> {
        let mut runner = MigrationRunner::new(
            config.name(),
            hotbar_migrations(collection.catalog_entity())?,
        );
        if let Some(version) = config.app_version() {
            runner = runner.with_target(version.clone());
        }
        Ok(Self {
            inner: PersistentStore::new(config, runner, collection),
        })
    }

    pub fn load(&mut self) -> Result<()> {
        self.inner.load()
    }

    pub fn hotbars(&self) -> &HotbarCollection {
        self.inner.state()
    }

    /// Run a fallible collection operation and persist its effect
    fn mutate<T>(
        &mut self,
        f: impl FnOnce(&mut HotbarCollection) -> hotdeck_core::Result<T>,
    ) -> Result<T> {
        self.inner.update(f)?.map_err(ExError::from)
    }

    /// Add a hotbar and return its id
    pub fn add(&mut self, data: NewHotbar, set_active: bool) -> Result<String> {
        self.mutate(|c| c.add(data, set_active))
    }

    pub fn remove(&mut self, id: &str) -> Result<bool> {
        self.mutate(|c| c.remove(id))
    }

    pub fn rename(&mut self, id: &str, name: &str) -> Result<()> {
        self.mutate(|c| c.rename(id, name))
    }

    pub fn set_active(&mut self, id: &str) -> Result<()> {
        self.mutate(|c| c.set_active(id))
    }

    pub fn set_active_by_name(&mut self, name: &str) -> Result<()> {
        self.mutate(|c| c.set_active_by_name(name))
    }

    pub fn switch_active(&mut self, direction: Direction) -> Result<()> {
        self.inner.update(|c| c.switch_active(direction))
    }

    /// Pin `item` to the active hotbar
    pub fn add_to_hotbar(&mut self, item: SlotItem, index: Option<usize>) -> Result<AddOutcome> {
        self.mutate(|c| c.add_to_hotbar(item, index))
    }

    pub fn remove_from_hotbar(&mut self, uid: &str) -> Result<bool> {
        self.inner.update(|c| c.remove_from_hotbar(uid))
    }

    /// Unpin `uid` from every hotbar
    pub fn remove_all_hotbar_items(&mut self, uid: &str) -> Result<usize> {
        self.inner.update(|c| c.remove_all_hotbar_items(uid))
    }

    pub fn restack_items(&mut self, from: usize, to: usize) -> Result<()> {
        self.mutate(|c| c.restack_items(from, to))
    }

    pub fn flush(&mut self) -> Result<usize> {
        self.inner.flush()
    }

    pub fn sync_from_disk(&mut self) -> Result<bool> {
        self.inner.sync_from_disk()
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.is_loaded()
    }

    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    pub fn schema_version(&self) -> Option<&SchemaVersion> {
        self.inner.schema_version()
    }
}
