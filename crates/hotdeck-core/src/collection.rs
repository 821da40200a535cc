//! Hotbar collection - named hotbars plus the active-hotbar cursor
//!
//! Insertion order is significant: it drives display indices and the cyclic
//! `switch_active` cursor. Every successful mutation publishes a
//! [`HotbarEvent`] to subscribers.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::EntitySource;
use crate::errors::{HotbarError, Result};
use crate::hotbar::{AddOutcome, Hotbar, HotbarModel, Slot};
use crate::model::{deserialize_lenient, EntityRef, SlotItem};
use crate::notifier::{ChangeNotifier, ListenerId};

/// Name of the hotbar synthesised on first run
pub const DEFAULT_HOTBAR_NAME: &str = "Default";

/// Placeholder returned by `display_index` for an unknown hotbar
pub const UNKNOWN_DISPLAY_INDEX: &str = "??";

/// Persisted shape of the whole collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotbarStoreModel {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub hotbars: Vec<HotbarModel>,

    #[serde(default, rename = "activeHotbarId")]
    pub active_hotbar_id: Option<String>,
}

/// Input for creating a hotbar
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewHotbar {
    /// Explicit id; a UUIDv7 is generated when absent
    pub id: Option<String>,
    pub name: String,
    /// Initial slots; normalised to the hotbar capacity
    pub items: Vec<Slot>,
}

impl NewHotbar {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_items(mut self, items: Vec<Slot>) -> Self {
        self.items = items;
        self
    }
}

/// Cursor movement for `switch_active`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Change published after each successful mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotbarEvent {
    /// State replaced from persisted data
    Reloaded,
    HotbarAdded { hotbar_id: String },
    HotbarRemoved { hotbar_id: String },
    HotbarRenamed { hotbar_id: String },
    ActiveChanged { hotbar_id: String },
    ItemsChanged { hotbar_id: String },
}

/// All hotbars and the active cursor
pub struct HotbarCollection {
    hotbars: IndexMap<String, Hotbar>,
    active_id: Option<String>,
    catalog: Box<dyn EntitySource>,
    on_overflow: Box<dyn Fn()>,
    notifier: ChangeNotifier<HotbarEvent>,
}

impl HotbarCollection {
    /// Create an empty collection; `from_model` seeds it
    pub fn new(catalog: Box<dyn EntitySource>) -> Self {
        Self {
            hotbars: IndexMap::new(),
            active_id: None,
            catalog,
            on_overflow: Box::new(|| {
                tracing::warn!(
                    component = module_path!(),
                    "hotbar is full, entity was not pinned"
                );
            }),
            notifier: ChangeNotifier::new(),
        }
    }

    /// Replace the handler called when an implicit pin finds no free slot
    pub fn with_overflow_handler(mut self, handler: impl Fn() + 'static) -> Self {
        self.on_overflow = Box::new(handler);
        self
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&HotbarEvent) + 'static) -> ListenerId {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Entity pinned to slot 0 of a freshly seeded default hotbar
    pub fn catalog_entity(&self) -> EntityRef {
        self.catalog.catalog_entity()
    }

    // ---------------------------------------------------------------------
    // Persistence projection
    // ---------------------------------------------------------------------

    /// Load persisted data, reconciling with hotbars already in memory
    ///
    /// Hotbars whose id is already live are updated in place; new ids are
    /// constructed; ids missing from `model` are dropped. With no stored
    /// hotbars a single default hotbar is seeded with the catalog entity.
    pub fn from_model(&mut self, model: HotbarStoreModel) {
        if model.hotbars.is_empty() {
            self.seed_default();
        } else {
            self.reconcile(model.hotbars);
        }

        self.active_id = model
            .active_hotbar_id
            .filter(|id| self.hotbars.contains_key(id))
            .or_else(|| self.hotbars.keys().next().cloned());

        self.notifier.publish(&HotbarEvent::Reloaded);
    }

    pub fn to_model(&self) -> HotbarStoreModel {
        HotbarStoreModel {
            hotbars: self.hotbars.values().map(Hotbar::to_model).collect(),
            active_hotbar_id: self.active_id.clone(),
        }
    }

    fn seed_default(&mut self) {
        let mut hotbar = Hotbar::new(Uuid::now_v7().to_string(), DEFAULT_HOTBAR_NAME);
        let catalog = SlotItem::new(self.catalog.catalog_entity());
        if let Err(e) = hotbar.add_item(catalog, Some(0), &|| {}) {
            tracing::warn!(
                component = module_path!(),
                error = %e,
                "catalog entity rejected, default hotbar left empty"
            );
        }

        self.hotbars.clear();
        self.hotbars.insert(hotbar.id().to_string(), hotbar);
    }

    fn reconcile(&mut self, incoming: Vec<HotbarModel>) {
        let mut order = HashMap::new();

        for model in incoming {
            if order.contains_key(&model.id) {
                tracing::warn!(
                    component = module_path!(),
                    hotbar_id = %model.id,
                    "skipping duplicate hotbar id"
                );
                continue;
            }
            order.insert(model.id.clone(), order.len());

            match self.hotbars.get_mut(&model.id) {
                Some(existing) => existing.merge_model(model),
                None => {
                    let hotbar = Hotbar::from_model(model);
                    self.hotbars.insert(hotbar.id().to_string(), hotbar);
                }
            }
        }

        self.hotbars.retain(|id, _| order.contains_key(id));
        self.hotbars
            .sort_by(|a, _, b, _| order[a].cmp(&order[b]));
    }

    // ---------------------------------------------------------------------
    // Collection operations
    // ---------------------------------------------------------------------

    /// Insert a new hotbar and return its id
    ///
    /// # Errors
    ///
    /// * `InvalidHotbarName` - if the name is blank
    /// * `DuplicateHotbarId` - if the explicit id is already used
    pub fn add(&mut self, data: NewHotbar, set_active: bool) -> Result<String> {
        if data.name.trim().is_empty() {
            return Err(HotbarError::InvalidHotbarName {
                reason: "Name cannot be empty or whitespace-only".to_string(),
            });
        }

        let id = data.id.unwrap_or_else(|| Uuid::now_v7().to_string());
        if self.hotbars.contains_key(&id) {
            return Err(HotbarError::DuplicateHotbarId { hotbar_id: id });
        }

        let hotbar = Hotbar::from_model(HotbarModel {
            id: id.clone(),
            name: data.name,
            items: data.items,
        });
        self.hotbars.insert(id.clone(), hotbar);

        if set_active || self.active_id.is_none() {
            self.active_id = Some(id.clone());
        }

        self.notifier.publish(&HotbarEvent::HotbarAdded {
            hotbar_id: id.clone(),
        });
        Ok(id)
    }

    /// Delete a hotbar
    ///
    /// Returns false (and logs) if the id is unknown. If the removed hotbar
    /// was active, the first remaining hotbar becomes active.
    ///
    /// # Errors
    ///
    /// Returns `CannotRemoveLastHotbar` if this is the only hotbar.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        if !self.hotbars.contains_key(id) {
            tracing::warn!(
                component = module_path!(),
                op = "remove_hotbar",
                hotbar_id = %id,
                "hotbar not found"
            );
            return Ok(false);
        }

        if self.hotbars.len() == 1 {
            return Err(HotbarError::CannotRemoveLastHotbar {
                hotbar_id: id.to_string(),
            });
        }

        self.hotbars.shift_remove(id);
        if self.active_id.as_deref() == Some(id) {
            self.active_id = self.hotbars.keys().next().cloned();
        }

        self.notifier.publish(&HotbarEvent::HotbarRemoved {
            hotbar_id: id.to_string(),
        });
        Ok(true)
    }

    /// Move the active cursor one hotbar forward or back, wrapping around
    pub fn switch_active(&mut self, direction: Direction) {
        let len = self.hotbars.len();
        if len == 0 {
            tracing::warn!(
                component = module_path!(),
                op = "switch_active",
                "no hotbars to switch between"
            );
            return;
        }

        let next = match self.active_index() {
            Some(current) => match direction {
                Direction::Next => (current + 1) % len,
                Direction::Previous => (current + len - 1) % len,
            },
            None => {
                tracing::warn!(
                    component = module_path!(),
                    op = "switch_active",
                    active_id = ?self.active_id,
                    "active hotbar missing, resetting to first"
                );
                0
            }
        };

        if let Some((id, _)) = self.hotbars.get_index(next) {
            let id = id.clone();
            self.activate(id);
        }
    }

    /// Make the hotbar with this id active
    ///
    /// # Errors
    ///
    /// Returns `HotbarNotFound` if no hotbar has this id.
    pub fn set_active(&mut self, id: &str) -> Result<()> {
        if !self.hotbars.contains_key(id) {
            return Err(HotbarError::HotbarNotFound {
                hotbar_id: id.to_string(),
            });
        }
        self.activate(id.to_string());
        Ok(())
    }

    /// Make the first hotbar with this name active
    ///
    /// # Errors
    ///
    /// Returns `HotbarNotFound` if no hotbar has this name.
    pub fn set_active_by_name(&mut self, name: &str) -> Result<()> {
        let id = self
            .get_by_name(name)
            .map(|h| h.id().to_string())
            .ok_or_else(|| HotbarError::HotbarNotFound {
                hotbar_id: name.to_string(),
            })?;
        self.activate(id);
        Ok(())
    }

    fn activate(&mut self, id: String) {
        if self.active_id.as_deref() == Some(id.as_str()) {
            return;
        }
        self.active_id = Some(id.clone());
        self.notifier
            .publish(&HotbarEvent::ActiveChanged { hotbar_id: id });
    }

    /// # Errors
    ///
    /// * `HotbarNotFound` - if the id is unknown
    /// * `InvalidHotbarName` - if the name is blank
    pub fn rename(&mut self, id: &str, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(HotbarError::InvalidHotbarName {
                reason: "Name cannot be empty or whitespace-only".to_string(),
            });
        }
        let hotbar = self.get_by_id_mut(id)?;
        hotbar.set_name(name);
        self.notifier.publish(&HotbarEvent::HotbarRenamed {
            hotbar_id: id.to_string(),
        });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Active hotbar items
    // ---------------------------------------------------------------------

    /// Pin an item on the active hotbar
    ///
    /// # Errors
    ///
    /// * `HotbarNotFound` - if there is no active hotbar
    /// * `InvalidEntityRef` - if the entity uid or name is blank
    pub fn add_to_hotbar(&mut self, item: SlotItem, index: Option<usize>) -> Result<AddOutcome> {
        let id = self.require_active_id()?;
        let on_overflow = &self.on_overflow;
        let outcome = match self.hotbars.get_mut(&id) {
            Some(hotbar) => hotbar.add_item(item, index, on_overflow.as_ref())?,
            None => return Err(HotbarError::HotbarNotFound { hotbar_id: id }),
        };

        if outcome.is_added() {
            self.notifier
                .publish(&HotbarEvent::ItemsChanged { hotbar_id: id });
        }
        Ok(outcome)
    }

    /// Unpin `uid` from the active hotbar. Unknown uids are ignored.
    pub fn remove_from_hotbar(&mut self, uid: &str) -> bool {
        let Some(id) = self.active_id.clone() else {
            return false;
        };
        let removed = self
            .hotbars
            .get_mut(&id)
            .is_some_and(|hotbar| hotbar.remove_item(uid));

        if removed {
            self.notifier
                .publish(&HotbarEvent::ItemsChanged { hotbar_id: id });
        }
        removed
    }

    /// Unpin `uid` from every hotbar, e.g. after the entity was deleted.
    /// Returns the number of hotbars that held it.
    pub fn remove_all_hotbar_items(&mut self, uid: &str) -> usize {
        let mut changed = Vec::new();
        for hotbar in self.hotbars.values_mut() {
            if hotbar.remove_item(uid) {
                changed.push(hotbar.id().to_string());
            }
        }

        for hotbar_id in &changed {
            self.notifier.publish(&HotbarEvent::ItemsChanged {
                hotbar_id: hotbar_id.clone(),
            });
        }
        changed.len()
    }

    /// Move an item within the active hotbar
    ///
    /// # Errors
    ///
    /// * `HotbarNotFound` - if there is no active hotbar
    /// * `SlotIndexOutOfRange` / `NoEmptySlot` - see [`Hotbar::restack_items`]
    pub fn restack_items(&mut self, from: usize, to: usize) -> Result<()> {
        let id = self.require_active_id()?;
        let hotbar = self.get_by_id_mut(&id)?;
        let before = hotbar.items().to_vec();
        hotbar.restack_items(from, to)?;

        if hotbar.items() != before.as_slice() {
            self.notifier
                .publish(&HotbarEvent::ItemsChanged { hotbar_id: id });
        }
        Ok(())
    }

    pub fn is_added_to_active(&self, uid: &str) -> bool {
        self.get_active().is_some_and(|hotbar| hotbar.has(uid))
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn get_active(&self) -> Option<&Hotbar> {
        self.active_id.as_ref().and_then(|id| self.hotbars.get(id))
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    /// Position of the active hotbar in insertion order
    pub fn active_index(&self) -> Option<usize> {
        self.active_id
            .as_ref()
            .and_then(|id| self.hotbars.get_index_of(id))
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Hotbar> {
        self.hotbars.get(id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Hotbar> {
        self.hotbars.values().find(|hotbar| hotbar.name() == name)
    }

    /// Hotbars in insertion order
    pub fn hotbars(&self) -> impl Iterator<Item = &Hotbar> {
        self.hotbars.values()
    }

    pub fn len(&self) -> usize {
        self.hotbars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hotbars.is_empty()
    }

    /// 1-based position for presentation, `"??"` if the id is unknown
    pub fn display_index(&self, id: &str) -> String {
        match self.hotbars.get_index_of(id) {
            Some(index) => (index + 1).to_string(),
            None => {
                tracing::warn!(
                    component = module_path!(),
                    op = "display_index",
                    hotbar_id = %id,
                    "hotbar not found"
                );
                UNKNOWN_DISPLAY_INDEX.to_string()
            }
        }
    }

    /// `"<index>: <name>"` label used by hotbar pickers
    pub fn display_label(&self, id: &str) -> String {
        let name = self.hotbars.get(id).map(Hotbar::name).unwrap_or_default();
        format!("{}: {}", self.display_index(id), name)
    }

    fn get_by_id_mut(&mut self, id: &str) -> Result<&mut Hotbar> {
        self.hotbars
            .get_mut(id)
            .ok_or_else(|| HotbarError::HotbarNotFound {
                hotbar_id: id.to_string(),
            })
    }

    fn require_active_id(&self) -> Result<String> {
        self.active_id
            .clone()
            .ok_or_else(|| HotbarError::HotbarNotFound {
                hotbar_id: "<active>".to_string(),
            })
    }
}

impl fmt::Debug for HotbarCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HotbarCollection")
            .field("hotbars", &self.hotbars)
            .field("active_id", &self.active_id)
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}
