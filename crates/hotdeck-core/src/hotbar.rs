//! Hotbar - fixed-capacity slot registry of pinned entities
//!
//! A hotbar always holds exactly [`HOTBAR_CAPACITY`] slots, each empty or
//! holding one [`SlotItem`]. Entity uids are unique across occupied slots.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::{HotbarError, Result};
use crate::model::{deserialize_lenient_slots, SlotItem};

/// Number of slots in every hotbar
pub const HOTBAR_CAPACITY: usize = 12;

/// One hotbar position, empty or occupied
pub type Slot = Option<SlotItem>;

/// A validated slot position (`0..HOTBAR_CAPACITY`)
///
/// Use the `TryFrom` conversions for indices that come from outside the
/// process (CLI arguments, JSON numbers); they reject negative, fractional
/// and out-of-bounds values with a range error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotIndex(usize);

impl SlotIndex {
    /// # Errors
    ///
    /// Returns `SlotIndexOutOfRange` if `index >= HOTBAR_CAPACITY`.
    pub fn new(index: usize) -> Result<Self> {
        if index < HOTBAR_CAPACITY {
            Ok(Self(index))
        } else {
            Err(out_of_range(index))
        }
    }

    pub fn get(self) -> usize {
        self.0
    }
}

fn out_of_range(value: impl ToString) -> HotbarError {
    HotbarError::SlotIndexOutOfRange {
        value: value.to_string(),
        capacity: HOTBAR_CAPACITY,
    }
}

impl TryFrom<usize> for SlotIndex {
    type Error = HotbarError;

    fn try_from(value: usize) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<i64> for SlotIndex {
    type Error = HotbarError;

    fn try_from(value: i64) -> Result<Self> {
        usize::try_from(value)
            .map_err(|_| out_of_range(value))
            .and_then(Self::new)
    }
}

impl TryFrom<f64> for SlotIndex {
    type Error = HotbarError;

    fn try_from(value: f64) -> Result<Self> {
        if !value.is_finite() || value.fract() != 0.0 || value < 0.0 {
            return Err(out_of_range(value));
        }
        if value >= HOTBAR_CAPACITY as f64 {
            return Err(out_of_range(value));
        }
        Self::new(value as usize)
    }
}

/// Result of a pin attempt that did not fail validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Item stored at this slot
    Added(usize),
    /// The uid was already pinned at this slot; nothing changed
    AlreadyPinned(usize),
    /// No free slot; the overflow handler was called
    Overflow,
    /// Explicit index outside the hotbar; logged, nothing changed
    OutOfRange,
}

impl AddOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added(_))
    }
}

/// Persisted shape of a hotbar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotbarModel {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_lenient_slots")]
    pub items: Vec<Slot>,
}

/// Live hotbar
#[derive(Debug, Clone, PartialEq)]
pub struct Hotbar {
    id: String,
    name: String,
    items: Vec<Slot>,
}

impl Hotbar {
    /// Create an empty hotbar
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            items: vec![None; HOTBAR_CAPACITY],
        }
    }

    /// Build a hotbar from persisted data, normalising its slots
    pub fn from_model(model: HotbarModel) -> Self {
        let mut hotbar = Self {
            id: model.id,
            name: model.name,
            items: Vec::new(),
        };
        hotbar.replace_items(model.items);
        hotbar
    }

    /// Update name and slots in place from persisted data
    pub fn merge_model(&mut self, model: HotbarModel) {
        self.name = model.name;
        self.replace_items(model.items);
    }

    pub fn to_model(&self) -> HotbarModel {
        HotbarModel {
            id: self.id.clone(),
            name: self.name.clone(),
            items: self.items.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// All slots, always `HOTBAR_CAPACITY` long
    pub fn items(&self) -> &[Slot] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&SlotItem> {
        self.items.get(index).and_then(Option::as_ref)
    }

    /// Whether an entity with this uid is pinned
    pub fn has(&self, uid: &str) -> bool {
        self.index_of(uid).is_some()
    }

    pub fn index_of(&self, uid: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|item| item.uid() == uid))
    }

    pub fn is_full(&self) -> bool {
        self.items.iter().all(Option::is_some)
    }

    /// Uids of occupied slots in slot order
    pub fn occupied_uids(&self) -> Vec<&str> {
        self.items.iter().flatten().map(SlotItem::uid).collect()
    }

    /// Pin an item
    ///
    /// Without an index the item goes into the first empty slot; when there is
    /// none `on_overflow` is called and nothing changes. With an index the slot
    /// is overwritten even if occupied. An index outside the hotbar is logged
    /// and ignored. Pinning an already pinned uid is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEntityRef` if the entity's uid or name is blank.
    pub fn add_item(
        &mut self,
        item: SlotItem,
        index: Option<usize>,
        on_overflow: &dyn Fn(),
    ) -> Result<AddOutcome> {
        item.entity.validate()?;

        if let Some(existing) = self.index_of(item.uid()) {
            return Ok(AddOutcome::AlreadyPinned(existing));
        }

        match index {
            None => match self.items.iter().position(Option::is_none) {
                Some(free) => {
                    self.items[free] = Some(item);
                    Ok(AddOutcome::Added(free))
                }
                None => {
                    on_overflow();
                    Ok(AddOutcome::Overflow)
                }
            },
            Some(index) if index < HOTBAR_CAPACITY => {
                self.items[index] = Some(item);
                Ok(AddOutcome::Added(index))
            }
            Some(index) => {
                tracing::error!(
                    component = module_path!(),
                    op = "add_item",
                    hotbar_id = %self.id,
                    uid = %item.uid(),
                    slot_index = index,
                    "cannot pin entity: slot index out of range"
                );
                Ok(AddOutcome::OutOfRange)
            }
        }
    }

    /// Empty the slot holding `uid`. Returns false if it was not pinned.
    pub fn remove_item(&mut self, uid: &str) -> bool {
        match self.index_of(uid) {
            Some(index) => {
                self.items[index] = None;
                true
            }
            None => false,
        }
    }

    /// Move the item at `from` to `to`
    ///
    /// If `to` is occupied, the items between `to` and the nearest empty slot
    /// on the `from` side shift one step away from `to`, keeping their
    /// relative order. Moving an empty slot changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `SlotIndexOutOfRange` if either index is outside the hotbar and
    /// `NoEmptySlot` if the shift finds no free slot. State is unchanged on
    /// error.
    pub fn restack_items(&mut self, from: usize, to: usize) -> Result<()> {
        let from = SlotIndex::new(from)?.get();
        let to = SlotIndex::new(to)?.get();

        if from == to {
            return Ok(());
        }

        let Some(source) = self.items[from].take() else {
            return Ok(());
        };

        if self.items[to].is_none() {
            self.items[to] = Some(source);
            return Ok(());
        }

        // Walk back toward `from`; the vacated slot bounds the scan.
        let direction = if from < to { -1 } else { 1 };
        match self.find_closest_empty_index(to, direction) {
            Some(empty) => {
                self.items.remove(empty);
                self.items.insert(to, Some(source));
                Ok(())
            }
            None => {
                self.items[from] = Some(source);
                Err(HotbarError::NoEmptySlot { from, to })
            }
        }
    }

    /// Nearest empty slot starting at `from` (inclusive), stepping by
    /// `direction`. `None` when the scan leaves the hotbar.
    pub fn find_closest_empty_index(&self, from: usize, direction: isize) -> Option<usize> {
        let mut index = from;
        loop {
            match self.items.get(index) {
                Some(None) => return Some(index),
                Some(Some(_)) => index = index.checked_add_signed(direction)?,
                None => return None,
            }
        }
    }

    /// Re-establish the capacity and unique-uid invariants
    pub fn normalize(&mut self) {
        let items = std::mem::take(&mut self.items);
        self.replace_items(items);
    }

    fn replace_items(&mut self, items: Vec<Slot>) {
        self.items = items;
        fit_to_capacity(
            &mut self.items,
            HOTBAR_CAPACITY,
            Option::is_none,
            || None,
        );
        self.clear_duplicate_uids();
    }

    fn clear_duplicate_uids(&mut self) {
        let mut seen = HashSet::new();
        for (index, slot) in self.items.iter_mut().enumerate() {
            let duplicate = slot
                .as_ref()
                .is_some_and(|item| !seen.insert(item.uid().to_string()));
            if duplicate {
                tracing::warn!(
                    component = module_path!(),
                    hotbar_id = %self.id,
                    slot_index = index,
                    "dropping duplicate pinned entity"
                );
                *slot = None;
            }
        }
    }
}

/// Pad or shrink `items` to exactly `capacity` entries
///
/// Short lists are padded with empties at the end. Long lists lose their
/// last empty entry first, repeatedly; occupied entries are truncated from
/// the end only when no empty entry remains.
pub fn fit_to_capacity<T>(
    items: &mut Vec<T>,
    capacity: usize,
    is_empty: impl Fn(&T) -> bool,
    make_empty: impl Fn() -> T,
) {
    while items.len() < capacity {
        items.push(make_empty());
    }

    while items.len() > capacity {
        match items.iter().rposition(&is_empty) {
            Some(index) => {
                items.remove(index);
            }
            None => items.truncate(capacity),
        }
    }
}
