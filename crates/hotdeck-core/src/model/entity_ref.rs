use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{HotbarError, Result};

/// Weak reference to an externally owned catalog entity
///
/// Hotbars never own or resolve the referent; they only compare `uid`s.
/// Resolving a uid back to a live entity is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    /// Stable identity of the entity
    pub uid: String,

    /// Display name at the time the entity was pinned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Name of the entity source (e.g. "local", "app")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl EntityRef {
    pub fn new(uid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: Some(name.into()),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Check the reference is pinnable
    ///
    /// # Errors
    ///
    /// Returns `InvalidEntityRef` if `uid` or `name` is missing or blank.
    pub fn validate(&self) -> Result<()> {
        if self.uid.trim().is_empty() {
            return Err(HotbarError::InvalidEntityRef {
                field: "uid".to_string(),
                reason: "must be a non-empty string".to_string(),
            });
        }

        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(()),
            _ => Err(HotbarError::InvalidEntityRef {
                field: "name".to_string(),
                reason: "must be a non-empty string".to_string(),
            }),
        }
    }
}

/// Content of one occupied hotbar slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotItem {
    pub entity: EntityRef,

    /// Free-form launch parameters attached to the pin
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl SlotItem {
    pub fn new(entity: EntityRef) -> Self {
        Self {
            entity,
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn uid(&self) -> &str {
        &self.entity.uid
    }
}

impl From<EntityRef> for SlotItem {
    fn from(entity: EntityRef) -> Self {
        Self::new(entity)
    }
}
