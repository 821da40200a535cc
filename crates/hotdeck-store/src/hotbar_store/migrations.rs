//! Schema migrations of the hotbar store file

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;

use serde_json::{json, Map, Value};
use uuid::Uuid;

use hotdeck_core::collection::DEFAULT_HOTBAR_NAME;
use hotdeck_core::hotbar::{fit_to_capacity, HOTBAR_CAPACITY};
use hotdeck_core::{EntityRef, SlotItem};

use crate::errors::{from_serde, Result};
use crate::migrations::{MigrationDeclaration, MigrationLogger, RawStore};

/// Companion file holding cluster display names
pub const CLUSTER_STORE_FILE: &str = "lens-cluster-store.json";

const HOTBARS: &str = "hotbars";
const ACTIVE_HOTBAR_ID: &str = "activeHotbarId";

/// All hotbar store migrations, oldest first
///
/// `catalog_entity` is pinned to slot 0 of the hotbar seeded for stores that
/// have none.
pub fn hotbar_migrations(catalog_entity: EntityRef) -> Result<Vec<MigrationDeclaration>> {
    Ok(vec![
        MigrationDeclaration::new("5.0.0-alpha.0", move |log, raw| {
            seed_default_hotbar(log, raw, &catalog_entity)
        })?,
        MigrationDeclaration::new("5.0.0-alpha.2", assign_hotbar_ids)?,
        MigrationDeclaration::new("5.0.0-beta.5", resolve_entity_names)?,
        MigrationDeclaration::new("5.0.0-beta.10", fit_hotbar_items)?,
    ])
}

fn seed_default_hotbar(
    log: &MigrationLogger,
    raw: &mut RawStore,
    catalog_entity: &EntityRef,
) -> Result<()> {
    if raw.has(HOTBARS) {
        return Ok(());
    }

    let mut items = vec![Value::Null; HOTBAR_CAPACITY];
    items[0] = serde_json::to_value(SlotItem::new(catalog_entity.clone()))
        .map_err(|e| from_serde("seed_default_hotbar", e))?;
    raw.set(
        HOTBARS,
        json!([{ "name": DEFAULT_HOTBAR_NAME, "items": items }]),
    );
    log.info("seeded default hotbar", None);
    Ok(())
}

fn assign_hotbar_ids(log: &MigrationLogger, raw: &mut RawStore) -> Result<()> {
    let mut first_id = None;
    if let Some(hotbars) = raw.get_mut(HOTBARS).and_then(Value::as_array_mut) {
        for hotbar in hotbars.iter_mut().filter_map(Value::as_object_mut) {
            let has_id = hotbar
                .get("id")
                .and_then(Value::as_str)
                .is_some_and(|id| !id.is_empty());
            if !has_id {
                let id = Uuid::now_v7().to_string();
                log.info("assigned hotbar id", Some(&json!({ "id": id })));
                hotbar.insert("id".to_string(), Value::String(id));
            }
            if first_id.is_none() {
                first_id = hotbar.get("id").cloned();
            }
        }
    }

    let active_missing = matches!(raw.get(ACTIVE_HOTBAR_ID), None | Some(Value::Null));
    if active_missing {
        if let Some(id) = first_id {
            raw.set(ACTIVE_HOTBAR_ID, id);
        }
    }
    Ok(())
}

fn resolve_entity_names(log: &MigrationLogger, raw: &mut RawStore) -> Result<()> {
    let names = read_cluster_names(log, raw);

    let Some(hotbars) = raw.get_mut(HOTBARS).and_then(Value::as_array_mut) else {
        return Ok(());
    };
    for hotbar in hotbars.iter_mut().filter_map(Value::as_object_mut) {
        let Some(items) = hotbar.get_mut("items").and_then(Value::as_array_mut) else {
            continue;
        };
        for item in items.iter_mut() {
            if item.is_null() {
                continue;
            }
            let Some(entity) = item.get_mut("entity").and_then(Value::as_object_mut) else {
                log.warn("dropping hotbar item without entity", Some(&*item));
                *item = Value::Null;
                continue;
            };
            let Some(uid) = entity.get("uid").and_then(Value::as_str).map(str::to_string) else {
                log.warn(
                    "dropping hotbar item without entity uid",
                    Some(&Value::Object(entity.clone())),
                );
                *item = Value::Null;
                continue;
            };
            if has_name(entity) {
                continue;
            }
            let name = names.get(&uid).cloned().unwrap_or_else(|| uid.clone());
            entity.insert("name".to_string(), Value::String(name));
        }
    }
    Ok(())
}

fn has_name(entity: &Map<String, Value>) -> bool {
    entity
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| !name.trim().is_empty())
}

/// Cluster id to display name, from the optional companion file
fn read_cluster_names(log: &MigrationLogger, raw: &RawStore) -> HashMap<String, String> {
    let path = raw.companion_path(CLUSTER_STORE_FILE);
    let mut names = HashMap::new();

    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log.info(
                "cluster store not found, entity names fall back to uids",
                Some(&json!({ "path": path.display().to_string() })),
            );
            return names;
        }
        Err(e) => {
            log.warn(
                "cluster store unreadable, entity names fall back to uids",
                Some(&json!({ "path": path.display().to_string(), "error": e.to_string() })),
            );
            return names;
        }
    };

    let clusters = match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(mut record)) => match record.remove("clusters") {
            Some(Value::Array(clusters)) => clusters,
            _ => Vec::new(),
        },
        Ok(_) => Vec::new(),
        Err(e) => {
            log.warn(
                "cluster store is not valid JSON",
                Some(&json!({ "error": e.to_string() })),
            );
            return names;
        }
    };

    for cluster in clusters {
        let id = cluster.get("id").and_then(Value::as_str);
        let name = cluster
            .pointer("/preferences/clusterName")
            .and_then(Value::as_str)
            .or_else(|| cluster.get("contextName").and_then(Value::as_str));
        match (id, name) {
            (Some(id), Some(name)) => {
                names.insert(id.to_string(), name.to_string());
            }
            _ => log.warn("skipping malformed cluster record", Some(&cluster)),
        }
    }
    names
}

fn fit_hotbar_items(log: &MigrationLogger, raw: &mut RawStore) -> Result<()> {
    let Some(hotbars) = raw.get_mut(HOTBARS).and_then(Value::as_array_mut) else {
        return Ok(());
    };
    for hotbar in hotbars.iter_mut().filter_map(Value::as_object_mut) {
        let items = hotbar
            .entry("items".to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !items.is_array() {
            log.warn("replacing non-array hotbar items", Some(&*items));
            *items = Value::Array(Vec::new());
        }
        if let Value::Array(items) = items {
            fit_to_capacity(items, HOTBAR_CAPACITY, Value::is_null, || Value::Null);
        }
    }
    Ok(())
}
