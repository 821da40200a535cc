#![allow(clippy::unwrap_used, clippy::expect_used)]

// Integration tests for migration ordering and idempotency

use std::cell::RefCell;
use std::rc::Rc;

use hotdeck_store::migrations::SCHEMA_TAG_PATH;
use hotdeck_store::{MigrationDeclaration, MigrationRunner, RawStore, SchemaVersion};
use serde_json::{json, Map, Value};

fn recording(log: &Rc<RefCell<Vec<&'static str>>>, version: &str, tag: &'static str) -> MigrationDeclaration {
    let log = Rc::clone(log);
    MigrationDeclaration::new(version, move |_, _| {
        log.borrow_mut().push(tag);
        Ok(())
    })
    .unwrap()
}

fn record_at(version: &str) -> Map<String, Value> {
    json!({"__internal__": {"migrations": {"version": version}}})
        .as_object()
        .cloned()
        .unwrap()
}

#[test]
fn test_pending_migrations_run_in_version_then_registration_order() {
    // Given: Migrations 2.0.0(a), 1.0.0, 2.0.0(b), 0.5.0 registered out of order
    let log = Rc::new(RefCell::new(Vec::new()));
    let runner = MigrationRunner::new(
        "ordering",
        [
            recording(&log, "2.0.0", "2.0.0-a"),
            recording(&log, "1.0.0", "1.0.0"),
            recording(&log, "2.0.0", "2.0.0-b"),
            recording(&log, "0.5.0", "0.5.0"),
        ],
    );

    // And: A store tagged 0.9.0
    let mut record = record_at("0.9.0");
    let mut raw = RawStore::new(&mut record, "/tmp");

    // When: The store is upgraded
    let applied = runner.upgrade(&mut raw).unwrap();

    // Then: Only newer migrations ran, ascending, same-version in registration order
    assert_eq!(*log.borrow(), vec!["1.0.0", "2.0.0-a", "2.0.0-b"]);
    assert_eq!(applied, Some(SchemaVersion::parse("2.0.0").unwrap()));
    assert_eq!(raw.get(SCHEMA_TAG_PATH), Some(&json!("2.0.0")));

    // When: The upgrade runs again
    log.borrow_mut().clear();
    let rerun = runner.upgrade(&mut raw).unwrap();

    // Then: Nothing runs and the tag is unchanged
    assert!(log.borrow().is_empty());
    assert_eq!(rerun, None);
    assert_eq!(raw.get(SCHEMA_TAG_PATH), Some(&json!("2.0.0")));
}

#[test]
fn test_untagged_store_runs_everything() {
    // Given: A store without a schema tag
    let log = Rc::new(RefCell::new(Vec::new()));
    let runner = MigrationRunner::new(
        "fresh",
        [
            recording(&log, "5.0.0-beta.10", "beta.10"),
            recording(&log, "5.0.0-alpha.0", "alpha.0"),
            recording(&log, "5.0.0-beta.5", "beta.5"),
        ],
    );
    let mut record = Map::new();
    let mut raw = RawStore::new(&mut record, "/tmp");

    // When: The store is upgraded
    runner.upgrade(&mut raw).unwrap();

    // Then: Pre-release versions run in semver order
    assert_eq!(*log.borrow(), vec!["alpha.0", "beta.5", "beta.10"]);
    assert_eq!(raw.get(SCHEMA_TAG_PATH), Some(&json!("5.0.0-beta.10")));
}

#[test]
fn test_migration_sees_earlier_changes() {
    // Given: A migration that writes a value and a later one that reads it
    let runner = MigrationRunner::new(
        "chain",
        [
            MigrationDeclaration::new("1.0.0", |_, raw| {
                raw.set("settings.theme", json!("dark"));
                Ok(())
            })
            .unwrap(),
            MigrationDeclaration::new("1.1.0", |_, raw| {
                let theme = raw.get("settings.theme").cloned().unwrap_or(Value::Null);
                raw.set("settings.previousTheme", theme);
                raw.delete("settings.theme");
                Ok(())
            })
            .unwrap(),
        ],
    );
    let mut record = Map::new();
    let mut raw = RawStore::new(&mut record, "/tmp");

    // When: The store is upgraded
    runner.upgrade(&mut raw).unwrap();

    // Then: The second migration observed the first one's write
    assert_eq!(raw.get("settings.previousTheme"), Some(&json!("dark")));
    assert!(!raw.has("settings.theme"));
}
