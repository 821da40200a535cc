#![allow(clippy::unwrap_used, clippy::expect_used)]

// Integration tests for hotbar collection loading and reconciliation

use std::cell::RefCell;
use std::rc::Rc;

use hotdeck_core::{
    Direction, EntityRef, EntitySource, HotbarCollection, HotbarError, HotbarEvent, HotbarModel,
    HotbarStoreModel, NewHotbar, SlotItem, StaticCatalog, HOTBAR_CAPACITY,
};

struct FixedCatalog;

impl EntitySource for FixedCatalog {
    fn catalog_entity(&self) -> EntityRef {
        EntityRef::new("catalog", "Catalog").with_source("app")
    }
}

fn pin(uid: &str) -> Option<SlotItem> {
    Some(SlotItem::new(EntityRef::new(uid, uid)))
}

fn hotbar_model(id: &str, name: &str, items: Vec<Option<SlotItem>>) -> HotbarModel {
    HotbarModel {
        id: id.to_string(),
        name: name.to_string(),
        items,
    }
}

fn loaded(model: HotbarStoreModel) -> HotbarCollection {
    let mut c = HotbarCollection::new(Box::new(FixedCatalog));
    c.from_model(model);
    c
}

#[test]
fn test_first_run_seeds_catalog_pin() {
    // Given: No stored hotbars
    // When: The collection loads
    let c = loaded(HotbarStoreModel::default());

    // Then: Exactly one active "Default" hotbar exists with the catalog at slot 0
    assert_eq!(c.len(), 1);
    let active = c.get_active().expect("active hotbar");
    assert_eq!(active.name(), "Default");
    assert_eq!(active.item(0).map(SlotItem::uid), Some("catalog"));
    assert_eq!(active.occupied_uids().len(), 1);
}

#[test]
fn test_short_and_long_hotbars_are_normalised() {
    let mut long = vec![pin("a"), None, pin("b")];
    long.extend(std::iter::repeat(None).take(HOTBAR_CAPACITY));
    let mut packed: Vec<_> = (0..HOTBAR_CAPACITY + 2).map(|i| pin(&format!("p{i}"))).collect();
    packed.insert(3, None);

    let c = loaded(HotbarStoreModel {
        hotbars: vec![
            hotbar_model("short", "Short", vec![pin("x")]),
            hotbar_model("long", "Long", long),
            hotbar_model("packed", "Packed", packed),
        ],
        active_hotbar_id: None,
    });

    for hotbar in c.hotbars() {
        assert_eq!(hotbar.items().len(), HOTBAR_CAPACITY, "{}", hotbar.name());
    }
    assert_eq!(c.get_by_id("short").unwrap().occupied_uids(), vec!["x"]);
    assert_eq!(c.get_by_id("long").unwrap().occupied_uids(), vec!["a", "b"]);

    // The only empty slot goes first, then the tail is truncated
    let packed = c.get_by_id("packed").unwrap();
    let expected: Vec<String> = (0..HOTBAR_CAPACITY).map(|i| format!("p{i}")).collect();
    assert_eq!(packed.occupied_uids(), expected);
}

#[test]
fn test_active_id_falls_back_to_first() {
    let c = loaded(HotbarStoreModel {
        hotbars: vec![
            hotbar_model("one", "One", vec![]),
            hotbar_model("two", "Two", vec![]),
        ],
        active_hotbar_id: Some("gone".to_string()),
    });
    assert_eq!(c.active_id(), Some("one"));

    let c = loaded(HotbarStoreModel {
        hotbars: vec![
            hotbar_model("one", "One", vec![]),
            hotbar_model("two", "Two", vec![]),
        ],
        active_hotbar_id: Some("two".to_string()),
    });
    assert_eq!(c.active_id(), Some("two"));
}

#[test]
fn test_reload_updates_existing_hotbars_in_place() {
    // Given: A loaded collection with two hotbars
    let mut c = loaded(HotbarStoreModel {
        hotbars: vec![
            hotbar_model("one", "One", vec![pin("a")]),
            hotbar_model("two", "Two", vec![pin("b")]),
        ],
        active_hotbar_id: Some("two".to_string()),
    });

    // When: The file changes externally: "one" renamed and repinned, "two"
    // removed, "three" added
    c.from_model(HotbarStoreModel {
        hotbars: vec![
            hotbar_model("one", "First", vec![None, pin("c")]),
            hotbar_model("three", "Three", vec![]),
        ],
        active_hotbar_id: Some("two".to_string()),
    });

    // Then: The collection mirrors the file and the cursor is repaired
    let ids: Vec<_> = c.hotbars().map(|h| h.id().to_string()).collect();
    assert_eq!(ids, vec!["one", "three"]);
    let one = c.get_by_id("one").unwrap();
    assert_eq!(one.name(), "First");
    assert_eq!(one.item(1).map(SlotItem::uid), Some("c"));
    assert_eq!(c.active_id(), Some("one"));
}

#[test]
fn test_malformed_hotbar_records_are_skipped() {
    let json = r#"{
        "hotbars": [
            {"id": "good", "name": "Good", "items": []},
            {"id": 7},
            {"id": "also-good", "name": "Also", "items": [null]}
        ],
        "activeHotbarId": "good"
    }"#;
    let model: HotbarStoreModel = serde_json::from_str(json).unwrap();
    let c = loaded(model);

    let ids: Vec<_> = c.hotbars().map(|h| h.id().to_string()).collect();
    assert_eq!(ids, vec!["good", "also-good"]);
}

#[test]
fn test_cannot_remove_last_hotbar() {
    // Given: A collection with exactly one hotbar
    let mut c = loaded(HotbarStoreModel::default());
    let id = c.active_id().unwrap().to_string();

    // When: Removing it
    let err = c.remove(&id).unwrap_err();

    // Then: The removal fails and the hotbar survives
    assert!(matches!(err, HotbarError::CannotRemoveLastHotbar { .. }));
    assert!(c.get_by_id(&id).is_some());
    assert_eq!(c.active_id(), Some(id.as_str()));
}

#[test]
fn test_switch_active_cycles_in_insertion_order() {
    let mut c = loaded(HotbarStoreModel {
        hotbars: vec![
            hotbar_model("a", "A", vec![]),
            hotbar_model("b", "B", vec![]),
            hotbar_model("c", "C", vec![]),
        ],
        active_hotbar_id: Some("c".to_string()),
    });

    c.switch_active(Direction::Next);
    assert_eq!(c.active_id(), Some("a"));
    c.switch_active(Direction::Previous);
    assert_eq!(c.active_id(), Some("c"));
    c.switch_active(Direction::Previous);
    assert_eq!(c.active_id(), Some("b"));
}

#[test]
fn test_mutations_publish_events() {
    let mut c = HotbarCollection::new(Box::new(StaticCatalog::default()));
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    c.subscribe(move |e: &HotbarEvent| sink.borrow_mut().push(e.clone()));

    c.from_model(HotbarStoreModel::default());
    let id = c.add(NewHotbar::named("Work").with_id("work"), true).unwrap();
    c.add_to_hotbar(SlotItem::new(EntityRef::new("pod", "Pod")), None)
        .unwrap();
    // Re-pinning changes nothing and publishes nothing
    c.add_to_hotbar(SlotItem::new(EntityRef::new("pod", "Pod")), None)
        .unwrap();
    c.restack_items(0, 0).unwrap();
    c.remove_from_hotbar("pod");

    assert_eq!(
        *events.borrow(),
        vec![
            HotbarEvent::Reloaded,
            HotbarEvent::HotbarAdded {
                hotbar_id: id.clone()
            },
            HotbarEvent::ItemsChanged {
                hotbar_id: id.clone()
            },
            HotbarEvent::ItemsChanged { hotbar_id: id },
        ]
    );
}

#[test]
fn test_remove_all_hotbar_items_spans_hotbars() {
    let mut c = loaded(HotbarStoreModel {
        hotbars: vec![
            hotbar_model("a", "A", vec![pin("x"), pin("y")]),
            hotbar_model("b", "B", vec![None, None, pin("x")]),
        ],
        active_hotbar_id: Some("a".to_string()),
    });

    assert_eq!(c.remove_all_hotbar_items("x"), 2);
    assert!(!c.is_added_to_active("x"));
    assert!(c.is_added_to_active("y"));
    assert!(!c.get_by_id("b").unwrap().has("x"));
}

#[test]
fn test_overflow_handler_is_injected() {
    let hits = Rc::new(RefCell::new(0));
    let counter = hits.clone();
    let mut c = HotbarCollection::new(Box::new(FixedCatalog))
        .with_overflow_handler(move || *counter.borrow_mut() += 1);
    c.from_model(HotbarStoreModel {
        hotbars: vec![hotbar_model(
            "full",
            "Full",
            (0..HOTBAR_CAPACITY).map(|i| pin(&format!("e{i}"))).collect(),
        )],
        active_hotbar_id: None,
    });

    c.add_to_hotbar(SlotItem::new(EntityRef::new("extra", "Extra")), None)
        .unwrap();

    assert_eq!(*hits.borrow(), 1);
    assert!(!c.is_added_to_active("extra"));
}

#[test]
fn test_rename_and_select_by_name() {
    let mut c = loaded(HotbarStoreModel::default());
    let id = c.add(NewHotbar::named("Ops"), false).unwrap();

    c.rename(&id, "Operations").unwrap();
    c.set_active_by_name("Operations").unwrap();
    assert_eq!(c.active_id(), Some(id.as_str()));

    assert!(c.rename(&id, "  ").is_err());
    assert!(matches!(
        c.set_active("missing"),
        Err(HotbarError::HotbarNotFound { .. })
    ));
}
