#![allow(clippy::unwrap_used, clippy::expect_used)]

// Soft failures are logged instead of returned; assert on the captured events

use hotdeck_core::logging_facility::test_capture::init_test_capture;
use hotdeck_core::{
    log_op_end, log_op_error, log_op_start, AddOutcome, EntityRef, Hotbar, HotbarCollection,
    HotbarError, HotbarStoreModel, SlotItem, StaticCatalog,
};
use hotdeck_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use tracing::Level;

#[test]
fn test_out_of_range_add_logs_uid_and_index() {
    let capture = init_test_capture();
    let mut hotbar = Hotbar::new("log-h1", "Default");

    let outcome = hotbar
        .add_item(
            SlotItem::new(EntityRef::new("uid-out-of-range", "x")),
            Some(40),
            &|| {},
        )
        .unwrap();

    assert_eq!(outcome, AddOutcome::OutOfRange);
    let found = capture.count_events(|e| {
        e.level == Level::ERROR
            && e.field("uid") == Some("uid-out-of-range")
            && e.field("slot_index") == Some("40")
    });
    assert_eq!(found, 1);
}

#[test]
fn test_remove_unknown_hotbar_logs_warning() {
    let capture = init_test_capture();
    let mut c = HotbarCollection::new(Box::new(StaticCatalog::default()));
    c.from_model(HotbarStoreModel::default());

    assert!(!c.remove("log-missing-hotbar").unwrap());

    let found = capture.count_events(|e| {
        e.level == Level::WARN && e.field("hotbar_id") == Some("log-missing-hotbar")
    });
    assert_eq!(found, 1);
}

#[test]
fn test_op_macros_emit_canonical_events() {
    let capture = init_test_capture();
    let op = "test_op_macros_unique_1";

    log_op_start!(op, store = "s1");
    log_op_end!(op, duration_ms = 42);
    log_op_error!(
        op,
        HotbarError::HotbarNotFound {
            hotbar_id: "h".to_string()
        },
        duration_ms = 3
    );

    capture.assert_event_exists(op, EVENT_START);
    capture.assert_event_exists(op, EVENT_END);
    capture.assert_event_exists(op, EVENT_END_ERROR);

    let error_event = capture
        .find_op_event(op, EVENT_END_ERROR)
        .expect("error event");
    assert_eq!(error_event.field("err.code"), Some("ERR_NOT_FOUND"));
    assert_eq!(error_event.field("duration_ms"), Some("3"));
    assert_eq!(
        error_event.message(),
        Some("[ERR_NOT_FOUND]: Hotbar not found: h (hotbar_id: h)")
    );
}
