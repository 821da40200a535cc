//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Store identifiers
pub const FIELD_STORE: &str = "store";
pub const FIELD_SCHEMA_VERSION: &str = "schema_version";
pub const FIELD_MIGRATION_VERSION: &str = "migration_version";

// Hotbar identifiers
pub const FIELD_HOTBAR_ID: &str = "hotbar_id";
pub const FIELD_UID: &str = "uid";
pub const FIELD_SLOT_INDEX: &str = "slot_index";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

// Operation names shared between crates
pub const OP_STORE_LOAD: &str = "store_load";
pub const OP_STORE_FLUSH: &str = "store_flush";
pub const OP_STORE_RELOAD: &str = "store_reload";
pub const OP_MIGRATE: &str = "migrate";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_accessibility() {
        assert!(!FIELD_COMPONENT.is_empty());
        assert!(!FIELD_OP.is_empty());
        assert!(!FIELD_STORE.is_empty());
        assert!(!EVENT_START.is_empty());
        assert!(!EVENT_END.is_empty());
        assert!(!EVENT_END_ERROR.is_empty());
    }

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_op_names_are_distinct() {
        let ops = [OP_STORE_LOAD, OP_STORE_FLUSH, OP_STORE_RELOAD, OP_MIGRATE];
        for (i, a) in ops.iter().enumerate() {
            for b in &ops[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
