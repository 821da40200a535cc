//! In-memory event recorder for tests
//!
//! Soft failures (out-of-range pins, unknown hotbar ids, malformed slots) are
//! logged rather than returned, so tests assert on what was recorded here.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// One recorded event: its level plus every field rendered as text
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn op(&self) -> Option<&str> {
        self.field("op")
    }

    /// `start`, `end` or `end_error` for op macro events
    pub fn event(&self) -> Option<&str> {
        self.field("event")
    }

    pub fn message(&self) -> Option<&str> {
        self.field("message")
    }

    fn is(&self, op: &str, event: &str) -> bool {
        self.op() == Some(op) && self.event() == Some(event)
    }
}

struct TextFields(BTreeMap<String, String>);

impl Visit for TextFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    // Numbers and bools land here too; their Debug form is the plain value
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

type Buffer = Arc<Mutex<Vec<CapturedEvent>>>;

struct Recorder(Buffer);

impl<S: Subscriber> Layer<S> for Recorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = TextFields(BTreeMap::new());
        event.record(&mut fields);
        let captured = CapturedEvent {
            level: *event.metadata().level(),
            fields: fields.0,
        };
        if let Ok(mut buffer) = self.0.lock() {
            buffer.push(captured);
        }
    }
}

/// Shared view of everything recorded so far
#[derive(Clone)]
pub struct TestCapture {
    buffer: Buffer,
}

impl TestCapture {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.buffer.lock().map(|b| b.clone()).unwrap_or_default()
    }

    pub fn count_events(&self, predicate: impl Fn(&CapturedEvent) -> bool) -> usize {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    /// First event emitted by op macro `op` with the given event name
    pub fn find_op_event(&self, op: &str, event: &str) -> Option<CapturedEvent> {
        self.events().into_iter().find(|e| e.is(op, event))
    }

    /// # Panics
    ///
    /// Panics when no `op`/`event` pair was recorded.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let seen = self.events();
        assert!(
            seen.iter().any(|e| e.is(op, event)),
            "no {}/{} event among {} recorded",
            op,
            event,
            seen.len()
        );
    }

    pub fn clear(&self) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.clear();
        }
    }
}

static CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the recorder as the global subscriber (first call only)
///
/// All tests of one binary share the buffer; match on field values unique to
/// the test.
///
/// ```
/// use hotdeck_core::logging_facility::test_capture::init_test_capture;
/// use hotdeck_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_capture_op");
/// capture.assert_event_exists("doc_capture_op", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    CAPTURE
        .get_or_init(|| {
            let buffer = Buffer::default();
            tracing_subscriber::registry()
                .with(Recorder(Arc::clone(&buffer)))
                .try_init()
                .ok();
            TestCapture { buffer }
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_read_fields() {
        let mut fields = BTreeMap::new();
        fields.insert("op".to_string(), "store_load".to_string());
        fields.insert("event".to_string(), "end".to_string());
        fields.insert("uid".to_string(), "cat".to_string());
        let event = CapturedEvent {
            level: Level::INFO,
            fields,
        };

        assert!(event.is("store_load", "end"));
        assert_eq!(event.field("uid"), Some("cat"));
        assert_eq!(event.message(), None);
    }
}
