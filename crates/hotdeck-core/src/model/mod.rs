pub mod entity_ref;
pub mod lenient;

pub use entity_ref::{EntityRef, SlotItem};
pub use lenient::{deserialize_lenient, deserialize_lenient_slots};
