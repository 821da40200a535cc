//! Lenient decoding of persisted record lists
//!
//! One malformed record must not prevent the rest of a list from loading:
//! each element is decoded on its own, failures are logged and skipped.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Deserialize a list, dropping elements that fail to decode
///
/// `null` or a missing field yields an empty list. Use with
/// `#[serde(default, deserialize_with = "deserialize_lenient")]`.
pub fn deserialize_lenient<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;

    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<T>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    component = module_path!(),
                    index,
                    error = %e,
                    "skipping malformed record"
                );
                None
            }
        })
        .collect())
}

/// Deserialize a positional list of optional records
///
/// Positions are kept: `null` and elements that fail to decode both become
/// `None` at their index, so one bad slot never takes its neighbours down.
/// A value that is not a list at all yields an empty list.
pub fn deserialize_lenient_slots<'de, D, T>(deserializer: D) -> Result<Vec<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(values) => values,
        serde_json::Value::Null => Vec::new(),
        other => {
            tracing::warn!(
                component = module_path!(),
                value = %other,
                "expected a list of slots, treating as empty"
            );
            Vec::new()
        }
    };

    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            if value.is_null() {
                return None;
            }
            serde_json::from_value::<T>(value)
                .map_err(|e| {
                    tracing::warn!(
                        component = module_path!(),
                        slot_index = index,
                        error = %e,
                        "clearing malformed slot"
                    );
                })
                .ok()
        })
        .collect())
}
