use serde_core::Serialize;
use serde_core::de::DeserializeOwned;
use serde_json::Value;

use crate::SerialError;
use crate::mapper::{AttrMap, TYPE_FIELD};

// -----------------------------------------------------------------------------
// Mappable

/// Custom conversion between a value and its attribute map.
///
/// Implement this when serde's own encoding is not what should be written,
/// typically when a field holds a polymorphic value (`Box<dyn Trait>`) that must
/// be written with its own type tag. Mark the type `#[tagged(mappable)]` so the
/// derive routes through it.
///
/// [`push_fields`] and [`pull_fields`] handle the plain fields, so an
/// implementation only deals with the polymorphic ones.
///
/// The `"<type>"` key is managed by the [`Mapper`](crate::Mapper): it is
/// written after `push_to_map` and present (but ignorable) in `pull_from_map`.
pub trait Mappable {
    /// Writes the fields of `self` into `map`.
    fn push_to_map(&self, map: &mut AttrMap) -> Result<(), SerialError>;

    /// Reads the fields of `self` from `map`.
    fn pull_from_map(&mut self, map: &AttrMap) -> Result<(), SerialError>;
}

// -----------------------------------------------------------------------------
// Helpers

/// Encodes `fields` and merges the resulting entries into `map`.
///
/// Existing entries with the same keys are replaced.
///
/// # Errors
///
/// - [`SerialError::Encode`] if `fields` fails to serialize.
/// - [`SerialError::Mapping`] if `fields` does not encode to a map.
pub fn push_fields<T: Serialize + ?Sized>(fields: &T, map: &mut AttrMap) -> Result<(), SerialError> {
    match serde_json::to_value(fields).map_err(SerialError::encode)? {
        Value::Object(entries) => {
            map.extend(entries);
            Ok(())
        }
        other => Err(SerialError::mapping(format_args!(
            "fields encode to `{other}` instead of a map"
        ))),
    }
}

/// Decodes a `T` from the entries of `map`, ignoring the type tag.
///
/// # Errors
///
/// [`SerialError::Decode`] if the entries do not match `T`.
pub fn pull_fields<T: DeserializeOwned>(map: &AttrMap) -> Result<T, SerialError> {
    let mut entries = map.clone();
    entries.remove(TYPE_FIELD);
    serde_json::from_value(Value::Object(entries)).map_err(SerialError::decode)
}

// -----------------------------------------------------------------------------
// Tests
