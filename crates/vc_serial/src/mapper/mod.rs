//! Conversion between tagged values and attribute maps.
//!
//! ## Menu
//!
//! - [`AttrMap`]: A generic string-keyed attribute map.
//! - [`TYPE_FIELD`]: The reserved key holding the type name.
//! - [`Mapper`]: Converts values to tagged maps and back, using a registry.
//! - [`Mappable`]: Custom field mapping for container types.
//! - [`Recursive`] and [`WithMapper`]: A mapper slot for [`Mappable`] values
//!   with polymorphic fields.
//! - [`push_fields`] and [`pull_fields`]: Helpers for [`Mappable`] implementations.

// -----------------------------------------------------------------------------
// Modules

mod mappable;
mod recursive;

// -----------------------------------------------------------------------------
// Exports

pub use mappable::{Mappable, pull_fields, push_fields};
pub use recursive::{MapperGuard, Recursive, WithMapper};

use alloc::boxed::Box;
use alloc::string::String;

use serde_json::Value;

use crate::registry::{RegistryArc, global};
use crate::{SerialError, Tagged};

/// A generic attribute map, the intermediate form of every tagged value.
pub type AttrMap = serde_json::Map<String, Value>;

/// The reserved key holding the type name in an [`AttrMap`].
///
/// A field with the same name is overwritten.
pub const TYPE_FIELD: &str = "<type>";

// -----------------------------------------------------------------------------
// Mapper

/// Converts tagged values to attribute maps and back.
///
/// The map of a value holds its fields plus [`TYPE_FIELD`], set to the value's
/// current name in the registry. Reading a map makes a fresh instance of the
/// named type and fills it from the remaining entries.
///
/// # Examples
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use serde_json::json;
/// use vc_serial::{Mapper, RegistryArc, TYPE_FIELD, derive::Tagged};
///
/// #[derive(Tagged, Serialize, Deserialize, Default, Debug, PartialEq)]
/// pub struct Widget {
///     name: String,
/// }
///
/// let registry = RegistryArc::default();
/// registry.register::<Widget>().unwrap();
/// let mapper = Mapper::new(registry);
///
/// let map = mapper.to_map(&Widget { name: "x".into() }).unwrap();
/// assert_eq!(map["name"], json!("x"));
/// assert!(map[TYPE_FIELD].as_str().unwrap().ends_with("/Widget"));
///
/// let back = mapper.from_map(&map).unwrap();
/// assert_eq!(back.downcast_ref::<Widget>().unwrap().name, "x");
/// ```
#[derive(Clone, Debug)]
pub struct Mapper {
    registry: RegistryArc,
}

impl Mapper {
    #[inline]
    pub fn new(registry: RegistryArc) -> Self {
        Self { registry }
    }

    /// A mapper over the [global](crate::registry::global) registry.
    #[inline]
    pub fn global() -> Self {
        Self::new(global())
    }

    #[inline]
    pub fn registry(&self) -> &RegistryArc {
        &self.registry
    }

    /// Converts `item` to a tagged map.
    ///
    /// [`Mappable`] items fill the map themselves, others are encoded through serde.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotRegistered`] if the item's type is unknown.
    /// - [`SerialError::NotSerializable`] if the item has neither a serde encoding
    ///   nor a [`Mappable`] implementation.
    /// - [`SerialError::NotAComposite`] if the serde encoding is not a map.
    ///
    /// [`RegistryError::NotRegistered`]: crate::RegistryError::NotRegistered
    pub fn to_map(&self, item: &dyn Tagged) -> Result<AttrMap, SerialError> {
        let name = self.registry.name_for(item)?;

        // The tag is inserted first so it leads the map even when key order is preserved.
        let mut map = AttrMap::new();
        map.insert(TYPE_FIELD.into(), Value::String(name.clone()));

        match item.as_mappable() {
            Some(mappable) => {
                let _guard = item.as_recursive().map(|r| r.attach(self.clone()));
                mappable.push_to_map(&mut map)?;
            }
            None => {
                let serialize = item.as_serialize().ok_or(SerialError::NotSerializable {
                    type_path: item.reflect_type_path(),
                })?;
                match serde_json::to_value(serialize).map_err(SerialError::encode)? {
                    Value::Object(fields) => map.extend(fields),
                    _ => {
                        return Err(SerialError::NotAComposite {
                            type_path: item.reflect_type_path(),
                        });
                    }
                }
            }
        }

        map.insert(TYPE_FIELD.into(), Value::String(name));
        Ok(map)
    }

    /// Like [`to_map`](Self::to_map), for an optional item.
    ///
    /// # Errors
    ///
    /// [`RegistryError::ItemIsNil`](crate::RegistryError::ItemIsNil) for [`None`].
    #[inline]
    pub fn to_map_opt(&self, item: Option<&dyn Tagged>) -> Result<AttrMap, SerialError> {
        self.to_map(item.ok_or(crate::RegistryError::ItemIsNil)?)
    }

    /// Makes a value of the type named by the map's tag and fills it from the map.
    ///
    /// # Errors
    ///
    /// - [`SerialError::NoTypeTag`] if the map has no [`TYPE_FIELD`].
    /// - [`SerialError::BadTypeTag`] if the tag is not a string.
    /// - [`RegistryError::NotRegistered`] if the name is unknown.
    /// - [`SerialError::Decode`] if the entries do not match the type.
    ///
    /// [`RegistryError::NotRegistered`]: crate::RegistryError::NotRegistered
    pub fn from_map(&self, map: &AttrMap) -> Result<Box<dyn Tagged>, SerialError> {
        let name = match map.get(TYPE_FIELD) {
            Some(Value::String(name)) => name,
            Some(other) => return Err(SerialError::BadTypeTag(other.to_string())),
            None => return Err(SerialError::NoTypeTag),
        };

        let mut item = self.registry.make(name)?;
        self.attached(&mut *item, |item| match item.as_mappable_mut() {
            Some(mappable) => mappable.pull_from_map(map),
            None => {
                let mut entries = map.clone();
                entries.remove(TYPE_FIELD);
                let mut de = <dyn erased_serde::Deserializer>::erase(Value::Object(entries));
                item.decode(&mut de).map_err(SerialError::decode)
            }
        })?;
        Ok(item)
    }

    /// [`from_map`](Self::from_map) followed by a registry cast.
    ///
    /// # Errors
    ///
    /// See [`from_map`](Self::from_map) and [`TypeRegistry::cast`](crate::TypeRegistry::cast).
    pub fn from_map_as<U: ?Sized + 'static>(&self, map: &AttrMap) -> Result<Box<U>, SerialError> {
        let item = self.from_map(map)?;
        Ok(self.registry.read().cast::<U>(item)?)
    }

    /// Runs `f` on `item` with this mapper attached, if the item is [`Recursive`].
    pub(crate) fn attached<R>(
        &self,
        item: &mut dyn Tagged,
        f: impl FnOnce(&mut dyn Tagged) -> R,
    ) -> R {
        let _guard = item.as_recursive().map(|r| r.attach(self.clone()));
        f(item)
    }
}

// -----------------------------------------------------------------------------
// Tests
