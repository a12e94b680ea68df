use alloc::boxed::Box;
use core::any::{Any, TypeId};

use crate::mapper::{Mappable, Recursive};

// -----------------------------------------------------------------------------
// Tagged

/// An object-safe view of a registrable value.
///
/// This is what the registry hands out from [`TypeRegistry::make`] and what the
/// mapper, wrapper and converter operate on. It replaces runtime reflection:
/// every capability the serialization layer needs is a method here.
///
/// Usually implemented with [`#[derive(Tagged)]`](crate::derive::Tagged), which also
/// implements [`TypePath`]:
///
/// - Plain types must implement `Serialize` and `Deserialize`; they are
///   encoded through serde and decoded by replacing `self` with a fresh value.
/// - `#[tagged(mappable)]` types implement [`Mappable`] instead; they are
///   decoded by reading an [`AttrMap`] and pulling fields from it.
///   Add `serialize` (`#[tagged(mappable, serialize)]`) when the type also
///   implements `Serialize`.
/// - A field marked `#[tagged(mapper)]` (a [`WithMapper`]) makes the value
///   [`Recursive`], so it can reach a mapper while its fields are pulled or pushed.
///
/// # Examples
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use vc_serial::{Tagged, TypeRegistry, derive::Tagged};
///
/// #[derive(Tagged, Serialize, Deserialize, Default, Debug, PartialEq)]
/// pub struct Widget {
///     name: String,
/// }
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<Widget>().unwrap();
///
/// let made: Box<dyn Tagged> = registry.make(&registry.name_for_type::<Widget>().unwrap()).unwrap();
/// assert_eq!(made.downcast_ref::<Widget>(), Some(&Widget::default()));
/// ```
///
/// [`TypeRegistry::make`]: crate::TypeRegistry::make
/// [`TypePath`]: crate::TypePath
/// [`AttrMap`]: crate::AttrMap
/// [`WithMapper`]: crate::WithMapper
pub trait Tagged: Any + Send + Sync {
    /// The [`TypeId`] of the concrete type, not of a box around it.
    fn ty_id(&self) -> TypeId;

    /// See [`TypePath::type_path`](crate::TypePath::type_path).
    fn reflect_type_path(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// The serde encoding of the value, if the type has one.
    fn as_serialize(&self) -> Option<&dyn erased_serde::Serialize>;

    /// Overwrites `self` with a value read from `deserializer`.
    ///
    /// The instance is usually a fresh one from [`TypeRegistry::make`](crate::TypeRegistry::make).
    /// On error its state is unspecified and it should be discarded.
    fn decode<'de>(
        &mut self,
        deserializer: &mut dyn erased_serde::Deserializer<'de>,
    ) -> Result<(), erased_serde::Error>;

    /// Custom field mapping, see [`Mappable`].
    #[inline]
    fn as_mappable(&self) -> Option<&dyn Mappable> {
        None
    }

    #[inline]
    fn as_mappable_mut(&mut self) -> Option<&mut dyn Mappable> {
        None
    }

    /// The per-instance mapper slot, see [`Recursive`].
    #[inline]
    fn as_recursive(&self) -> Option<&dyn Recursive> {
        None
    }
}

impl dyn Tagged {
    /// Returns `true` if the underlying value is of type `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.ty_id() == TypeId::of::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Takes the value out of the box, returning the box back on a type mismatch.
    pub fn take<T: Any>(self: Box<Self>) -> Result<T, Box<Self>> {
        if self.is::<T>() {
            match self.into_any().downcast::<T>() {
                Ok(value) => Ok(*value),
                // `is` has been checked, the `Any` box holds a `T`.
                Err(_) => unreachable!(),
            }
        } else {
            Err(self)
        }
    }
}

impl core::fmt::Debug for dyn Tagged {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Tagged")
            .field(&self.reflect_type_path())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
