use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId};

use crate::Tagged;
use crate::hash::TypeIdMap;
use crate::registry::{RegistryError, TypePath};

// -----------------------------------------------------------------------------
// Casts

/// Boxed conversion from an erased value into `Box<U>`, where `U` is
/// usually a trait object such as `dyn Actor`.
type CastFn<U> = Box<dyn Fn(Box<dyn Any>) -> Result<Box<U>, Box<dyn Any>> + Send + Sync>;

// -----------------------------------------------------------------------------
// Registration

/// The record kept for every registered type.
///
/// Holds the generated names and a constructor, which is what [`TypeRegistry::make`]
/// calls instead of instantiating a type by reflection.
///
/// [`TypeRegistry::make`]: crate::TypeRegistry::make
pub struct Registration {
    type_id: TypeId,
    type_path: &'static str,
    current_name: String,
    all_names: Vec<String>,
    make: fn() -> Box<dyn Tagged>,
    casts: TypeIdMap<Box<dyn Any + Send + Sync>>,
}

impl Registration {
    pub(crate) fn of<T: Tagged + TypePath + Default>(
        current_name: String,
        all_names: Vec<String>,
    ) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_path: T::type_path(),
            current_name,
            all_names,
            make: || -> Box<dyn Tagged> { Box::new(T::default()) },
            casts: TypeIdMap::default(),
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.type_path
    }

    /// The canonical `{module_path}/{TypeIdent}` name, always the first of [`names`](Self::names).
    #[inline]
    pub fn canonical_name(&self) -> &str {
        &self.all_names[0]
    }

    /// The shortest name, used as the type tag when serializing.
    #[inline]
    pub fn current_name(&self) -> &str {
        &self.current_name
    }

    /// Every name that resolves to this type.
    #[inline]
    pub fn names(&self) -> &[String] {
        &self.all_names
    }

    /// Creates a default instance of the registered type.
    #[inline]
    pub fn make(&self) -> Box<dyn Tagged> {
        (self.make)()
    }

    pub(crate) fn insert_cast<T: Tagged, U: ?Sized + 'static>(&mut self, cast: fn(Box<T>) -> Box<U>) {
        let cast: CastFn<U> = Box::new(move |value| value.downcast::<T>().map(cast));
        self.casts.insert(TypeId::of::<U>(), Box::new(cast));
    }

    #[inline]
    pub fn has_cast<U: ?Sized + 'static>(&self) -> bool {
        self.casts.contains_key(&TypeId::of::<U>())
    }

    pub(crate) fn cast<U: ?Sized + 'static>(
        &self,
        value: Box<dyn Tagged>,
    ) -> Result<Box<U>, RegistryError> {
        let no_cast = || RegistryError::NoCast {
            type_path: self.type_path,
            target: core::any::type_name::<U>(),
        };

        let cast = self
            .casts
            .get(&TypeId::of::<U>())
            .and_then(|cast| cast.downcast_ref::<CastFn<U>>())
            .ok_or_else(no_cast)?;

        cast(value.into_any()).map_err(|_| no_cast())
    }
}

impl core::fmt::Debug for Registration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registration")
            .field("type_path", &self.type_path)
            .field("current_name", &self.current_name)
            .field("all_names", &self.all_names)
            .finish_non_exhaustive()
    }
}
