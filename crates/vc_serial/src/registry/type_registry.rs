use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::TypeId;

use crate::Tagged;
use crate::hash::{HashMap, TypeIdMap};
use crate::registry::{Alias, Registration, RegistryError, TypePath};

// -----------------------------------------------------------------------------
// TypeRegistry

/// A registry of taggable types.
///
/// This struct is the central store for going from a type to its name and back.
/// [Registering] a type generates a canonical name `{module_path}/{TypeIdent}` plus
/// one shortened name per matching [alias], and indexes the type under all of them.
///
/// The shortest name is the *current* name, the one written as a type tag.
/// Every name can be used to [make] a new instance.
///
/// Names are generated when the type is registered, so aliases must be added first.
/// An alias added afterwards does not rename types that are already registered.
///
/// # Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use vc_serial::{TypeRegistry, derive::Tagged};
///
/// #[derive(Tagged, Serialize, Deserialize, Default, Debug, PartialEq)]
/// pub struct Widget {
///     name: String,
/// }
///
/// let mut registry = TypeRegistry::new();
/// registry.add_alias::<Widget>("w").unwrap();
/// registry.register::<Widget>().unwrap();
///
/// assert_eq!(registry.name_for_type::<Widget>().unwrap(), "[w]Widget");
///
/// let made = registry.make("[w]Widget").unwrap();
/// assert_eq!(made.take::<Widget>().unwrap(), Widget::default());
/// ```
///
/// [Registering]: TypeRegistry::register
/// [alias]: TypeRegistry::add_alias
/// [make]: TypeRegistry::make
pub struct TypeRegistry {
    aliases: Vec<Alias>,
    by_name: HashMap<String, TypeId>,
    by_type: TypeIdMap<Registration>,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a empty [`TypeRegistry`].
    #[inline]
    pub const fn new() -> Self {
        Self {
            aliases: Vec::new(),
            by_name: HashMap::with_hasher(crate::hash::FixedHashState),
            by_type: TypeIdMap::with_hasher(crate::hash::NoOpHashState),
        }
    }

    // -------------------------------------------------------------------------
    // Aliases

    /// Binds `alias` to the module path of `T`.
    ///
    /// Only types registered afterwards get names using the alias.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::AliasConflict`] if the alias is already bound.
    /// - [`RegistryError::Unnameable`] if `T` has no module path (e.g. a primitive).
    pub fn add_alias<T: TypePath>(&mut self, alias: impl Into<String>) -> Result<(), RegistryError> {
        let alias = alias.into();
        if self.aliases.iter().any(|bound| bound.alias() == alias) {
            return Err(RegistryError::AliasConflict { alias });
        }

        let module_path = T::module_path().ok_or(RegistryError::Unnameable {
            type_path: T::type_path(),
        })?;

        log::debug!("alias `{alias}` bound to `{module_path}`");
        self.aliases.push(Alias::new(alias, module_path));
        Ok(())
    }

    /// Binds `alias` to the module path of the example's type.
    ///
    /// See [`add_alias`](Self::add_alias) for more details.
    #[inline]
    pub fn add_alias_by_val<T: TypePath>(
        &mut self,
        alias: impl Into<String>,
        _: &T,
    ) -> Result<(), RegistryError> {
        self.add_alias::<T>(alias)
    }

    /// Aliases in the order they were added.
    #[inline]
    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    // -------------------------------------------------------------------------
    // Registration

    /// Returns the canonical name of `T` and every name derived from the current aliases.
    ///
    /// The canonical name comes first. The returned index is the current name,
    /// the shortest one, favoring later aliases on equal length.
    fn generate_names<T: TypePath>(&self) -> Result<(Vec<String>, usize), RegistryError> {
        let module_path = T::module_path().ok_or(RegistryError::Unnameable {
            type_path: T::type_path(),
        })?;

        let canonical = format!("{module_path}/{}", T::type_ident());
        let mut names = Vec::with_capacity(self.aliases.len() + 1);
        names.extend(self.aliases.iter().filter_map(|alias| alias.shorten(&canonical)));
        names.insert(0, canonical);

        let mut current = 0;
        for (index, name) in names.iter().enumerate().skip(1) {
            if name.len() <= names[current].len() {
                current = index;
            }
        }

        Ok((names, current))
    }

    /// Registers the type `T`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::AlreadyRegistered`] if `T` has been registered.
    /// - [`RegistryError::Unnameable`] if `T` has no module path.
    /// - [`RegistryError::Private`] if `T` is not declared `pub`.
    /// - [`RegistryError::NameTaken`] if one of the generated names belongs to another type.
    ///
    /// Nothing is changed when an error is returned.
    pub fn register<T: Tagged + TypePath + Default>(&mut self) -> Result<(), RegistryError> {
        let type_path = T::type_path();
        if self.by_type.contains_key(&TypeId::of::<T>()) {
            return Err(RegistryError::AlreadyRegistered { type_path });
        }
        if !T::is_exported() {
            return Err(RegistryError::Private { type_path });
        }

        let (names, current) = self.generate_names::<T>()?;

        if let Some((name, id)) = names
            .iter()
            .find_map(|name| self.by_name.get(name).map(|id| (name, id)))
        {
            return Err(RegistryError::NameTaken {
                name: name.clone(),
                type_path,
                owner: self.by_type[id].type_path(),
            });
        }

        let current_name = names[current].clone();
        log::debug!("registered `{type_path}` as `{current_name}`");

        for name in &names {
            self.by_name.insert(name.clone(), TypeId::of::<T>());
        }
        self.by_type
            .insert(TypeId::of::<T>(), Registration::of::<T>(current_name, names));
        Ok(())
    }

    /// Registers the type of the example.
    ///
    /// See [`register`](Self::register) for more details.
    #[inline]
    pub fn register_by_val<T: Tagged + TypePath + Default>(&mut self, _: &T) -> Result<(), RegistryError> {
        self.register::<T>()
    }

    /// Allows instances of `T` to be converted into `Box<U>`.
    ///
    /// `U` is usually a trait object implemented by several registered types,
    /// so that values made by name can be used as that trait.
    ///
    /// ```
    /// # use serde::{Deserialize, Serialize};
    /// # use vc_serial::{TypeRegistry, derive::Tagged};
    /// trait Shape {
    ///     fn area(&self) -> f64;
    /// }
    ///
    /// #[derive(Tagged, Serialize, Deserialize, Default)]
    /// pub struct Square {
    ///     side: f64,
    /// }
    ///
    /// impl Shape for Square {
    ///     fn area(&self) -> f64 {
    ///         self.side * self.side
    ///     }
    /// }
    ///
    /// let mut registry = TypeRegistry::new();
    /// registry.register::<Square>().unwrap();
    /// registry.register_cast::<Square, dyn Shape>(|square| square).unwrap();
    ///
    /// let name = registry.name_for_type::<Square>().unwrap();
    /// let shape: Box<dyn Shape> = registry.make_as::<dyn Shape>(&name).unwrap();
    /// assert_eq!(shape.area(), 0.0);
    /// ```
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotRegistered`] if `T` has not been registered.
    pub fn register_cast<T: Tagged + TypePath, U: ?Sized + 'static>(
        &mut self,
        cast: fn(Box<T>) -> Box<U>,
    ) -> Result<(), RegistryError> {
        match self.by_type.get_mut(&TypeId::of::<T>()) {
            Some(registration) => {
                registration.insert_cast(cast);
                Ok(())
            }
            None => Err(RegistryError::NotRegistered(T::type_path().into())),
        }
    }

    /// Registers every type marked `#[tagged(auto_register)]` that is not registered yet.
    ///
    /// Returns the number of newly registered types. Types whose names collide
    /// with existing registrations are skipped with a warning.
    ///
    /// Aliases added before the call are applied as usual.
    #[cfg(feature = "auto_register")]
    pub fn auto_register(&mut self) -> usize {
        crate::registry::auto_register::register_all(self)
    }

    /// Removes all aliases and registrations.
    pub fn clear(&mut self) {
        log::debug!(
            "clearing {} aliases and {} registrations",
            self.aliases.len(),
            self.by_type.len()
        );
        self.aliases.clear();
        self.by_name.clear();
        self.by_type.clear();
    }

    // -------------------------------------------------------------------------
    // Lookup

    /// Whether the type with given [`TypeId`] has been registered in this registry.
    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.by_type.contains_key(&type_id)
    }

    /// Returns the [`Registration`] of the type with the given [`TypeId`].
    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&Registration> {
        self.by_type.get(&type_id)
    }

    /// Returns the [`Registration`] of the type with the given name, which
    /// may be the canonical name or any alias-derived one.
    pub fn get_with_name(&self, name: &str) -> Option<&Registration> {
        match self.by_name.get(name) {
            Some(id) => self.get(*id),
            None => None,
        }
    }

    /// Returns an iterator over the registrations.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Registration> {
        self.by_type.values()
    }

    /// Number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    /// Number of names across all registered types.
    #[inline]
    pub fn name_count(&self) -> usize {
        self.by_name.len()
    }

    /// Returns the current name of the item's type.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotRegistered`] if the type has not been registered.
    pub fn name_for(&self, item: &dyn Tagged) -> Result<String, RegistryError> {
        match self.get(item.ty_id()) {
            Some(registration) => Ok(registration.current_name().into()),
            None => Err(RegistryError::NotRegistered(item.reflect_type_path().into())),
        }
    }

    /// Like [`name_for`](Self::name_for), for an optional item.
    ///
    /// # Errors
    ///
    /// [`RegistryError::ItemIsNil`] for [`None`].
    #[inline]
    pub fn name_for_opt(&self, item: Option<&dyn Tagged>) -> Result<String, RegistryError> {
        self.name_for(item.ok_or(RegistryError::ItemIsNil)?)
    }

    /// Returns the current name of `T`.
    pub fn name_for_type<T: TypePath>(&self) -> Result<String, RegistryError> {
        match self.get(TypeId::of::<T>()) {
            Some(registration) => Ok(registration.current_name().into()),
            None => Err(RegistryError::NotRegistered(T::type_path().into())),
        }
    }

    /// Creates a default instance of the type registered under `name`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::NotRegistered`] if no type has that name.
    pub fn make(&self, name: &str) -> Result<Box<dyn Tagged>, RegistryError> {
        match self.get_with_name(name) {
            Some(registration) => Ok(registration.make()),
            None => Err(RegistryError::NotRegistered(name.into())),
        }
    }

    /// Converts an erased value into `Box<U>` with a cast added by
    /// [`register_cast`](Self::register_cast).
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotRegistered`] if the value's type has not been registered.
    /// - [`RegistryError::NoCast`] if no cast to `U` was added for it.
    pub fn cast<U: ?Sized + 'static>(&self, value: Box<dyn Tagged>) -> Result<Box<U>, RegistryError> {
        match self.get(value.ty_id()) {
            Some(registration) => registration.cast::<U>(value),
            None => Err(RegistryError::NotRegistered(value.reflect_type_path().into())),
        }
    }

    /// [`make`](Self::make) followed by [`cast`](Self::cast).
    pub fn make_as<U: ?Sized + 'static>(&self, name: &str) -> Result<Box<U>, RegistryError> {
        self.cast::<U>(self.make(name)?)
    }
}

impl core::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("aliases", &self.aliases)
            .field("types", &self.by_type.values().collect::<Vec<_>>())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
