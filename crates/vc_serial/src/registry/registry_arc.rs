use alloc::boxed::Box;
use alloc::string::String;
use std::sync::{Arc, LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::registry::{RegistryError, TypePath, TypeRegistry};
use crate::Tagged;

// -----------------------------------------------------------------------------
// RegistryArc

/// A shared [`TypeRegistry`], cheap to clone and safe to use from several threads.
///
/// Lookups take a read lock, so concurrent serialization does not contend.
/// Lock poisoning is ignored: a failed registration never leaves the registry
/// in a partial state.
#[derive(Clone, Default)]
pub struct RegistryArc {
    /// The wrapped [`TypeRegistry`].
    pub internal: Arc<RwLock<TypeRegistry>>,
}

impl RegistryArc {
    /// Wraps an existing registry.
    #[inline]
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }

    /// Takes a read lock on the underlying [`TypeRegistry`].
    pub fn read(&self) -> RwLockReadGuard<'_, TypeRegistry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`TypeRegistry`].
    pub fn write(&self) -> RwLockWriteGuard<'_, TypeRegistry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`TypeRegistry::add_alias`].
    #[inline]
    pub fn add_alias<T: TypePath>(&self, alias: impl Into<String>) -> Result<(), RegistryError> {
        self.write().add_alias::<T>(alias)
    }

    /// See [`TypeRegistry::register`].
    #[inline]
    pub fn register<T: Tagged + TypePath + Default>(&self) -> Result<(), RegistryError> {
        self.write().register::<T>()
    }

    /// See [`TypeRegistry::name_for`].
    #[inline]
    pub fn name_for(&self, item: &dyn Tagged) -> Result<String, RegistryError> {
        self.read().name_for(item)
    }

    /// See [`TypeRegistry::make`].
    #[inline]
    pub fn make(&self, name: &str) -> Result<Box<dyn Tagged>, RegistryError> {
        self.read().make(name)
    }

    /// Returns `true` if both handles share the same registry.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.internal, &other.internal)
    }
}

impl core::fmt::Debug for RegistryArc {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&*self.read(), f)
    }
}

// -----------------------------------------------------------------------------
// Global

static GLOBAL: LazyLock<RwLock<RegistryArc>> = LazyLock::new(RwLock::default);

/// A handle to the process-wide registry, created empty on first use.
///
/// Every caller gets a handle to the same registry until [`set_global`]
/// replaces it. Libraries that need isolation should create their own
/// [`RegistryArc`] instead.
pub fn global() -> RegistryArc {
    GLOBAL.read().unwrap_or_else(PoisonError::into_inner).clone()
}

/// Replaces the process-wide registry, returning the previous one.
///
/// Handles obtained from [`global`] before the call keep the registry they
/// were created with.
pub fn set_global(registry: RegistryArc) -> RegistryArc {
    let mut global = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    log::debug!("replacing the global registry");
    core::mem::replace(&mut *global, registry)
}

// -----------------------------------------------------------------------------
// Tests
