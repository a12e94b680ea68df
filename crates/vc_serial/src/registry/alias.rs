use alloc::format;
use alloc::string::String;
use std::sync::{Mutex, PoisonError};

use crate::Tagged;
use crate::registry::{RegistryArc, RegistryError, TypePath};

// -----------------------------------------------------------------------------
// Alias

/// A short string bound to a module path.
///
/// Types in the module (or in any module below it) get an extra name
/// `[{alias}]{rest}` where `rest` is the canonical name without the module path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    alias: String,
    module_path: &'static str,
}

impl Alias {
    #[inline]
    pub(crate) fn new(alias: String, module_path: &'static str) -> Self {
        Self { alias, module_path }
    }

    #[inline]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    #[inline]
    pub fn module_path(&self) -> &'static str {
        self.module_path
    }

    /// Shortens `canonical` if its module path starts with the bound path.
    ///
    /// The bound path must end on a segment boundary, `foo` does not shorten `foobar::Baz`.
    pub(crate) fn shorten(&self, canonical: &str) -> Option<String> {
        let rest = canonical.strip_prefix(self.module_path)?;
        let rest = rest
            .strip_prefix('/')
            .or_else(|| rest.strip_prefix("::"))?;
        Some(format!("[{}]{}", self.alias, rest))
    }
}

// -----------------------------------------------------------------------------
// AliasRegistrar

/// A registry handle dedicated to the types of one module.
///
/// The alias is bound to the module of the first registered type,
/// later registrations are forwarded unchanged.
///
/// # Examples
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use vc_serial::{RegistryArc, derive::Tagged};
/// use vc_serial::registry::AliasRegistrar;
///
/// #[derive(Tagged, Serialize, Deserialize, Default)]
/// pub struct Gadget {
///     size: u32,
/// }
///
/// let registry = RegistryArc::default();
/// let gadgets = AliasRegistrar::new("g", registry.clone());
/// gadgets.register::<Gadget>().unwrap();
///
/// assert_eq!(registry.read().name_for_type::<Gadget>().unwrap(), "[g]Gadget");
/// ```
#[derive(Debug)]
pub struct AliasRegistrar {
    alias: String,
    registry: RegistryArc,
    aliased: Mutex<bool>,
}

impl AliasRegistrar {
    pub fn new(alias: impl Into<String>, registry: RegistryArc) -> Self {
        Self {
            alias: alias.into(),
            registry,
            aliased: Mutex::new(false),
        }
    }

    #[inline]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    #[inline]
    pub fn registry(&self) -> &RegistryArc {
        &self.registry
    }

    /// Binds the alias on first use, then registers `T`.
    pub fn register<T: Tagged + TypePath + Default>(&self) -> Result<(), RegistryError> {
        {
            let mut aliased = self.aliased.lock().unwrap_or_else(PoisonError::into_inner);
            if !*aliased {
                self.registry.write().add_alias::<T>(self.alias.clone())?;
                *aliased = true;
            }
        }

        self.registry.write().register::<T>()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Alias, AliasRegistrar};
    use crate::registry::{RegistryArc, RegistryError};
    use crate::testing::{Alpha, Bravo, pkg};

    #[test]
    fn registrar_binds_once() {
        let registry = RegistryArc::default();
        let registrar = AliasRegistrar::new("test", registry.clone());
        registrar.register::<Alpha>().unwrap();
        registrar.register::<Bravo>().unwrap();

        assert_eq!(registry.read().aliases().len(), 1);
        assert_eq!(registry.read().name_for_type::<Bravo>().unwrap(), "[test]Bravo");

        let err = registrar.register::<Alpha>().unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered { .. }));

        let other = AliasRegistrar::new("test", registry.clone());
        let err = other.register::<pkg::Widget>().unwrap_err();
        assert_eq!(err, RegistryError::AliasConflict { alias: "test".into() });
        assert!(!registry.read().contains(core::any::TypeId::of::<pkg::Widget>()));
    }

    #[test]
    fn shorten_on_segment_boundary() {
        let alias = Alias::new("t".into(), "pkg");
        assert_eq!(alias.shorten("pkg/Widget").as_deref(), Some("[t]Widget"));
        assert_eq!(alias.shorten("pkg::inner/Widget").as_deref(), Some("[t]inner/Widget"));
        assert_eq!(alias.shorten("pkgs/Widget"), None);
        assert_eq!(alias.shorten("other/Widget"), None);
    }
}
