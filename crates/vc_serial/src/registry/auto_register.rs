//! Static registration through [`inventory`].
//!
//! `#[tagged(auto_register)]` submits one [`AutoRegistration`] per type,
//! [`TypeRegistry::auto_register`] runs them all.

use crate::Tagged;
use crate::registry::{RegistryError, TypePath, TypeRegistry};

/// A registration function collected at link time.
pub struct AutoRegistration(pub fn(&mut TypeRegistry) -> Result<(), RegistryError>);

inventory::collect!(AutoRegistration);

/// The function submitted by the derive macro for `T`.
#[inline]
pub fn register_type<T: Tagged + TypePath + Default>(
    registry: &mut TypeRegistry,
) -> Result<(), RegistryError> {
    registry.register::<T>()
}

pub(crate) fn register_all(registry: &mut TypeRegistry) -> usize {
    let mut count = 0;
    for AutoRegistration(register) in inventory::iter::<AutoRegistration> {
        match register(registry) {
            Ok(()) => count += 1,
            Err(RegistryError::AlreadyRegistered { .. }) => {}
            Err(err) => log::warn!("auto registration skipped: {err}"),
        }
    }
    log::debug!("auto registered {count} types");
    count
}

// -----------------------------------------------------------------------------
// Tests
