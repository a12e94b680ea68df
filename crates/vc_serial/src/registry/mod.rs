//! Type registry for going from a type to a name and back.
//!
//! ## Menu
//!
//! - [`TypePath`]: Static type path, name and module of a type.
//! - [`TypeRegistry`]: Aliases and registered types, indexed by every generated name.
//! - [`Registration`]: The names and constructor of one registered type.
//! - [`Alias`]: A short string standing for a module path inside names.
//! - [`AliasRegistrar`]: Registers the types of one module under one alias.
//! - [`RegistryArc`]: A shared, thread-safe registry handle.
//! - [`global`]: The process-wide registry.
//!
//! ## Names
//!
//! Registering `Widget` declared in `my_app::shapes` generates the canonical name
//! `my_app::shapes/Widget`. For each alias whose module path is a prefix of
//! `my_app::shapes`, a shorter name like `[s]Widget` is generated as well.
//! The shortest one is used when writing type tags; all of them are accepted
//! when reading.
//!
//! ## auto_register
//!
//! See [`TypeRegistry::auto_register`].
//!
//! We use [`inventory`] crate to implement static registration,
//! not all platforms support it (although major platforms do).

// -----------------------------------------------------------------------------
// Modules

mod alias;
mod error;
mod registration;
mod registry_arc;
mod type_path;
mod type_registry;

#[cfg(feature = "auto_register")]
pub(crate) mod auto_register;

// -----------------------------------------------------------------------------
// Exports

pub use alias::{Alias, AliasRegistrar};
pub use error::RegistryError;
pub use registration::Registration;
pub use registry_arc::{RegistryArc, global, set_global};
pub use type_path::TypePath;
pub use type_registry::TypeRegistry;
