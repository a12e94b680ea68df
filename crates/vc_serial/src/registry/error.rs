use alloc::string::String;

use thiserror::Error;

// -----------------------------------------------------------------------------
// RegistryError

/// Failures of [`TypeRegistry`](crate::TypeRegistry) operations.
///
/// Mutating operations that fail leave the registry exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("can't redefine alias `{alias}`")]
    AliasConflict { alias: String },

    #[error("no module path for type `{type_path}`")]
    Unnameable { type_path: &'static str },

    #[error("type `{type_path}` is private")]
    Private { type_path: &'static str },

    #[error("previous registration for type `{type_path}`")]
    AlreadyRegistered { type_path: &'static str },

    #[error("name `{name}` of type `{type_path}` is already taken by `{owner}`")]
    NameTaken {
        name: String,
        type_path: &'static str,
        owner: &'static str,
    },

    #[error("no registration for `{0}`")]
    NotRegistered(String),

    #[error("item is nil")]
    ItemIsNil,

    #[error("type `{type_path}` has no cast to `{target}`")]
    NoCast {
        type_path: &'static str,
        target: &'static str,
    },
}

impl RegistryError {
    /// Returns `true` for lookups of unknown types or names.
    #[inline]
    pub fn is_not_registered(&self) -> bool {
        matches!(self, Self::NotRegistered(_))
    }
}
