use alloc::boxed::Box;
use alloc::string::String;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::registry::RegistryError;

/// Codec failures, kept opaque so JSON and YAML errors share one variant.
pub type BoxError = Box<dyn core::error::Error + Send + Sync>;

// -----------------------------------------------------------------------------
// SerialError

/// Failures of mapping, wrapping and converting tagged values.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerialError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("type `{type_path}` does not encode to a map")]
    NotAComposite { type_path: &'static str },

    #[error("type `{type_path}` has no serde encoding")]
    NotSerializable { type_path: &'static str },

    #[error("no type tag in map")]
    NoTypeTag,

    #[error("type tag is not a string: {0}")]
    BadTypeTag(String),

    #[error("type tag not found in source")]
    TypeTagNotFound,

    #[error("empty type name")]
    EmptyTypeName,

    #[error("no mapper attached to `{type_path}`")]
    NoMapper { type_path: &'static str },

    #[error("mapping: {0}")]
    Mapping(String),

    #[error("decode: {0}")]
    Decode(#[source] BoxError),

    #[error("encode: {0}")]
    Encode(#[source] BoxError),

    #[error("{}: {source}", display_path(.path))]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },
}

impl SerialError {
    #[inline]
    pub fn mapping(message: impl core::fmt::Display) -> Self {
        Self::Mapping(alloc::format!("{message}"))
    }

    #[inline]
    pub fn decode(err: impl Into<BoxError>) -> Self {
        Self::Decode(err.into())
    }

    #[inline]
    pub fn encode(err: impl Into<BoxError>) -> Self {
        Self::Encode(err.into())
    }

    #[inline]
    pub(crate) fn io(path: Option<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        move |source| Self::Io { path, source }
    }

    /// Returns `true` if a name or type was not found in the registry.
    #[inline]
    pub fn is_not_registered(&self) -> bool {
        matches!(self, Self::Registry(err) if err.is_not_registered())
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => alloc::format!("{}", path.display()),
        None => String::from("<stream>"),
    }
}

impl From<io::Error> for SerialError {
    #[inline]
    fn from(source: io::Error) -> Self {
        Self::Io { path: None, source }
    }
}
