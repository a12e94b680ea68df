#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// Derive output refers to `::vc_serial`, which must also resolve inside this crate
// (unit tests and doc tests).
extern crate self as vc_serial;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod hash;
mod tagged;

pub mod convert;
pub mod mapper;
pub mod registry;

#[cfg(feature = "json")]
pub mod wrapper;

#[cfg(test)]
pub(crate) mod testing;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use error::{BoxError, SerialError};
pub use mapper::{AttrMap, Mappable, Mapper, Recursive, TYPE_FIELD, WithMapper};
pub use registry::{RegistryArc, RegistryError, TypePath, TypeRegistry};
pub use tagged::Tagged;
pub use vc_serial_derive as derive;

#[cfg(feature = "json")]
pub use wrapper::Wrapper;
