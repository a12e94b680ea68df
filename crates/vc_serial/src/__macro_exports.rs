//! Items used by the code generated in `vc_serial_derive`.

pub use alloc::boxed::Box;

pub use erased_serde;
pub use serde_core;

pub use crate::mapper::{AttrMap, Mappable, Recursive};
pub use crate::registry::TypePath;
pub use crate::tagged::Tagged;

#[cfg(feature = "auto_register")]
pub mod auto_register {
    pub use inventory;

    pub use crate::registry::auto_register::{AutoRegistration, register_type};
}
