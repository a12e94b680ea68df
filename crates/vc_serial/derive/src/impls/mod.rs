//! Code generators.

mod auto_register;
mod trait_tagged;
mod trait_type_path;

pub(crate) use auto_register::impl_auto_register;
pub(crate) use trait_tagged::impl_tagged;
pub(crate) use trait_type_path::impl_type_path;
