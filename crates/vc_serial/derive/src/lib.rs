//! See following macros:
//!
//! - [`Tagged`]
//! - [`TypePath`]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static TAGGED_ATTRIBUTE_NAME: &str = "tagged";

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod impls;
mod meta;
mod path;

use meta::TaggedMeta;

#[inline(always)]
pub(crate) fn utils_empty() -> proc_macro2::TokenStream {
    proc_macro2::TokenStream::new()
}

// -----------------------------------------------------------------------------
// Macros

/// # Tagged Derivation
///
/// `#[derive(Tagged)]` implements `Tagged` and `TypePath`, which is what
/// `TypeRegistry::register` needs (together with `Default`).
///
/// By default the type is encoded and decoded through serde, so it must
/// implement `Serialize` and `Deserialize`.
///
/// ```rust, ignore
/// #[derive(Tagged, Serialize, Deserialize, Default)]
/// pub struct Widget {
///     name: String,
/// }
/// ```
///
/// Generic types are not supported, since a registered type must be concrete.
///
/// ## Mappable Types
///
/// `mappable` routes mapping and decoding through the type's `Mappable`
/// implementation instead of serde. Add `serialize` if the type also
/// implements `Serialize` and should be usable with `Wrapper`.
///
/// ```rust, ignore
/// #[derive(Tagged, Default)]
/// #[tagged(mappable)]
/// pub struct Film {
///     name: String,
///     lead: Option<Box<dyn Actor>>,
///     #[tagged(mapper)]
///     with_mapper: WithMapper,
/// }
///
/// impl Mappable for Film { /* ... */ }
/// ```
///
/// The field marked `mapper` (a `WithMapper`) receives the active mapper while
/// the value is mapped, so `Mappable` code can map polymorphic fields. At most
/// one field can be marked.
///
/// ## Type Path
///
/// The type path defaults to `module_path!()` plus the type name. It can be
/// overridden, the module part being everything before the last `::`:
///
/// ```rust, ignore
/// #[derive(Tagged)]
/// #[tagged(type_path = "shapes::Widget")]
/// pub struct Widget;
/// ```
///
/// Only `pub` types can be registered, see `RegistryError::Private`.
///
/// ## Auto Registration
///
/// `auto_register` submits the type for `TypeRegistry::auto_register`.
/// This attribute is a no-op when the `auto_register` feature is disabled.
///
/// ```rust, ignore
/// #[derive(Tagged, Serialize, Deserialize, Default)]
/// #[tagged(auto_register)]
/// pub struct Widget;
/// ```
///
/// ## Crate Path
///
/// The runtime crate is located through the invoking crate's Cargo.toml
/// (`::vc_serial` or `::vc_poly::serial`). Override it with
/// `#[tagged(crate_path = "::my_reexport::serial")]`.
#[proc_macro_derive(Tagged, attributes(tagged))]
pub fn derive_tagged(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match TaggedMeta::from_derive_input(&ast) {
        Ok(meta) => {
            let type_path = impls::impl_type_path(&meta);
            let tagged = impls::impl_tagged(&meta);
            let auto_register = impls::impl_auto_register(&meta);
            quote::quote! {
                #type_path
                #tagged
                #auto_register
            }
            .into()
        }
        Err(err) => err.into_compile_error().into(),
    }
}

/// Implements only `TypePath`, accepting the type level attributes
/// `type_path` and `crate_path` of [`Tagged`].
#[proc_macro_derive(TypePath, attributes(tagged))]
pub fn derive_type_path(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match TaggedMeta::from_derive_input(&ast) {
        Ok(meta) => impls::impl_type_path(&meta).into(),
        Err(err) => err.into_compile_error().into(),
    }
}
