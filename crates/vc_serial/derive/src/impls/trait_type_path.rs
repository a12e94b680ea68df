use proc_macro2::TokenStream;
use quote::quote;

use crate::meta::TaggedMeta;

/// Generate implementation codes for `TypePath`
pub(crate) fn impl_type_path(meta: &TaggedMeta) -> TokenStream {
    let exports_ = crate::path::macro_exports_(meta.vc_serial_path());
    let ident = meta.ident();
    let (type_path, type_ident, module_path) = meta.paths();
    let exported = meta.exported();

    quote! {
        impl #exports_::TypePath for #ident {
            #[inline]
            fn type_path() -> &'static str {
                #type_path
            }

            #[inline]
            fn type_ident() -> &'static str {
                #type_ident
            }

            #[inline]
            fn module_path() -> ::core::option::Option<&'static str> {
                #module_path
            }

            #[inline]
            fn is_exported() -> bool {
                #exported
            }
        }
    }
}
