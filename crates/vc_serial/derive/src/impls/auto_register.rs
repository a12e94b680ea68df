use proc_macro2::TokenStream;

use crate::meta::TaggedMeta;

/// Generate `auto_register` implementation
#[cfg(feature = "auto_register")]
pub(crate) fn impl_auto_register(meta: &TaggedMeta) -> TokenStream {
    use quote::quote_spanned;

    if let Some(span) = meta.attrs().auto_register {
        let auto_register_ = crate::path::auto_register_(meta.vc_serial_path());
        let ident = meta.ident();

        quote_spanned! { span =>
            #auto_register_::inventory::submit!{
                #auto_register_::AutoRegistration(
                    #auto_register_::register_type::<#ident>
                )
            }
        }
    } else {
        crate::utils_empty()
    }
}

/// Generate `auto_register` implementation
#[cfg(not(feature = "auto_register"))]
pub(crate) fn impl_auto_register(_: &TaggedMeta) -> TokenStream {
    crate::utils_empty()
}
