use proc_macro2::TokenStream;
use quote::quote;

use crate::meta::TaggedMeta;

/// Generate implementation codes for `Tagged`
pub(crate) fn impl_tagged(meta: &TaggedMeta) -> TokenStream {
    let exports_ = crate::path::macro_exports_(meta.vc_serial_path());
    let ident = meta.ident();
    let attrs = meta.attrs();

    let serialize_impl = if attrs.mappable.is_none() || attrs.serialize.is_some() {
        quote! { ::core::option::Option::Some(self) }
    } else {
        quote! { ::core::option::Option::None }
    };

    let (decode_impl, mappable_impls) = if attrs.mappable.is_some() {
        (
            quote! {
                let map = <#exports_::AttrMap as #exports_::serde_core::Deserialize<'de>>::deserialize(deserializer)?;
                #exports_::Mappable::pull_from_map(self, &map)
                    .map_err(<#exports_::erased_serde::Error as #exports_::serde_core::de::Error>::custom)
            },
            quote! {
                #[inline]
                fn as_mappable(&self) -> ::core::option::Option<&dyn #exports_::Mappable> {
                    ::core::option::Option::Some(self)
                }

                #[inline]
                fn as_mappable_mut(&mut self) -> ::core::option::Option<&mut dyn #exports_::Mappable> {
                    ::core::option::Option::Some(self)
                }
            },
        )
    } else {
        (
            quote! {
                *self = <Self as #exports_::serde_core::Deserialize<'de>>::deserialize(deserializer)?;
                ::core::result::Result::Ok(())
            },
            crate::utils_empty(),
        )
    };

    let recursive_impl = match meta.mapper_field() {
        Some(field) => quote! {
            #[inline]
            fn as_recursive(&self) -> ::core::option::Option<&dyn #exports_::Recursive> {
                ::core::option::Option::Some(&self.#field)
            }
        },
        None => crate::utils_empty(),
    };

    quote! {
        impl #exports_::Tagged for #ident {
            #[inline]
            fn ty_id(&self) -> ::core::any::TypeId {
                ::core::any::TypeId::of::<Self>()
            }

            #[inline]
            fn reflect_type_path(&self) -> &'static str {
                <Self as #exports_::TypePath>::type_path()
            }

            #[inline]
            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            #[inline]
            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }

            #[inline]
            fn into_any(self: #exports_::Box<Self>) -> #exports_::Box<dyn ::core::any::Any> {
                self
            }

            #[inline]
            fn as_serialize(&self) -> ::core::option::Option<&dyn #exports_::erased_serde::Serialize> {
                #serialize_impl
            }

            fn decode<'de>(
                &mut self,
                deserializer: &mut dyn #exports_::erased_serde::Deserializer<'de>,
            ) -> ::core::result::Result<(), #exports_::erased_serde::Error> {
                #decode_impl
            }

            #mappable_impls

            #recursive_impl
        }
    }
}
