//! Everything the generators need to know about the input type.

use proc_macro2::{Span, TokenStream};
use quote::{ToTokens, quote};
use syn::{Data, DeriveInput, Fields, Ident, Index, LitStr, Visibility};

use crate::attributes::{TypeAttributes, is_mapper_field};

pub(crate) struct TaggedMeta<'a> {
    ident: &'a Ident,
    attrs: TypeAttributes,
    exported: bool,
    /// Access expression of the `#[tagged(mapper)]` field, e.g. `with_mapper` or `0`.
    mapper_field: Option<TokenStream>,
    vc_serial_path: syn::Path,
}

impl<'a> TaggedMeta<'a> {
    pub fn from_derive_input(ast: &'a DeriveInput) -> syn::Result<Self> {
        if !ast.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &ast.generics,
                "tagged types must not be generic",
            ));
        }

        let attrs = TypeAttributes::parse_attrs(&ast.attrs)?;

        let mut mapper_field = None;
        if let Data::Struct(data) = &ast.data {
            let fields: Vec<_> = match &data.fields {
                Fields::Named(named) => named.named.iter().collect(),
                Fields::Unnamed(unnamed) => unnamed.unnamed.iter().collect(),
                Fields::Unit => Vec::new(),
            };
            for (index, field) in fields.into_iter().enumerate() {
                if !is_mapper_field(&field.attrs)? {
                    continue;
                }
                if mapper_field.is_some() {
                    return Err(syn::Error::new_spanned(
                        field,
                        "only one field can be marked `mapper`",
                    ));
                }
                mapper_field = Some(match &field.ident {
                    Some(ident) => ident.to_token_stream(),
                    None => Index::from(index).to_token_stream(),
                });
            }
        }

        let vc_serial_path = match &attrs.crate_path {
            Some(path) => path.clone(),
            None => crate::path::vc_serial(),
        };

        Ok(Self {
            ident: &ast.ident,
            exported: matches!(ast.vis, Visibility::Public(_)),
            attrs,
            mapper_field,
            vc_serial_path,
        })
    }

    #[inline]
    pub fn ident(&self) -> &Ident {
        self.ident
    }

    #[inline]
    pub fn attrs(&self) -> &TypeAttributes {
        &self.attrs
    }

    #[inline]
    pub fn exported(&self) -> bool {
        self.exported
    }

    #[inline]
    pub fn mapper_field(&self) -> Option<&TokenStream> {
        self.mapper_field.as_ref()
    }

    #[inline]
    pub fn vc_serial_path(&self) -> &syn::Path {
        &self.vc_serial_path
    }

    /// Returns `(type_path, type_ident, module_path)` expressions of `&'static str`,
    /// the last one wrapped in an `Option`.
    pub fn paths(&self) -> (TokenStream, TokenStream, TokenStream) {
        match &self.attrs.type_path {
            Some(custom) => {
                let value = custom.value();
                let (module, ident) = match value.rsplit_once("::") {
                    Some((module, ident)) => (Some(module), ident),
                    None => (None, value.as_str()),
                };
                let ident = LitStr::new(ident, custom.span());
                let module = match module {
                    Some(module) => {
                        let module = LitStr::new(module, custom.span());
                        quote! { ::core::option::Option::Some(#module) }
                    }
                    None => quote! { ::core::option::Option::None },
                };
                (custom.to_token_stream(), ident.to_token_stream(), module)
            }
            None => {
                let ident = LitStr::new(&self.ident.to_string(), Span::call_site());
                (
                    quote! { ::core::concat!(::core::module_path!(), "::", #ident) },
                    ident.to_token_stream(),
                    quote! { ::core::option::Option::Some(::core::module_path!()) },
                )
            }
        }
    }
}
