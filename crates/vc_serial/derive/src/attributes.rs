//! Parsing of `#[tagged(...)]` attributes.

use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::{Attribute, LitStr};

use crate::TAGGED_ATTRIBUTE_NAME;

/// Type level attributes.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    pub mappable: Option<Span>,
    pub serialize: Option<Span>,
    pub auto_register: Option<Span>,
    pub type_path: Option<LitStr>,
    pub crate_path: Option<syn::Path>,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();

        for attr in attrs.iter().filter(|a| a.path().is_ident(TAGGED_ATTRIBUTE_NAME)) {
            attr.parse_nested_meta(|meta| {
                let span = meta.path.span();
                if meta.path.is_ident("mappable") {
                    set_flag(&mut this.mappable, span, "mappable")
                } else if meta.path.is_ident("serialize") {
                    set_flag(&mut this.serialize, span, "serialize")
                } else if meta.path.is_ident("auto_register") {
                    set_flag(&mut this.auto_register, span, "auto_register")
                } else if meta.path.is_ident("type_path") {
                    let lit: LitStr = meta.value()?.parse()?;
                    let value = lit.value();
                    if value.starts_with("::") || value.ends_with("::") || value.is_empty() {
                        return Err(syn::Error::new(
                            lit.span(),
                            "`type_path` must be a path without leading `::`",
                        ));
                    }
                    this.type_path = Some(lit);
                    Ok(())
                } else if meta.path.is_ident("crate_path") {
                    let lit: LitStr = meta.value()?.parse()?;
                    this.crate_path = Some(lit.parse()?);
                    Ok(())
                } else if meta.path.is_ident("mapper") {
                    Err(meta.error("`mapper` must be placed on a field"))
                } else {
                    Err(meta.error(
                        "expected `mappable`, `serialize`, `auto_register`, `type_path` or `crate_path`",
                    ))
                }
            })?;
        }

        Ok(this)
    }
}

/// Returns whether the field is marked `#[tagged(mapper)]`.
pub(crate) fn is_mapper_field(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut mapper = false;
    for attr in attrs.iter().filter(|a| a.path().is_ident(TAGGED_ATTRIBUTE_NAME)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("mapper") {
                mapper = true;
                Ok(())
            } else {
                Err(meta.error("expected `mapper`"))
            }
        })?;
    }
    Ok(mapper)
}

fn set_flag(flag: &mut Option<Span>, span: Span, name: &str) -> syn::Result<()> {
    if flag.is_some() {
        return Err(syn::Error::new(span, format!("duplicate `{name}` attribute")));
    }
    *flag = Some(span);
    Ok(())
}
