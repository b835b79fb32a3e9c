//! Parsing of `#[json(...)]` attributes.

use proc_macro2::Span;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Attribute, LitStr, Token, Type, parenthesized};

use crate::JSON_ATTRIBUTE_NAME;

const TYPE_TAG: &str = "$type";

// -----------------------------------------------------------------------------
// TypeAttributes

#[derive(Default)]
pub(crate) struct TypeAttributes {
    pub type_name: Option<LitStr>,
    pub implements: Vec<Type>,
    pub auto_register: Option<Span>,
}

impl TypeAttributes {
    /// Format: `#[json(type_name = "...", implements(dyn A, ...), auto_register)]`
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident(JSON_ATTRIBUTE_NAME)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("type_name") {
                    let lit: LitStr = meta.value()?.parse()?;
                    if lit.value().is_empty() {
                        return Err(syn::Error::new(lit.span(), "`type_name` must not be empty"));
                    }
                    this.type_name = Some(lit);
                    Ok(())
                } else if meta.path.is_ident("implements") {
                    let content;
                    parenthesized!(content in meta.input);
                    let types = Punctuated::<Type, Token![,]>::parse_terminated(&content)?;
                    this.implements.extend(types);
                    Ok(())
                } else if meta.path.is_ident("auto_register") {
                    this.auto_register = Some(meta.path.span());
                    Ok(())
                } else {
                    Err(meta.error("expected `type_name`, `implements` or `auto_register`"))
                }
            })?;
        }
        Ok(this)
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

#[derive(Default)]
pub(crate) struct FieldAttributes {
    pub skip: bool,
    pub include: bool,
    pub rename: Option<LitStr>,
}

impl FieldAttributes {
    /// Format: `#[json(skip)]`, `#[json(include, rename = "...")]`
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident(JSON_ATTRIBUTE_NAME)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    this.skip = true;
                    Ok(())
                } else if meta.path.is_ident("include") {
                    this.include = true;
                    Ok(())
                } else if meta.path.is_ident("rename") {
                    let lit: LitStr = meta.value()?.parse()?;
                    let value = lit.value();
                    if value.is_empty() || value == TYPE_TAG {
                        return Err(syn::Error::new(
                            lit.span(),
                            "`rename` must not be empty or the reserved `$type`",
                        ));
                    }
                    this.rename = Some(lit);
                    Ok(())
                } else {
                    Err(meta.error("expected `skip`, `include` or `rename`"))
                }
            })?;

            if this.skip && this.include {
                return Err(syn::Error::new_spanned(attr, "`skip` and `include` cannot be combined"));
            }
        }
        Ok(this)
    }
}
