use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Visibility};

use crate::attributes::{FieldAttributes, TypeAttributes};

/// Generates the four trait impls for a named-field struct.
pub(crate) fn impl_describe(ast: &DeriveInput) -> syn::Result<TokenStream> {
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &ast.generics,
            "`Describe` cannot be derived for generic types",
        ));
    }

    let fields = match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &ast.ident,
                    "`Describe` requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &ast.ident,
                "`Describe` can only be derived for structs",
            ));
        }
    };

    let attrs = TypeAttributes::parse_attrs(&ast.attrs)?;

    let vc_serial_path = crate::path::vc_serial();
    let macro_exports_ = crate::path::macro_exports_(&vc_serial_path);
    let ident = &ast.ident;
    let type_name = attrs
        .type_name
        .clone()
        .unwrap_or_else(|| LitStr::new(&ident.to_string(), ident.span()));

    let members = fields
        .iter()
        .map(|field| {
            let field_attrs = FieldAttributes::parse_attrs(&field.attrs)?;
            // Named fields always have an ident.
            let Some(field_ident) = &field.ident else {
                return Err(syn::Error::new_spanned(field, "expected a named field"));
            };
            let field_ty = &field.ty;
            let name = LitStr::new(&field_ident.to_string(), field_ident.span());

            let mut flags = Vec::new();
            if matches!(field.vis, Visibility::Public(_)) {
                flags.push(quote!(#vc_serial_path::MemberFlags::PUBLIC));
            }
            if field_attrs.skip {
                flags.push(quote!(#vc_serial_path::MemberFlags::SKIP));
            }
            if field_attrs.include {
                flags.push(quote!(#vc_serial_path::MemberFlags::INCLUDE));
            }
            let flags = if flags.is_empty() {
                quote!(#vc_serial_path::MemberFlags::empty())
            } else {
                quote!(#(#flags)|*)
            };

            let with_rename = field_attrs
                .rename
                .map(|rename| quote!(.with_rename(#rename)));

            Ok(quote! {
                #vc_serial_path::MemberInfo::new::<#field_ty>(
                    #name,
                    #flags,
                    |object| {
                        #vc_serial_path::Object::as_any(object)
                            .downcast_ref::<#ident>()
                            .map(|this| &this.#field_ident as &dyn #vc_serial_path::JsonData)
                    },
                    |object| {
                        #vc_serial_path::Object::as_any_mut(object)
                            .downcast_mut::<#ident>()
                            .map(|this| &mut this.#field_ident as &mut dyn #vc_serial_path::JsonData)
                    },
                )
                #with_rename
            })
        })
        .collect::<syn::Result<Vec<_>>>()?;

    let upcasts = attrs.implements.iter().map(|trait_ty| {
        quote! {
            .with_upcast::<#trait_ty>(|object| {
                <dyn #vc_serial_path::Object>::downcast::<#ident>(object)
                    .map(|this| this as #macro_exports_::Box<#trait_ty>)
            })
        }
    });

    let auto_register = crate::auto_register::get_auto_register_impl(&attrs, ident, &vc_serial_path);

    Ok(quote! {
        const _: () = {
            use #macro_exports_::{Any, Box, OnceLock, Result};
            use #vc_serial_path::{BuildContext, DataKind, JsonError, JsonValue, SerializeContext, TypeInfo};

            impl #vc_serial_path::JsonData for #ident {
                fn to_value(&self, ctx: &mut SerializeContext) -> Result<JsonValue, JsonError> {
                    ctx.serialize_object(self)
                }

                fn build_up(&mut self, value: &JsonValue, ctx: &mut BuildContext) -> Result<(), JsonError> {
                    ctx.build_object(self, value)
                }

                fn kind() -> DataKind {
                    DataKind::Object
                }
            }

            impl #vc_serial_path::FromJson for #ident {
                fn from_value(value: &JsonValue, ctx: &mut BuildContext) -> Result<Self, JsonError> {
                    let mut this = <Self as ::core::default::Default>::default();
                    ctx.build_object(&mut this, value)?;
                    Result::Ok(this)
                }
            }

            impl #vc_serial_path::Object for #ident {
                #[inline]
                fn object_info(&self) -> &'static TypeInfo {
                    <Self as #vc_serial_path::Describe>::type_info()
                }

                #[inline]
                fn as_any(&self) -> &dyn Any {
                    self
                }

                #[inline]
                fn as_any_mut(&mut self) -> &mut dyn Any {
                    self
                }

                #[inline]
                fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
                    self
                }
            }

            impl #vc_serial_path::Describe for #ident {
                fn type_info() -> &'static TypeInfo {
                    static INFO: OnceLock<TypeInfo> = OnceLock::new();
                    INFO.get_or_init(|| {
                        TypeInfo::new::<#ident>(#type_name, [#(#members),*])
                            #(#upcasts)*
                    })
                }
            }
        };

        #auto_register
    })
}
