use proc_macro2::TokenStream;
use syn::Ident;

use crate::attributes::TypeAttributes;

/// Generate `auto_register` implementation
#[cfg(feature = "auto_register")]
pub(crate) fn get_auto_register_impl(
    attrs: &TypeAttributes,
    ident: &Ident,
    vc_serial_path: &syn::Path,
) -> TokenStream {
    use quote::quote_spanned;

    let Some(span) = attrs.auto_register else {
        return TokenStream::new();
    };

    let auto_register_ = crate::path::auto_register_(vc_serial_path);

    quote_spanned! { span =>
        #auto_register_::inventory::submit! {
            #auto_register_::__AutoRegisterFunc(
                <#ident as #vc_serial_path::Describe>::type_info
            )
        }
    }
}

/// Generate `auto_register` implementation
#[cfg(not(feature = "auto_register"))]
pub(crate) fn get_auto_register_impl(_: &TypeAttributes, _: &Ident, _: &syn::Path) -> TokenStream {
    TokenStream::new()
}
