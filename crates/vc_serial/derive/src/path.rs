//! Paths into `vc_serial` used by generated code.

use proc_macro2::TokenStream;
use quote::quote;

/// Get the correct access path to the `vc_serial` crate.
///
/// 1. For crates that depend on `vc_serial`, `::vc_serial` is returned.
/// 2. For crates that depend on `vc_json`, `::vc_json::serial` is returned.
/// 3. Otherwise `::vc_serial`, which inside `vc_serial` itself resolves
///    through `extern crate self as vc_serial`.
///
/// Reads the caller's `Cargo.toml`, so call it once per derive.
pub(crate) fn vc_serial() -> syn::Path {
    vc_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("vc_serial"))
}

#[inline(always)]
pub(crate) fn macro_exports_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_serial_path::__macro_exports
    }
}

#[cfg(feature = "auto_register")]
#[inline(always)]
pub(crate) fn auto_register_(vc_serial_path: &syn::Path) -> TokenStream {
    quote! {
        #vc_serial_path::__macro_exports::auto_register
    }
}
