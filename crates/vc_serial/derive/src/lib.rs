//! See [`Describe`].
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static JSON_ATTRIBUTE_NAME: &str = "json";

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod auto_register;
mod describe;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// # Describable struct
///
/// `#[derive(Describe)]` implements `JsonData`, `FromJson`, `Object` and
/// `Describe` for a struct with named fields. The struct must also
/// implement `Default`, which is used to construct fresh instances.
///
/// Every field type must implement `JsonData` (and `FromJson` where it
/// is nested in `Option`, `Vec` or a map).
///
/// Generic structs, tuple structs, unit structs, enums and unions are
/// rejected.
///
/// ## Type attributes
///
/// - `type_name = "..."`: the wire name written in the `$type` tag.
///   Defaults to the struct identifier.
/// - `implements(dyn TraitA, dyn TraitB)`: lets a tagged value be built as
///   `Box<dyn TraitA>`. The trait needs `impl_dyn_data!(TraitA)`.
/// - `auto_register`: collect the type for `TypeRegistry::auto_register`.
///   A no-op without the `auto_register` feature.
///
/// ```rust, ignore
/// #[derive(Describe, Default)]
/// #[json(type_name = "Knife", implements(dyn Product), auto_register)]
/// struct Knife { /* ... */ }
/// ```
///
/// ## Field attributes
///
/// These are read by the `AttributePolicy` strategy only. The default
/// strategy takes every `pub` field under its own name.
///
/// - `skip`: never serialized.
/// - `include`: serialized even if not `pub`.
/// - `rename = "..."`: the member name on the wire.
///
/// ```rust, ignore
/// #[derive(Describe, Default)]
/// struct Knife {
///     #[json(rename = "Name")]
///     pub name: String,
///     #[json(include)]
///     code: String,
///     #[json(skip)]
///     pub cache: u64,
/// }
/// ```
#[proc_macro_derive(Describe, attributes(json))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match describe::impl_describe(&ast) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}
