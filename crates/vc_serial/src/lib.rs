//! Object-graph serialization on top of [`vc_value`].
//!
//! Types become serializable through [`Describe`], usually derived:
//!
//! ```
//! use vc_serial::{Describe, JsonOptions, from_json, to_json};
//!
//! #[derive(Describe, Default, Debug, PartialEq)]
//! #[json(type_name = "Knife")]
//! pub struct Knife {
//!     pub name: String,
//!     pub code: String,
//!     pub level_of_sharpness: i16,
//! }
//!
//! let knife = Knife { name: "Chef".into(), code: "K1".into(), level_of_sharpness: 5 };
//! let options = JsonOptions::new();
//!
//! let text = to_json(&knife, &options).unwrap();
//! assert_eq!(text, r#"{"$type":"Knife","name":"Chef","code":"K1","level_of_sharpness":5}"#);
//!
//! let back: Knife = from_json(&text, &options).unwrap();
//! assert_eq!(back, knife);
//! ```
//!
//! ## Type extension
//!
//! With [`JsonOptions::type_extension`] enabled (the default) every object
//! is written with a leading [`TYPE_TAG`] member naming its registered type.
//! [`read_object`] uses it to rebuild the right concrete type, and members
//! declared as `Box<dyn Trait>` round-trip polymorphically.
//!
//! ## Build-up
//!
//! [`build_up`] applies a parsed document onto an existing instance.
//! Members missing from the document keep their current value.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Extern Self

// Derived code names this crate as `vc_serial`, which must also resolve
// inside the crate itself.
extern crate self as vc_serial;

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;

// Registry locking and lazily built type infos need `std::sync`.
extern crate std;

// -----------------------------------------------------------------------------
// Modules

mod data;
mod describe;
mod error;
mod options;
mod registry;

pub mod de;
pub mod guard;
pub mod ser;

// -----------------------------------------------------------------------------
// Top-Level exports

pub mod __macro_exports;

pub use vc_serial_derive::Describe;

pub use data::{DataKind, DeclaredType, FromJson, JsonData};
pub use describe::{AttributePolicy, Describe, DescribeStrategy, Object, PublicMembers};
pub use describe::{MemberFlags, MemberInfo, TypeInfo};
pub use error::JsonError;
pub use options::{JsonOptions, TYPE_TAG};
pub use registry::{MemberDescriptor, TypeDescriptor, TypeRegistry};

pub use de::{BuildContext, build_up, build_up_from_str, downcast_object, from_json, from_value};
pub use de::{read_object, read_value};
pub use ser::{SerializeContext, deep_copy, to_json, to_value};

pub use vc_value::{JsonKind, JsonMap, JsonValue, Number};
