//! JSON serialization for object graphs.
//!
//! - [`value`]: the self-describing [`JsonValue`] tree, its lexer, parser
//!   and writer. Usable without any target type.
//! - [`serial`]: type descriptors, the registry, serialization with the
//!   `$type` tag and build-up of existing instances.
//!
//! ```
//! use vc_json::{Describe, JsonOptions, build_up, read_object, to_json};
//!
//! #[derive(Describe, Default, Debug, PartialEq)]
//! #[json(type_name = "Knife")]
//! pub struct Knife {
//!     pub name: String,
//!     pub level: i16,
//! }
//!
//! let options = JsonOptions::new();
//! options.registry().register::<Knife>().unwrap();
//!
//! let text = to_json(&Knife { name: "Chef".into(), level: 5 }, &options).unwrap();
//! assert_eq!(text, r#"{"$type":"Knife","name":"Chef","level":5}"#);
//!
//! // No target type is given: the tag names it.
//! let object = read_object(&text, &options, None).unwrap();
//! let mut knife = vc_json::downcast_object::<Knife>(object).unwrap();
//!
//! // Keys missing from the update keep their value.
//! build_up(&mut *knife, &vc_json::read_value(r#"{"level": 9}"#).unwrap(), &options).unwrap();
//! assert_eq!(*knife, Knife { name: "Chef".into(), level: 9 });
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use vc_serial as serial;
pub use vc_value as value;

pub use vc_serial::{AttributePolicy, Describe, DescribeStrategy, FromJson, JsonData, Object, PublicMembers};
pub use vc_serial::{JsonError, JsonOptions, TYPE_TAG, TypeDescriptor, TypeRegistry};
pub use vc_serial::{build_up, build_up_from_str, deep_copy, downcast_object, from_json, from_value};
pub use vc_serial::{read_object, read_value, to_json, to_value};
pub use vc_value::{JsonKind, JsonMap, JsonValue, Number};
