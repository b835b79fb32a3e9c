//! A self-describing JSON value tree.
//!
//! This crate knows nothing about target types. It turns text into a
//! [`JsonValue`] and back:
//!
//! - [`Lexer`]: text to a lazy stream of [`Token`]s.
//! - [`Parser`]: tokens to a [`JsonValue`], with a nesting depth guard.
//! - [`write`](crate::write): a [`JsonValue`] to compact or pretty text.
//!
//! ```
//! use vc_value::{JsonValue, parse};
//!
//! let value = parse(r#"{"name": "Chef", "level": 5}"#).unwrap();
//! assert_eq!(value.get("level").and_then(JsonValue::as_i64), Some(5));
//! assert_eq!(value.to_string(), r#"{"name":"Chef","level":5}"#);
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod hash;
mod kind;
mod lexer;
mod map;
mod number;
mod parser;
mod value;

pub mod write;

#[cfg(feature = "serde")]
mod serde_impls;

// -----------------------------------------------------------------------------
// Exports

pub use error::{DepthExceededError, Expected, Found, LexError, LexErrorKind, ParseError, TextError};
pub use hash::FixedHashState;
pub use kind::JsonKind;
pub use lexer::{Lexer, Spanned, Token, TokenKind};
pub use map::JsonMap;
pub use number::Number;
pub use parser::{DEFAULT_MAX_DEPTH, Parser, parse, parse_with_depth};
pub use value::JsonValue;
