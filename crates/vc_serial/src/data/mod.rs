//! Value-level conversion between Rust data and [`JsonValue`].
//!
//! [`JsonData`] is implemented here for primitives, strings, collections
//! and smart pointers. Describable structs get it from `#[derive(Describe)]`.

use core::any::type_name;
use core::fmt;

use vc_value::JsonValue;

use crate::{BuildContext, JsonError, SerializeContext};

// -----------------------------------------------------------------------------
// Modules

mod collections;
mod pointers;
mod primitives;

// -----------------------------------------------------------------------------
// JsonData

/// Data that can be written to, and built up from, a [`JsonValue`].
///
/// `build_up` mutates `self` in place. Scalars and sequences are replaced,
/// describable objects only have the members present in `value` assigned.
pub trait JsonData: Send + Sync + 'static {
    fn to_value(&self, ctx: &mut SerializeContext) -> Result<JsonValue, JsonError>;

    fn build_up(&mut self, value: &JsonValue, ctx: &mut BuildContext) -> Result<(), JsonError>;

    /// The coarse shape of this type, as seen by a member descriptor.
    fn kind() -> DataKind
    where
        Self: Sized;
}

/// [`JsonData`] that can also be created from scratch.
pub trait FromJson: JsonData + Sized {
    fn from_value(value: &JsonValue, ctx: &mut BuildContext) -> Result<Self, JsonError>;
}

// -----------------------------------------------------------------------------
// DataKind

/// The shape of a member's declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Bool,
    Integer,
    Float,
    Char,
    String,
    /// A raw [`JsonValue`], accepting anything.
    Any,
    /// Accepts `null` as "unset".
    Optional,
    /// Replaced wholesale on build-up.
    Sequence,
    /// String-keyed; replaced wholesale on build-up.
    Map,
    /// A concrete describable type, built up in place.
    Object,
    /// Resolved at runtime through the type tag.
    Polymorphic,
}

/// A member's declared type: its Rust path and [`DataKind`].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DeclaredType {
    type_path: &'static str,
    kind: DataKind,
}

impl DeclaredType {
    #[inline]
    pub fn of<T: JsonData>() -> Self {
        Self {
            type_path: type_name::<T>(),
            kind: T::kind(),
        }
    }

    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.type_path
    }

    #[inline]
    pub const fn kind(&self) -> DataKind {
        self.kind
    }
}

impl fmt::Debug for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.type_path, self.kind)
    }
}
