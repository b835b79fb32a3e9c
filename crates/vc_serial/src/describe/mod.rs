//! The "describable" capability.
//!
//! A describable type exposes a static [`TypeInfo`]: its wire name, a
//! constructor and the list of members with type-erased accessors. A
//! [`DescribeStrategy`] turns that list into the
//! [`TypeDescriptor`](crate::TypeDescriptor) the registry caches.

use alloc::boxed::Box;
use core::any::Any;

use crate::JsonData;

// -----------------------------------------------------------------------------
// Modules

mod strategy;
mod type_info;

// -----------------------------------------------------------------------------
// Exports

pub use strategy::{AttributePolicy, DescribeStrategy, PublicMembers};
pub use type_info::{MemberFlags, MemberInfo, TypeInfo};

// -----------------------------------------------------------------------------
// Object

/// A value with a runtime-known describable type.
///
/// This is the dyn-compatible half of [`Describe`], used wherever the
/// concrete type is only known at runtime.
pub trait Object: JsonData + Any {
    /// The [`TypeInfo`] of the runtime type.
    fn object_info(&self) -> &'static TypeInfo;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
}

/// A type with a statically known [`TypeInfo`].
///
/// Implemented by `#[derive(Describe)]`. Writing it by hand means
/// building the member list yourself:
///
/// ```
/// use std::sync::OnceLock;
/// use vc_serial::{BuildContext, DataKind, Describe, FromJson, JsonData, JsonError};
/// use vc_serial::{JsonValue, MemberFlags, MemberInfo, Object, SerializeContext, TypeInfo};
/// use std::any::Any;
///
/// #[derive(Default)]
/// struct Point {
///     x: i32,
/// }
///
/// impl JsonData for Point {
///     fn to_value(&self, ctx: &mut SerializeContext) -> Result<JsonValue, JsonError> {
///         ctx.serialize_object(self)
///     }
///     fn build_up(&mut self, value: &JsonValue, ctx: &mut BuildContext) -> Result<(), JsonError> {
///         ctx.build_object(self, value)
///     }
///     fn kind() -> DataKind {
///         DataKind::Object
///     }
/// }
///
/// impl Object for Point {
///     fn object_info(&self) -> &'static TypeInfo {
///         Self::type_info()
///     }
///     fn as_any(&self) -> &dyn Any { self }
///     fn as_any_mut(&mut self) -> &mut dyn Any { self }
///     fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> { self }
/// }
///
/// impl Describe for Point {
///     fn type_info() -> &'static TypeInfo {
///         static INFO: OnceLock<TypeInfo> = OnceLock::new();
///         INFO.get_or_init(|| {
///             TypeInfo::new::<Point>("Point", [MemberInfo::new::<i32>(
///                 "x",
///                 MemberFlags::PUBLIC,
///                 |o| o.as_any().downcast_ref::<Point>().map(|p| &p.x as &dyn JsonData),
///                 |o| o.as_any_mut().downcast_mut::<Point>().map(|p| &mut p.x as &mut dyn JsonData),
///             )])
///         })
///     }
/// }
///
/// impl FromJson for Point {
///     fn from_value(value: &JsonValue, ctx: &mut BuildContext) -> Result<Self, JsonError> {
///         let mut point = Point::default();
///         ctx.build_object(&mut point, value)?;
///         Ok(point)
///     }
/// }
///
/// let text = vc_serial::to_json(&Point { x: 3 }, &Default::default()).unwrap();
/// assert_eq!(text, r#"{"$type":"Point","x":3}"#);
/// ```
pub trait Describe: Object + Default {
    fn type_info() -> &'static TypeInfo;
}

impl dyn Object {
    #[inline]
    pub fn is<T: Object>(&self) -> bool {
        self.as_any().is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    #[inline]
    pub fn downcast_mut<T: Object>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }

    /// Returns `None`, dropping the object, if it is not a `T`.
    #[inline]
    pub fn downcast<T: Object>(self: Box<Self>) -> Option<Box<T>> {
        self.into_any().downcast().ok()
    }
}

impl core::fmt::Debug for dyn Object {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "dyn Object<{}>", self.object_info().type_path())
    }
}
