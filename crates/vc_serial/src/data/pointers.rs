use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::{TypeId, type_name};
use std::sync::{PoisonError, RwLock};

use vc_value::JsonValue;

use crate::{BuildContext, DataKind, FromJson, JsonData, JsonError, Object, SerializeContext};

// -----------------------------------------------------------------------------
// Option

impl<T: FromJson> JsonData for Option<T> {
    /// `None` is written as `null`, never omitted.
    fn to_value(&self, ctx: &mut SerializeContext) -> Result<JsonValue, JsonError> {
        match self {
            Some(inner) => inner.to_value(ctx),
            None => Ok(JsonValue::Null),
        }
    }

    fn build_up(&mut self, value: &JsonValue, ctx: &mut BuildContext) -> Result<(), JsonError> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        match self {
            Some(inner) => inner.build_up(value, ctx),
            None => {
                *self = Some(T::from_value(value, ctx)?);
                Ok(())
            }
        }
    }

    fn kind() -> DataKind {
        DataKind::Optional
    }
}

impl<T: FromJson> FromJson for Option<T> {
    fn from_value(value: &JsonValue, ctx: &mut BuildContext) -> Result<Self, JsonError> {
        match value {
            JsonValue::Null => Ok(None),
            _ => T::from_value(value, ctx).map(Some),
        }
    }
}

// -----------------------------------------------------------------------------
// Box

impl<T: JsonData> JsonData for Box<T> {
    fn to_value(&self, ctx: &mut SerializeContext) -> Result<JsonValue, JsonError> {
        (**self).to_value(ctx)
    }

    fn build_up(&mut self, value: &JsonValue, ctx: &mut BuildContext) -> Result<(), JsonError> {
        (**self).build_up(value, ctx)
    }

    fn kind() -> DataKind {
        T::kind()
    }
}

impl<T: FromJson> FromJson for Box<T> {
    fn from_value(value: &JsonValue, ctx: &mut BuildContext) -> Result<Self, JsonError> {
        T::from_value(value, ctx).map(Box::new)
    }
}

// -----------------------------------------------------------------------------
// Shared

impl<T: FromJson> JsonData for Arc<T> {
    /// Fails with [`JsonError::CycleDetected`] when the pointee is already
    /// being written further up the current path.
    fn to_value(&self, ctx: &mut SerializeContext) -> Result<JsonValue, JsonError> {
        let identity = (Arc::as_ptr(self).addr(), TypeId::of::<Self>());
        ctx.visit(identity, type_name::<T>(), |ctx| (**self).to_value(ctx))
    }

    /// Builds in place when this is the only handle, otherwise replaces the
    /// handle with a fresh allocation and leaves other owners untouched.
    fn build_up(&mut self, value: &JsonValue, ctx: &mut BuildContext) -> Result<(), JsonError> {
        match Arc::get_mut(self) {
            Some(inner) => inner.build_up(value, ctx),
            None => {
                *self = Arc::new(T::from_value(value, ctx)?);
                Ok(())
            }
        }
    }

    fn kind() -> DataKind {
        T::kind()
    }
}

impl<T: FromJson> FromJson for Arc<T> {
    fn from_value(value: &JsonValue, ctx: &mut BuildContext) -> Result<Self, JsonError> {
        T::from_value(value, ctx).map(Arc::new)
    }
}

impl<T: FromJson> JsonData for RwLock<T> {
    fn to_value(&self, ctx: &mut SerializeContext) -> Result<JsonValue, JsonError> {
        self.read()
            .unwrap_or_else(PoisonError::into_inner)
            .to_value(ctx)
    }

    fn build_up(&mut self, value: &JsonValue, ctx: &mut BuildContext) -> Result<(), JsonError> {
        self.get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .build_up(value, ctx)
    }

    fn kind() -> DataKind {
        T::kind()
    }
}

impl<T: FromJson> FromJson for RwLock<T> {
    fn from_value(value: &JsonValue, ctx: &mut BuildContext) -> Result<Self, JsonError> {
        T::from_value(value, ctx).map(RwLock::new)
    }
}

// -----------------------------------------------------------------------------
// Polymorphic

impl JsonData for Box<dyn Object> {
    fn to_value(&self, ctx: &mut SerializeContext) -> Result<JsonValue, JsonError> {
        (**self).to_value(ctx)
    }

    /// A tagged object replaces the current instance, anything else is
    /// built up in place.
    fn build_up(&mut self, value: &JsonValue, ctx: &mut BuildContext) -> Result<(), JsonError> {
        if ctx.has_type_tag(value) {
            *self = ctx.materialize(value, None)?;
            Ok(())
        } else {
            (**self).build_up(value, ctx)
        }
    }

    fn kind() -> DataKind {
        DataKind::Polymorphic
    }
}

impl FromJson for Box<dyn Object> {
    fn from_value(value: &JsonValue, ctx: &mut BuildContext) -> Result<Self, JsonError> {
        ctx.materialize(value, None)
    }
}

/// Implements [`JsonData`] and [`FromJson`] for `Box<dyn Trait>`.
///
/// `Trait` must have [`Object`] as a supertrait, and every concrete type
/// stored behind it must list it in `#[json(implements(dyn Trait))]`.
///
/// ```
/// use vc_serial::{Describe, Object, impl_dyn_data};
///
/// pub trait Shape: Object {
///     fn area(&self) -> f64;
/// }
///
/// impl_dyn_data!(Shape);
///
/// #[derive(Describe, Default)]
/// #[json(implements(dyn Shape))]
/// pub struct Square {
///     pub side: f64,
/// }
///
/// impl Shape for Square {
///     fn area(&self) -> f64 {
///         self.side * self.side
///     }
/// }
/// ```
#[macro_export]
macro_rules! impl_dyn_data {
    ($($trait_:tt)+) => {
        impl $crate::JsonData for $crate::__macro_exports::Box<dyn $($trait_)+> {
            fn to_value(
                &self,
                ctx: &mut $crate::SerializeContext,
            ) -> $crate::__macro_exports::Result<$crate::JsonValue, $crate::JsonError> {
                $crate::JsonData::to_value(&**self, ctx)
            }

            fn build_up(
                &mut self,
                value: &$crate::JsonValue,
                ctx: &mut $crate::BuildContext,
            ) -> $crate::__macro_exports::Result<(), $crate::JsonError> {
                if ctx.has_type_tag(value) {
                    *self = ctx.materialize_polymorphic::<dyn $($trait_)+>(value)?;
                    $crate::__macro_exports::Result::Ok(())
                } else {
                    $crate::JsonData::build_up(&mut **self, value, ctx)
                }
            }

            fn kind() -> $crate::DataKind {
                $crate::DataKind::Polymorphic
            }
        }

        impl $crate::FromJson for $crate::__macro_exports::Box<dyn $($trait_)+> {
            fn from_value(
                value: &$crate::JsonValue,
                ctx: &mut $crate::BuildContext,
            ) -> $crate::__macro_exports::Result<Self, $crate::JsonError> {
                ctx.materialize_polymorphic::<dyn $($trait_)+>(value)
            }
        }
    };
}
