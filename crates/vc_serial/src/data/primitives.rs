use alloc::borrow::ToOwned;
use alloc::string::{String, ToString};

use vc_value::{JsonValue, Number};

use crate::{BuildContext, DataKind, FromJson, JsonData, JsonError, SerializeContext};

// -----------------------------------------------------------------------------
// bool

impl JsonData for bool {
    fn to_value(&self, _: &mut SerializeContext) -> Result<JsonValue, JsonError> {
        Ok(JsonValue::Bool(*self))
    }

    fn build_up(&mut self, value: &JsonValue, ctx: &mut BuildContext) -> Result<(), JsonError> {
        *self = Self::from_value(value, ctx)?;
        Ok(())
    }

    fn kind() -> DataKind {
        DataKind::Bool
    }
}

impl FromJson for bool {
    fn from_value(value: &JsonValue, ctx: &mut BuildContext) -> Result<Self, JsonError> {
        value
            .as_bool()
            .ok_or_else(|| ctx.coercion_error(value.kind(), "bool"))
    }
}

// -----------------------------------------------------------------------------
// Integers

// Integral floats such as `5.0` are accepted, out-of-range values are not.
macro_rules! impl_integer {
    ($($ty:ty),*) => {$(
        impl JsonData for $ty {
            fn to_value(&self, _: &mut SerializeContext) -> Result<JsonValue, JsonError> {
                Ok(JsonValue::from(*self))
            }

            fn build_up(&mut self, value: &JsonValue, ctx: &mut BuildContext) -> Result<(), JsonError> {
                *self = Self::from_value(value, ctx)?;
                Ok(())
            }

            fn kind() -> DataKind {
                DataKind::Integer
            }
        }

        impl FromJson for $ty {
            fn from_value(value: &JsonValue, ctx: &mut BuildContext) -> Result<Self, JsonError> {
                value
                    .as_number()
                    .and_then(Number::as_integral)
                    .and_then(|v| <$ty>::try_from(v).ok())
                    .ok_or_else(|| ctx.coercion_error(value.kind(), stringify!($ty)))
            }
        }
    )*};
}

impl_integer!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

// -----------------------------------------------------------------------------
// Floats

impl JsonData for f64 {
    fn to_value(&self, _: &mut SerializeContext) -> Result<JsonValue, JsonError> {
        JsonValue::from_f64(*self).ok_or(JsonError::NonFiniteNumber { value: *self })
    }

    fn build_up(&mut self, value: &JsonValue, ctx: &mut BuildContext) -> Result<(), JsonError> {
        *self = Self::from_value(value, ctx)?;
        Ok(())
    }

    fn kind() -> DataKind {
        DataKind::Float
    }
}

impl FromJson for f64 {
    fn from_value(value: &JsonValue, ctx: &mut BuildContext) -> Result<Self, JsonError> {
        value
            .as_f64()
            .ok_or_else(|| ctx.coercion_error(value.kind(), "f64"))
    }
}

impl JsonData for f32 {
    fn to_value(&self, _: &mut SerializeContext) -> Result<JsonValue, JsonError> {
        let value = f64::from(*self);
        JsonValue::from_f64(value).ok_or(JsonError::NonFiniteNumber { value })
    }

    fn build_up(&mut self, value: &JsonValue, ctx: &mut BuildContext) -> Result<(), JsonError> {
        *self = Self::from_value(value, ctx)?;
        Ok(())
    }

    fn kind() -> DataKind {
        DataKind::Float
    }
}

impl FromJson for f32 {
    fn from_value(value: &JsonValue, ctx: &mut BuildContext) -> Result<Self, JsonError> {
        value
            .as_f64()
            .map(|v| v as f32)
            .filter(|v| v.is_finite())
            .ok_or_else(|| ctx.coercion_error(value.kind(), "f32"))
    }
}

// -----------------------------------------------------------------------------
// Text

impl JsonData for char {
    fn to_value(&self, _: &mut SerializeContext) -> Result<JsonValue, JsonError> {
        Ok(JsonValue::String(self.to_string()))
    }

    fn build_up(&mut self, value: &JsonValue, ctx: &mut BuildContext) -> Result<(), JsonError> {
        *self = Self::from_value(value, ctx)?;
        Ok(())
    }

    fn kind() -> DataKind {
        DataKind::Char
    }
}

impl FromJson for char {
    /// Only a string of exactly one character is accepted.
    fn from_value(value: &JsonValue, ctx: &mut BuildContext) -> Result<Self, JsonError> {
        if let Some(text) = value.as_str() {
            let mut chars = text.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                return Ok(c);
            }
        }
        Err(ctx.coercion_error(value.kind(), "char"))
    }
}

impl JsonData for String {
    fn to_value(&self, _: &mut SerializeContext) -> Result<JsonValue, JsonError> {
        Ok(JsonValue::String(self.clone()))
    }

    /// Reuses the existing allocation.
    fn build_up(&mut self, value: &JsonValue, ctx: &mut BuildContext) -> Result<(), JsonError> {
        let text = value
            .as_str()
            .ok_or_else(|| ctx.coercion_error(value.kind(), "String"))?;
        self.clear();
        self.push_str(text);
        Ok(())
    }

    fn kind() -> DataKind {
        DataKind::String
    }
}

impl FromJson for String {
    fn from_value(value: &JsonValue, ctx: &mut BuildContext) -> Result<Self, JsonError> {
        value
            .as_str()
            .map(ToOwned::to_owned)
            .ok_or_else(|| ctx.coercion_error(value.kind(), "String"))
    }
}

// -----------------------------------------------------------------------------
// JsonValue

// Walks `value` only to apply the nesting limit.
fn check_nesting(value: &JsonValue, ctx: &mut SerializeContext) -> Result<(), JsonError> {
    match value {
        JsonValue::Array(items) => ctx.nest(|ctx| items.iter().try_for_each(|item| check_nesting(item, ctx))),
        JsonValue::Object(map) => ctx.nest(|ctx| map.values().try_for_each(|item| check_nesting(item, ctx))),
        _ => Ok(()),
    }
}

impl JsonData for JsonValue {
    fn to_value(&self, ctx: &mut SerializeContext) -> Result<JsonValue, JsonError> {
        check_nesting(self, ctx)?;
        Ok(self.clone())
    }

    fn build_up(&mut self, value: &JsonValue, _: &mut BuildContext) -> Result<(), JsonError> {
        value.clone_into(self);
        Ok(())
    }

    fn kind() -> DataKind {
        DataKind::Any
    }
}

impl FromJson for JsonValue {
    fn from_value(value: &JsonValue, _: &mut BuildContext) -> Result<Self, JsonError> {
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use crate::{BuildContext, FromJson, JsonError, JsonOptions, JsonValue, build_up, to_value};
    use vc_value::{JsonKind, parse};

    fn read<T: FromJson>(text: &str) -> Result<T, JsonError> {
        let options = JsonOptions::new();
        T::from_value(&parse(text).unwrap(), &mut BuildContext::new(&options))
    }

    #[test]
    fn integer_coercion() {
        assert_eq!(read::<i16>("5"), Ok(5));
        assert_eq!(read::<i16>("5.0"), Ok(5));
        assert_eq!(read::<u64>("18446744073709551615"), Ok(u64::MAX));
        assert_eq!(read::<i8>("-128"), Ok(-128));

        for text in ["128", "-1.5", "\"5\"", "true", "null"] {
            assert!(
                matches!(read::<i8>(text), Err(JsonError::Coercion { .. })),
                "{text} should not coerce to i8",
            );
        }
        assert!(read::<u8>("-1").is_err());
    }

    #[test]
    fn coercion_error_details() {
        assert_eq!(
            read::<u32>("\"five\""),
            Err(JsonError::Coercion {
                member: "$".into(),
                json_kind: JsonKind::String,
                target_type: "u32".into(),
            })
        );
    }

    #[test]
    fn floats_and_text() {
        assert_eq!(read::<f64>("3"), Ok(3.0));
        assert_eq!(read::<f32>("0.5"), Ok(0.5));
        assert!(read::<f32>("1e300").is_err());
        assert_eq!(read::<char>("\"é\""), Ok('é'));
        assert!(read::<char>("\"ab\"").is_err());
        assert!(read::<char>("\"\"").is_err());
        assert_eq!(read::<bool>("false"), Ok(false));
        assert_eq!(read::<String>("\"x\"").as_deref(), Ok("x"));
    }

    #[test]
    fn non_finite_floats_fail_to_serialize() {
        let options = JsonOptions::new();
        assert!(matches!(
            to_value(&f64::NAN, &options),
            Err(JsonError::NonFiniteNumber { .. })
        ));
        assert_eq!(to_value(&1.5f32, &options), Ok(JsonValue::from_f64(1.5).unwrap()));
    }

    #[test]
    fn raw_trees_obey_the_nesting_limit() {
        let tree = parse(r#"{"a":[[1]]}"#).unwrap();
        let options = JsonOptions::new().with_max_depth(3);
        assert_eq!(to_value(&tree, &options), Ok(tree.clone()));

        let err = to_value(&tree, &options.with_max_depth(2)).unwrap_err();
        assert!(matches!(err, JsonError::Text(vc_value::TextError::DepthExceeded(e)) if e.limit == 2));
    }

    #[test]
    fn string_build_up_replaces_content() {
        let options = JsonOptions::new();
        let mut text = String::from("old value");
        build_up(&mut text, &JsonValue::from("new"), &options).unwrap();
        assert_eq!(text, "new");
    }
}
