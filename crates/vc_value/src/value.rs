use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;

use crate::{JsonKind, JsonMap, Number};

// -----------------------------------------------------------------------------
// JsonValue

/// A parsed JSON document, independent of any target type.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum JsonValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<JsonValue>),
    Object(JsonMap),
}

impl JsonValue {
    pub const fn kind(&self) -> JsonKind {
        match self {
            JsonValue::Null => JsonKind::Null,
            JsonValue::Bool(_) => JsonKind::Bool,
            JsonValue::Number(_) => JsonKind::Number,
            JsonValue::String(_) => JsonKind::String,
            JsonValue::Array(_) => JsonKind::Array,
            JsonValue::Object(_) => JsonKind::Object,
        }
    }

    /// `None` for NaN and infinities.
    #[inline]
    pub fn from_f64(value: f64) -> Option<Self> {
        Number::from_f64(value).map(JsonValue::Number)
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }

    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            JsonValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_number(&self) -> Option<&Number> {
        match self {
            JsonValue::Number(n) => Some(n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    #[inline]
    pub fn as_u64(&self) -> Option<u64> {
        self.as_number().and_then(Number::as_u64)
    }

    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::as_f64)
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::Array(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array_mut(&mut self) -> Option<&mut Vec<JsonValue>> {
        match self {
            JsonValue::Array(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_object(&self) -> Option<&JsonMap> {
        match self {
            JsonValue::Object(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object_mut(&mut self) -> Option<&mut JsonMap> {
        match self {
            JsonValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` if this is an object.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Replaces `self` with `Null` and returns the old value.
    #[inline]
    pub fn take(&mut self) -> JsonValue {
        core::mem::take(self)
    }
}

// -----------------------------------------------------------------------------
// Conversion

impl From<bool> for JsonValue {
    #[inline]
    fn from(value: bool) -> Self {
        JsonValue::Bool(value)
    }
}

impl From<Number> for JsonValue {
    #[inline]
    fn from(value: Number) -> Self {
        JsonValue::Number(value)
    }
}

impl From<String> for JsonValue {
    #[inline]
    fn from(value: String) -> Self {
        JsonValue::String(value)
    }
}

impl From<&str> for JsonValue {
    #[inline]
    fn from(value: &str) -> Self {
        JsonValue::String(value.to_owned())
    }
}

impl From<Vec<JsonValue>> for JsonValue {
    #[inline]
    fn from(value: Vec<JsonValue>) -> Self {
        JsonValue::Array(value)
    }
}

impl From<JsonMap> for JsonValue {
    #[inline]
    fn from(value: JsonMap) -> Self {
        JsonValue::Object(value)
    }
}

impl<T: Into<JsonValue>> From<Option<T>> for JsonValue {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(JsonValue::Null, Into::into)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {$(
        impl From<$ty> for JsonValue {
            #[inline]
            fn from(value: $ty) -> Self {
                JsonValue::Number(Number::from(value))
            }
        }
    )*};
}

impl_from_integer!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);
