use alloc::borrow::ToOwned;
use alloc::collections::{BTreeMap, VecDeque};
use alloc::string::String;
use alloc::vec::Vec;
use core::any::type_name;
use core::hash::BuildHasher;
use std::collections::HashMap;

use vc_value::{JsonMap, JsonValue};

use crate::{BuildContext, DataKind, FromJson, JsonData, JsonError, SerializeContext};

// -----------------------------------------------------------------------------
// Helpers

fn write_items<'a, T: JsonData>(
    items: impl Iterator<Item = &'a T>,
    ctx: &mut SerializeContext,
) -> Result<JsonValue, JsonError> {
    ctx.nest(|ctx| {
        items
            .map(|item| item.to_value(ctx))
            .collect::<Result<Vec<_>, _>>()
            .map(JsonValue::Array)
    })
}

fn read_items<T: FromJson, C: FromIterator<T>>(
    value: &JsonValue,
    ctx: &mut BuildContext,
) -> Result<C, JsonError> {
    let items = value
        .as_array()
        .ok_or_else(|| ctx.coercion_error(value.kind(), type_name::<C>()))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| ctx.with_index(i, |ctx| T::from_value(item, ctx)))
        .collect()
}

fn write_entries<'a, T: JsonData>(
    entries: impl Iterator<Item = (&'a String, &'a T)>,
    ctx: &mut SerializeContext,
) -> Result<JsonValue, JsonError> {
    ctx.nest(|ctx| {
        let mut map = JsonMap::new();
        for (key, item) in entries {
            map.insert(key.as_str(), item.to_value(ctx)?);
        }
        Ok(JsonValue::Object(map))
    })
}

fn read_entries<T: FromJson, C: FromIterator<(String, T)>>(
    value: &JsonValue,
    ctx: &mut BuildContext,
) -> Result<C, JsonError> {
    let map = value
        .as_object()
        .ok_or_else(|| ctx.coercion_error(value.kind(), type_name::<C>()))?;
    map.iter()
        .map(|(key, item)| {
            ctx.with_key(key, |ctx| T::from_value(item, ctx))
                .map(|item| (key.to_owned(), item))
        })
        .collect()
}

// -----------------------------------------------------------------------------
// Sequences

macro_rules! impl_sequence {
    ($($ty:ident),*) => {$(
        impl<T: FromJson> JsonData for $ty<T> {
            fn to_value(&self, ctx: &mut SerializeContext) -> Result<JsonValue, JsonError> {
                write_items(self.iter(), ctx)
            }

            /// Sequences have no partial update: the content is replaced.
            fn build_up(&mut self, value: &JsonValue, ctx: &mut BuildContext) -> Result<(), JsonError> {
                *self = read_items(value, ctx)?;
                Ok(())
            }

            fn kind() -> DataKind {
                DataKind::Sequence
            }
        }

        impl<T: FromJson> FromJson for $ty<T> {
            fn from_value(value: &JsonValue, ctx: &mut BuildContext) -> Result<Self, JsonError> {
                read_items(value, ctx)
            }
        }
    )*};
}

impl_sequence!(Vec, VecDeque);

// -----------------------------------------------------------------------------
// Maps

impl<T: FromJson> JsonData for BTreeMap<String, T> {
    fn to_value(&self, ctx: &mut SerializeContext) -> Result<JsonValue, JsonError> {
        write_entries(self.iter(), ctx)
    }

    fn build_up(&mut self, value: &JsonValue, ctx: &mut BuildContext) -> Result<(), JsonError> {
        *self = read_entries(value, ctx)?;
        Ok(())
    }

    fn kind() -> DataKind {
        DataKind::Map
    }
}

impl<T: FromJson> FromJson for BTreeMap<String, T> {
    fn from_value(value: &JsonValue, ctx: &mut BuildContext) -> Result<Self, JsonError> {
        read_entries(value, ctx)
    }
}

impl<T, S> JsonData for HashMap<String, T, S>
where
    T: FromJson,
    S: BuildHasher + Default + Send + Sync + 'static,
{
    /// Keys are written in sorted order so output does not depend on the
    /// hasher.
    fn to_value(&self, ctx: &mut SerializeContext) -> Result<JsonValue, JsonError> {
        let mut entries: Vec<(&String, &T)> = self.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        write_entries(entries.into_iter(), ctx)
    }

    fn build_up(&mut self, value: &JsonValue, ctx: &mut BuildContext) -> Result<(), JsonError> {
        *self = read_entries(value, ctx)?;
        Ok(())
    }

    fn kind() -> DataKind {
        DataKind::Map
    }
}

impl<T, S> FromJson for HashMap<String, T, S>
where
    T: FromJson,
    S: BuildHasher + Default + Send + Sync + 'static,
{
    fn from_value(value: &JsonValue, ctx: &mut BuildContext) -> Result<Self, JsonError> {
        read_entries(value, ctx)
    }
}
