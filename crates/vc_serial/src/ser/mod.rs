//! Object graph to [`JsonValue`] and text.
//!
//! Each call owns a [`SerializeContext`]. Objects are written through the
//! descriptor of their runtime type, so a `Box<dyn Object>` member is
//! written with the members of whatever it holds.
//!
//! Output never nests deeper than [`JsonOptions::max_depth`], so text
//! written with some options can be read back with the same options.

use alloc::format;
use alloc::string::{String, ToString};
use core::any::TypeId;
use core::ptr;

use hashbrown::HashSet;
use vc_value::{DepthExceededError, FixedHashState, JsonMap, JsonValue, TextError};

use crate::{BuildContext, FromJson, JsonData, JsonError, JsonOptions, Object, TYPE_TAG};

// -----------------------------------------------------------------------------
// SerializeContext

/// State of one serialization call.
///
/// Tracks the objects and shared pointers on the current path, keyed by
/// address and type, so that a self-referential graph fails with
/// [`JsonError::CycleDetected`] instead of recursing forever. A value
/// reachable twice through separate paths is not a cycle and is written
/// twice.
pub struct SerializeContext<'a> {
    options: &'a JsonOptions,
    visiting: HashSet<(usize, TypeId), FixedHashState>,
    depth: usize,
}

impl<'a> SerializeContext<'a> {
    #[inline]
    pub fn new(options: &'a JsonOptions) -> Self {
        Self {
            options,
            visiting: HashSet::with_hasher(FixedHashState),
            depth: 0,
        }
    }

    #[inline]
    pub fn options(&self) -> &'a JsonOptions {
        self.options
    }

    /// Runs `f` with `identity` marked as being written.
    pub fn visit<R>(
        &mut self,
        identity: (usize, TypeId),
        type_name: &'static str,
        f: impl FnOnce(&mut Self) -> Result<R, JsonError>,
    ) -> Result<R, JsonError> {
        if !self.visiting.insert(identity) {
            return Err(JsonError::CycleDetected { type_name });
        }
        let result = f(self);
        self.visiting.remove(&identity);
        result
    }

    /// Runs `f` one array or object level deeper.
    ///
    /// Fails with [`TextError::DepthExceeded`] past
    /// [`JsonOptions::max_depth`]. No text exists yet, so the reported
    /// offset is always 0.
    pub fn nest<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R, JsonError>) -> Result<R, JsonError> {
        let limit = self.options.max_depth();
        if self.depth >= limit {
            return Err(TextError::DepthExceeded(DepthExceededError { limit, offset: 0 }).into());
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Writes `object` as a JSON object through its runtime descriptor.
    ///
    /// The type tag comes first when type extension is enabled, then every
    /// member in descriptor order. Unset optional members are written as
    /// `null`.
    ///
    /// A type whose name is registered for another type cannot be tagged
    /// and fails with [`JsonError::Argument`].
    pub fn serialize_object(&mut self, object: &dyn Object) -> Result<JsonValue, JsonError> {
        let info = object.object_info();
        let identity = (ptr::from_ref(object).addr(), info.type_id());

        self.visit(identity, info.type_path(), |ctx| {
            let options = ctx.options;
            let registry = options.registry();
            let descriptor = registry.describe_object(object)?;
            let mut map = JsonMap::with_capacity(descriptor.len() + 1);
            if options.type_extension() {
                let name = descriptor.type_name();
                let owner = registry.resolve_by_name(name)?;
                if owner.type_id() != info.type_id() {
                    return Err(JsonError::argument(
                        "type_name",
                        format!(
                            "`{name}` is registered for `{}`, `{}` cannot be tagged with it",
                            owner.type_path(),
                            info.type_path(),
                        ),
                    ));
                }
                map.insert(TYPE_TAG, JsonValue::String(name.into()));
            }
            ctx.nest(|ctx| {
                for member in descriptor.members() {
                    let value = member.get(object)?.to_value(ctx)?;
                    map.insert(member.name(), value);
                }
                Ok(JsonValue::Object(map))
            })
        })
    }
}

// -----------------------------------------------------------------------------
// Entry points

/// Converts `value` to a value tree.
pub fn to_value<T: JsonData + ?Sized>(value: &T, options: &JsonOptions) -> Result<JsonValue, JsonError> {
    options.validate()?;
    value.to_value(&mut SerializeContext::new(options))
}

/// Converts `value` to JSON text, pretty-printed if
/// [`JsonOptions::pretty`] is set.
///
/// ```
/// use vc_serial::{JsonOptions, to_json};
///
/// let options = JsonOptions::new().with_pretty(true);
/// assert_eq!(to_json(&vec![1, 2], &options).unwrap(), "[\n  1,\n  2\n]");
/// ```
pub fn to_json<T: JsonData + ?Sized>(value: &T, options: &JsonOptions) -> Result<String, JsonError> {
    let tree = to_value(value, options)?;
    Ok(if options.pretty() {
        tree.to_pretty_string()
    } else {
        tree.to_string()
    })
}

/// Copies an object graph through its value tree, without going to text.
///
/// Shared pointers in the source are not shared in the copy.
pub fn deep_copy<T: FromJson>(value: &T, options: &JsonOptions) -> Result<T, JsonError> {
    let tree = to_value(value, options)?;
    T::from_value(&tree, &mut BuildContext::new(options))
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::{String, ToString};
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;
    use std::sync::RwLock;

    use crate::{Describe, JsonError, JsonOptions, JsonValue, Object, TypeRegistry};
    use crate::{deep_copy, downcast_object, read_object, to_json, to_value};

    #[derive(Describe, Default, Debug, Clone, PartialEq)]
    struct Tag {
        pub label: String,
        pub weight: Option<f64>,
    }

    #[derive(Describe, Default, Debug, PartialEq)]
    #[json(type_name = "Crate")]
    struct Parcel {
        pub id: u32,
        pub tags: Vec<Tag>,
        pub note: Option<String>,
    }

    #[derive(Describe, Default)]
    struct Node {
        pub name: String,
        pub next: Option<Arc<RwLock<Node>>>,
    }

    #[derive(Describe, Default, Debug, PartialEq)]
    struct Chain {
        pub next: Option<Box<Chain>>,
    }

    #[derive(Describe, Default)]
    #[json(type_name = "Shared")]
    struct First {
        pub a: u8,
    }

    mod other {
        use crate::Describe;

        #[derive(Describe, Default)]
        #[json(type_name = "Shared")]
        pub struct Second {
            pub b: u8,
        }
    }

    fn chain(len: usize) -> Chain {
        let mut head = Chain::default();
        for _ in 1..len {
            head = Chain { next: Some(Box::new(head)) };
        }
        head
    }

    fn fresh_options() -> JsonOptions {
        JsonOptions::new().with_registry(Arc::new(TypeRegistry::new()))
    }

    fn sample() -> Parcel {
        Parcel {
            id: 7,
            tags: vec![
                Tag { label: "fragile".into(), weight: Some(0.5) },
                Tag { label: "heavy".into(), weight: None },
            ],
            note: None,
        }
    }

    #[test]
    fn tag_first_and_nulls_written() {
        let text = to_json(&sample(), &JsonOptions::new()).unwrap();
        assert_eq!(
            text,
            concat!(
                r#"{"$type":"Crate","id":7,"tags":["#,
                r#"{"$type":"Tag","label":"fragile","weight":0.5},"#,
                r#"{"$type":"Tag","label":"heavy","weight":null}"#,
                r#"],"note":null}"#,
            )
        );

        let plain = to_json(&sample(), &JsonOptions::new().with_type_extension(false)).unwrap();
        assert_eq!(
            plain,
            r#"{"id":7,"tags":[{"label":"fragile","weight":0.5},{"label":"heavy","weight":null}],"note":null}"#
        );
    }

    #[test]
    fn output_is_deterministic() {
        let options = JsonOptions::new();
        let value = sample();
        let first = to_json(&value, &options).unwrap();
        for _ in 0..10 {
            assert_eq!(to_json(&value, &options).unwrap(), first);
        }
    }

    #[test]
    fn runtime_type_is_used() {
        let object: Box<dyn Object> = Box::new(Tag { label: "x".into(), weight: Some(1.0) });
        let tree = to_value(&object, &JsonOptions::new()).unwrap();
        assert_eq!(tree.get("$type").and_then(JsonValue::as_str), Some("Tag"));
        assert_eq!(tree.get("weight").and_then(JsonValue::as_f64), Some(1.0));
        assert_eq!(tree.to_string(), r#"{"$type":"Tag","label":"x","weight":1.0}"#);
    }

    #[test]
    fn cycles_fail() {
        let first = Arc::new(RwLock::new(Node { name: "a".into(), next: None }));
        let second = Arc::new(RwLock::new(Node { name: "b".into(), next: Some(first.clone()) }));
        first.write().unwrap().next = Some(second.clone());

        let err = to_json(&first, &JsonOptions::new()).unwrap_err();
        assert!(matches!(err, JsonError::CycleDetected { .. }));

        // Break the cycle so both nodes are freed.
        first.write().unwrap().next = None;
        assert_eq!(
            to_json(&second, &JsonOptions::new().with_type_extension(false)).unwrap(),
            r#"{"name":"b","next":{"name":"a","next":null}}"#
        );
    }

    #[test]
    fn shared_values_are_not_cycles() {
        let shared = Arc::new(Tag { label: "s".into(), weight: None });
        let list = vec![shared.clone(), shared];
        let text = to_json(&list, &JsonOptions::new().with_type_extension(false)).unwrap();
        assert_eq!(text, r#"[{"label":"s","weight":null},{"label":"s","weight":null}]"#);
    }

    #[test]
    fn non_finite_floats_fail() {
        let tag = Tag { label: "nan".into(), weight: Some(f64::NAN) };
        let err = to_json(&tag, &JsonOptions::new()).unwrap_err();
        assert!(matches!(err, JsonError::NonFiniteNumber { .. }));
    }

    #[test]
    fn invalid_options_fail() {
        let options = JsonOptions::new().with_max_depth(0);
        let err = to_json(&sample(), &options).unwrap_err();
        assert!(matches!(err, JsonError::Argument { name: "max_depth", .. }));
    }

    #[test]
    fn deep_copy_is_equal() {
        let value = sample();
        for options in [JsonOptions::new(), JsonOptions::new().with_type_extension(false)] {
            assert_eq!(deep_copy(&value, &options).unwrap(), value);
        }
    }

    #[test]
    fn taken_type_names_cannot_be_written() {
        let options = fresh_options();
        assert!(options.registry().register::<First>().unwrap());
        assert!(!options.registry().register::<other::Second>().unwrap());

        let err = to_json(&other::Second { b: 7 }, &options).unwrap_err();
        assert!(matches!(err, JsonError::Argument { name: "type_name", .. }));
        assert_eq!(to_json(&First { a: 1 }, &options).unwrap(), r#"{"$type":"Shared","a":1}"#);

        let plain = options.with_type_extension(false);
        assert_eq!(to_json(&other::Second { b: 7 }, &plain).unwrap(), r#"{"b":7}"#);
    }

    #[test]
    fn output_nesting_matches_the_read_limit() {
        let options = fresh_options();
        let long = chain(200);

        let err = to_json(&long, &options).unwrap_err();
        assert!(matches!(err, JsonError::Text(vc_value::TextError::DepthExceeded(e)) if e.limit == 128));

        let roomy = options.with_max_depth(200);
        let text = to_json(&long, &roomy).unwrap();
        let object = read_object(&text, &roomy, Some(Chain::type_info())).unwrap();
        assert_eq!(*downcast_object::<Chain>(object).unwrap(), long);

        let options = fresh_options();
        let text = to_json(&chain(128), &options).unwrap();
        assert!(read_object(&text, &options, None).is_ok());
    }
}
