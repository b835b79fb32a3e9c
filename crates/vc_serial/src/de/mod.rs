//! Text and value trees back to Rust data.
//!
//! - [`read_value`]: text to a [`JsonValue`], no target type.
//! - [`read_object`]: text to a fresh object whose type is given or read
//!   from the type tag.
//! - [`from_json`] / [`from_value`]: text or tree to a statically known type.
//! - [`build_up`]: apply a tree onto an existing instance.
//!
//! Build-up only touches members whose keys are present. Keys without a
//! matching member are ignored. A failed call may leave the members
//! assigned before the failure in place.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::type_name;
use core::fmt::Write;

use vc_value::{JsonKind, JsonValue, parse_with_depth};

use crate::{FromJson, JsonData, JsonError, JsonOptions, Object, TYPE_TAG, TypeInfo};

// -----------------------------------------------------------------------------
// BuildContext

enum Segment {
    Member(&'static str),
    Key(String),
    Index(usize),
}

/// State of one deserialization call.
///
/// Records the path to the value being built, such as `$.owner.tags[2]`,
/// which [`JsonError::Coercion`] reports.
pub struct BuildContext<'a> {
    options: &'a JsonOptions,
    path: Vec<Segment>,
}

impl<'a> BuildContext<'a> {
    #[inline]
    pub fn new(options: &'a JsonOptions) -> Self {
        Self {
            options,
            path: Vec::new(),
        }
    }

    #[inline]
    pub fn options(&self) -> &'a JsonOptions {
        self.options
    }

    fn with_segment<R>(&mut self, segment: Segment, f: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push(segment);
        let result = f(self);
        self.path.pop();
        result
    }

    #[inline]
    pub fn with_member<R>(&mut self, name: &'static str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.with_segment(Segment::Member(name), f)
    }

    #[inline]
    pub fn with_key<R>(&mut self, key: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.with_segment(Segment::Key(key.to_string()), f)
    }

    #[inline]
    pub fn with_index<R>(&mut self, index: usize, f: impl FnOnce(&mut Self) -> R) -> R {
        self.with_segment(Segment::Index(index), f)
    }

    /// The current path, `$` at the root.
    pub fn path(&self) -> String {
        let mut path = String::from("$");
        for segment in &self.path {
            // Writing to a `String` cannot fail.
            let _ = match segment {
                Segment::Member(name) => write!(path, ".{name}"),
                Segment::Key(key) => write!(path, ".{key}"),
                Segment::Index(index) => write!(path, "[{index}]"),
            };
        }
        path
    }

    /// A [`JsonError::Coercion`] at the current path.
    #[cold]
    pub fn coercion_error(&self, json_kind: JsonKind, target_type: impl Into<Cow<'static, str>>) -> JsonError {
        JsonError::Coercion {
            member: self.path(),
            json_kind,
            target_type: target_type.into(),
        }
    }

    /// Whether type extension is enabled and `value` is an object carrying
    /// the type tag.
    #[inline]
    pub fn has_type_tag(&self, value: &JsonValue) -> bool {
        self.options.type_extension() && value.as_object().is_some_and(|map| map.contains_key(TYPE_TAG))
    }

    // The type name in `value`, if type extension is enabled and the tag is
    // present.
    fn type_tag<'v>(&mut self, value: &'v JsonValue) -> Result<Option<&'v str>, JsonError> {
        if !self.options.type_extension() {
            return Ok(None);
        }
        match value.get(TYPE_TAG) {
            None => Ok(None),
            Some(JsonValue::String(name)) => Ok(Some(name)),
            Some(other) => Err(self.with_member(TYPE_TAG, |ctx| ctx.coercion_error(other.kind(), "type name"))),
        }
    }

    /// Assigns the members of `target` present in `value`.
    ///
    /// `value` must be an object and a type tag, when honored, a string.
    /// Below the root the tag must also resolve to the type of `target`. At
    /// the root the caller chose the target, so the tag is not looked up.
    pub fn build_object(&mut self, target: &mut dyn Object, value: &JsonValue) -> Result<(), JsonError> {
        let info = target.object_info();
        let Some(map) = value.as_object() else {
            return Err(self.coercion_error(value.kind(), info.type_path()));
        };

        if let Some(name) = self.type_tag(value)?
            && !self.path.is_empty()
            && name != info.type_name()
        {
            let tagged = self.options.registry().resolve_by_name(name)?;
            if tagged.type_id() != info.type_id() {
                return Err(self.coercion_error(JsonKind::Object, info.type_path()));
            }
        }

        let descriptor = self.options.registry().describe_object(target)?;
        for (key, item) in map {
            match descriptor.member(key) {
                Some(member) => self.with_member(member.name(), |ctx| member.set(target, item, ctx))?,
                None if key == TYPE_TAG => {}
                None => log::trace!("ignoring unknown key `{key}` at {} for `{}`", self.path(), info.type_path()),
            }
        }
        Ok(())
    }

    fn resolve_target(
        &mut self,
        value: &JsonValue,
        explicit: Option<&'static TypeInfo>,
    ) -> Result<&'static TypeInfo, JsonError> {
        if let Some(info) = explicit {
            return Ok(info);
        }
        if !self.options.type_extension() {
            return Err(JsonError::AmbiguousTarget);
        }
        match self.type_tag(value)? {
            Some(name) => self.options.registry().resolve_by_name(name),
            None => Err(JsonError::MissingTypeTag),
        }
    }

    /// Builds a fresh object from `value`.
    ///
    /// The type is `explicit` if given, otherwise the one named by the type
    /// tag.
    pub fn materialize(
        &mut self,
        value: &JsonValue,
        explicit: Option<&'static TypeInfo>,
    ) -> Result<Box<dyn Object>, JsonError> {
        let info = self.resolve_target(value, explicit)?;
        let mut object = info.construct();
        self.build_object(&mut *object, value)?;
        Ok(object)
    }

    /// Builds a fresh object from the type tag of `value` and returns it as
    /// `Box<U>`, usually `Box<dyn Trait>`.
    ///
    /// The tagged type must declare the conversion, see
    /// [`impl_dyn_data!`](crate::impl_dyn_data).
    pub fn materialize_polymorphic<U: ?Sized + 'static>(
        &mut self,
        value: &JsonValue,
    ) -> Result<Box<U>, JsonError> {
        let info = self.resolve_target(value, None)?;
        if !info.can_upcast::<U>() {
            return Err(self.coercion_error(JsonKind::Object, type_name::<Box<U>>()));
        }
        let mut object = info.construct();
        self.build_object(&mut *object, value)?;
        info.upcast::<U>(object)
            .ok_or_else(|| self.coercion_error(JsonKind::Object, type_name::<Box<U>>()))
    }
}

// -----------------------------------------------------------------------------
// Entry points

fn parse(text: &str, options: &JsonOptions) -> Result<JsonValue, JsonError> {
    options.validate()?;
    Ok(parse_with_depth(text, options.max_depth())?)
}

/// Parses `text` into a value tree, with the default nesting limit.
///
/// ```
/// let value = vc_serial::read_value(r#"{"a": [1, 2.5, null]}"#).unwrap();
/// assert_eq!(value.to_string(), r#"{"a":[1,2.5,null]}"#);
/// ```
#[inline]
pub fn read_value(text: &str) -> Result<JsonValue, JsonError> {
    Ok(vc_value::parse(text)?)
}

/// Parses `text` and builds a fresh object.
///
/// The target is `explicit` when given. Otherwise it is the type named by
/// the type tag of the root object, which requires type extension.
///
/// # Errors
///
/// - [`JsonError::AmbiguousTarget`]: no `explicit` type and type extension
///   disabled.
/// - [`JsonError::MissingTypeTag`]: no `explicit` type and no tag.
/// - [`JsonError::UnknownType`]: no `explicit` type and the tag names no
///   registered type.
pub fn read_object(
    text: &str,
    options: &JsonOptions,
    explicit: Option<&'static TypeInfo>,
) -> Result<Box<dyn Object>, JsonError> {
    let tree = parse(text, options)?;
    BuildContext::new(options).materialize(&tree, explicit)
}

/// Parses `text` into a `T`.
pub fn from_json<T: FromJson>(text: &str, options: &JsonOptions) -> Result<T, JsonError> {
    let tree = parse(text, options)?;
    from_value(&tree, options)
}

/// Builds a `T` from a value tree.
pub fn from_value<T: FromJson>(value: &JsonValue, options: &JsonOptions) -> Result<T, JsonError> {
    options.validate()?;
    T::from_value(value, &mut BuildContext::new(options))
}

/// Applies `value` onto `target`.
///
/// ```
/// use vc_serial::{Describe, JsonOptions, build_up, read_value};
///
/// #[derive(Describe, Default)]
/// struct Pair {
///     pub a: i32,
///     pub b: i32,
/// }
///
/// let mut pair = Pair { a: 1, b: 2 };
/// build_up(&mut pair, &read_value(r#"{"a": 9}"#).unwrap(), &JsonOptions::new()).unwrap();
/// assert_eq!((pair.a, pair.b), (9, 2));
/// ```
pub fn build_up<T: JsonData + ?Sized>(
    target: &mut T,
    value: &JsonValue,
    options: &JsonOptions,
) -> Result<(), JsonError> {
    options.validate()?;
    target.build_up(value, &mut BuildContext::new(options))
}

/// Parses `text` and applies it onto `target`.
pub fn build_up_from_str<T: JsonData + ?Sized>(
    target: &mut T,
    text: &str,
    options: &JsonOptions,
) -> Result<(), JsonError> {
    let tree = parse(text, options)?;
    target.build_up(&tree, &mut BuildContext::new(options))
}

/// Takes the concrete type back out of a [`read_object`] result.
pub fn downcast_object<T: Object>(object: Box<dyn Object>) -> Result<Box<T>, JsonError> {
    let found = object.object_info().type_path();
    object.downcast::<T>().ok_or_else(|| {
        JsonError::argument(
            "object",
            format!("expected `{}`, found `{found}`", type_name::<T>()),
        )
    })
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::{AttributePolicy, Describe, JsonError, JsonKind, JsonOptions, JsonValue, Object};
    use crate::{TypeRegistry, build_up, build_up_from_str, downcast_object, from_json, read_object};
    use crate::{from_value, read_value, to_json, to_value};

    fn options_with(registry: TypeRegistry) -> JsonOptions {
        JsonOptions::new().with_registry(Arc::new(registry))
    }

    fn options() -> JsonOptions {
        options_with(TypeRegistry::new())
    }

    #[derive(Describe, Default, Debug, Clone, PartialEq)]
    #[json(type_name = "Knife")]
    struct Knife {
        #[json(rename = "Name")]
        pub name: String,
        #[json(rename = "Code")]
        pub code: String,
        #[json(rename = "LevelOfSharpness")]
        pub level_of_sharpness: i16,
    }

    #[derive(Describe, Default, Debug, Clone, PartialEq)]
    struct Pet {
        pub name: String,
        pub age: u8,
    }

    #[derive(Describe, Default, Debug, Clone, PartialEq)]
    struct Owner {
        pub name: String,
        pub pet: Pet,
        pub spare: Option<Pet>,
        pub scores: Vec<i32>,
    }

    trait Product: Object {
        fn price(&self) -> u32;
    }

    crate::impl_dyn_data!(Product);

    #[derive(Describe, Default, Debug, PartialEq)]
    #[json(implements(dyn Product))]
    struct Spoon {
        pub size: u8,
    }

    impl Product for Spoon {
        fn price(&self) -> u32 {
            2
        }
    }

    #[derive(Describe, Default, Debug, PartialEq)]
    #[json(implements(dyn Product))]
    struct Cleaver {
        pub weight: f64,
    }

    impl Product for Cleaver {
        fn price(&self) -> u32 {
            40
        }
    }

    #[derive(Describe, Default)]
    struct Catalog {
        pub items: Vec<Box<dyn Product>>,
        pub featured: Option<Box<dyn Product>>,
    }

    fn owner() -> Owner {
        Owner {
            name: "Ann".into(),
            pet: Pet { name: "Rex".into(), age: 4 },
            spare: None,
            scores: vec![1, 2],
        }
    }

    #[test]
    fn knife_round_trip_through_type_tag() {
        let registry = TypeRegistry::with_strategy(AttributePolicy::opt_out());
        assert!(registry.register::<Knife>().unwrap());
        let options = options_with(registry);

        let knife = Knife {
            name: "Chef".into(),
            code: "K1".into(),
            level_of_sharpness: 5,
        };
        let text = to_json(&knife, &options).unwrap();
        assert_eq!(
            text,
            r#"{"$type":"Knife","Name":"Chef","Code":"K1","LevelOfSharpness":5}"#
        );

        let object = read_object(&text, &options, None).unwrap();
        assert_eq!(object.object_info().type_name(), "Knife");
        assert_eq!(*downcast_object::<Knife>(object).unwrap(), knife);
    }

    #[test]
    fn round_trip_with_and_without_type_extension() {
        let value = owner();
        for options in [options(), options().with_type_extension(false)] {
            let text = to_json(&value, &options).unwrap();
            let object = read_object(&text, &options, Some(Owner::type_info())).unwrap();
            assert_eq!(*downcast_object::<Owner>(object).unwrap(), value);
            assert_eq!(from_json::<Owner>(&text, &options).unwrap(), value);
        }
    }

    #[test]
    fn target_resolution_errors() {
        let options = options();
        options.registry().register::<Pet>().unwrap();

        let err = read_object(r#"{"name":"Rex"}"#, &options, None).unwrap_err();
        assert_eq!(err, JsonError::MissingTypeTag);

        let err = read_object(r#"{"$type":"Fork"}"#, &options, None).unwrap_err();
        assert_eq!(err, JsonError::UnknownType { name: "Fork".into() });

        let plain = options.clone().with_type_extension(false);
        let err = read_object(r#"{"$type":"Pet"}"#, &plain, None).unwrap_err();
        assert_eq!(err, JsonError::AmbiguousTarget);

        // The tag is accepted anywhere in the object.
        let object = read_object(r#"{"age":2,"$type":"Pet"}"#, &options, None).unwrap();
        assert_eq!(downcast_object::<Pet>(object).unwrap().age, 2);

        let object = read_object(r#"{"$type":"Pet"}"#, &options, None).unwrap();
        let err = downcast_object::<Owner>(object).unwrap_err();
        assert!(matches!(err, JsonError::Argument { name: "object", .. }));
    }

    #[test]
    fn partial_update_is_idempotent() {
        let options = options();
        let update = read_value(r#"{"name":"Bea"}"#).unwrap();

        let mut target = owner();
        build_up(&mut target, &update, &options).unwrap();
        let once = target.clone();
        build_up(&mut target, &update, &options).unwrap();

        assert_eq!(target, once);
        assert_eq!(target.name, "Bea");
        assert_eq!(target.pet, owner().pet);
        assert_eq!(target.scores, [1, 2]);
    }

    #[test]
    fn nested_objects_are_built_in_place() {
        let options = options();
        let mut target = owner();

        build_up_from_str(&mut target, r#"{"pet":{"age":5},"scores":[7]}"#, &options).unwrap();
        assert_eq!(target.pet, Pet { name: "Rex".into(), age: 5 });
        assert_eq!(target.scores, [7]);

        build_up_from_str(&mut target, r#"{"spare":{"name":"Tom"}}"#, &options).unwrap();
        assert_eq!(target.spare, Some(Pet { name: "Tom".into(), age: 0 }));

        build_up_from_str(&mut target, r#"{"spare":{"age":1}}"#, &options).unwrap();
        assert_eq!(target.spare, Some(Pet { name: "Tom".into(), age: 1 }));

        build_up_from_str(&mut target, r#"{"spare":null}"#, &options).unwrap();
        assert_eq!(target.spare, None);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let options = options();
        let mut target = owner();
        build_up_from_str(&mut target, r#"{"color":"red","pet":{"legs":4}}"#, &options).unwrap();
        assert_eq!(target, owner());
    }

    #[test]
    fn coercion_errors_carry_the_path() {
        let options = options();
        let mut target = owner();

        let err = build_up_from_str(&mut target, r#"{"name":"Cid","pet":{"age":"old"}}"#, &options).unwrap_err();
        assert_eq!(
            err,
            JsonError::Coercion {
                member: "$.pet.age".into(),
                json_kind: JsonKind::String,
                target_type: "u8".into(),
            }
        );
        // Not transactional: earlier members stay assigned.
        assert_eq!(target.name, "Cid");

        let err = build_up_from_str(&mut target, r#"{"scores":[1,null]}"#, &options).unwrap_err();
        assert!(matches!(err, JsonError::Coercion { member, json_kind: JsonKind::Null, .. } if member == "$.scores[1]"));

        let err = build_up_from_str(&mut target, r#"{"pet":[]}"#, &options).unwrap_err();
        assert!(matches!(err, JsonError::Coercion { member, json_kind: JsonKind::Array, .. } if member == "$.pet"));

        let err = build_up_from_str(&mut target, r#"{"$type":5}"#, &options).unwrap_err();
        assert!(matches!(err, JsonError::Coercion { member, .. } if member == "$.$type"));
    }

    #[test]
    fn explicit_root_target_ignores_the_tag() {
        let options = options();
        options.registry().register::<Owner>().unwrap();

        let object = read_object(r#"{"$type":"Fork","age":2}"#, &options, Some(Pet::type_info())).unwrap();
        assert_eq!(downcast_object::<Pet>(object).unwrap().age, 2);

        let object = read_object(r#"{"$type":"Owner","age":3}"#, &options, Some(Pet::type_info())).unwrap();
        assert_eq!(downcast_object::<Pet>(object).unwrap().age, 3);

        let mut pet = Pet::default();
        build_up_from_str(&mut pet, r#"{"$type":"Fork","age":4}"#, &options).unwrap();
        assert_eq!(pet.age, 4);

        // A malformed tag is still rejected.
        let err = build_up_from_str(&mut pet, r#"{"$type":1}"#, &options).unwrap_err();
        assert!(matches!(err, JsonError::Coercion { member, .. } if member == "$.$type"));
    }

    #[test]
    fn tag_must_match_a_concrete_target() {
        let options = options();
        options.registry().register::<Owner>().unwrap();
        options.registry().register::<Pet>().unwrap();

        let mut target = owner();
        build_up_from_str(&mut target, r#"{"$type":"Owner","pet":{"$type":"Pet","age":9}}"#, &options).unwrap();
        assert_eq!(target.pet.age, 9);

        let err = build_up_from_str(&mut target, r#"{"pet":{"$type":"Owner"}}"#, &options).unwrap_err();
        assert!(matches!(err, JsonError::Coercion { member, .. } if member == "$.pet"));

        // Without type extension the tag is just an unknown key.
        let plain = options.clone().with_type_extension(false);
        build_up_from_str(&mut target, r#"{"pet":{"$type":"Owner","age":3}}"#, &plain).unwrap();
        assert_eq!(target.pet.age, 3);
    }

    #[test]
    fn polymorphic_sequence_round_trip() {
        let options = options();
        let registry = options.registry();
        registry.register::<Catalog>().unwrap();
        registry.register::<Spoon>().unwrap();
        registry.register::<Cleaver>().unwrap();

        let catalog = Catalog {
            items: vec![Box::new(Spoon { size: 3 }), Box::new(Cleaver { weight: 1.5 })],
            featured: None,
        };
        let text = to_json(&catalog, &options).unwrap();
        assert_eq!(
            text,
            r#"{"$type":"Catalog","items":[{"$type":"Spoon","size":3},{"$type":"Cleaver","weight":1.5}],"featured":null}"#
        );

        let object = read_object(&text, &options, None).unwrap();
        let back = downcast_object::<Catalog>(object).unwrap();
        assert_eq!(back.items.len(), 2);
        assert_eq!(back.items[0].as_any().downcast_ref::<Spoon>(), Some(&Spoon { size: 3 }));
        assert_eq!(back.items[1].as_any().downcast_ref::<Cleaver>(), Some(&Cleaver { weight: 1.5 }));
        let total: u32 = back.items.iter().map(|item| item.price()).sum();
        assert_eq!(total, 42);

        let untagged = from_json::<Vec<Box<dyn Product>>>(r#"[{"size":3}]"#, &options);
        assert!(matches!(untagged, Err(JsonError::MissingTypeTag)));

        let tree = read_value(&text).unwrap();
        let items = tree.get("items").unwrap();
        let objects = from_value::<Vec<Box<dyn Object>>>(items, &options).unwrap();
        assert!(objects[0].is::<Spoon>());
        assert!(objects[1].is::<Cleaver>());
    }

    #[test]
    fn polymorphic_members_are_replaced_or_built_in_place() {
        let options = options();
        options.registry().register::<Spoon>().unwrap();
        options.registry().register::<Cleaver>().unwrap();
        options.registry().register::<Knife>().unwrap();

        let mut catalog = Catalog {
            items: vec![],
            featured: Some(Box::new(Spoon { size: 1 })),
        };

        build_up_from_str(&mut catalog, r#"{"featured":{"size":8}}"#, &options).unwrap();
        let featured = catalog.featured.as_ref().unwrap();
        assert_eq!(featured.as_any().downcast_ref::<Spoon>(), Some(&Spoon { size: 8 }));

        build_up_from_str(&mut catalog, r#"{"featured":{"$type":"Cleaver","weight":2.0}}"#, &options).unwrap();
        let featured = catalog.featured.as_ref().unwrap();
        assert_eq!(featured.as_any().downcast_ref::<Cleaver>(), Some(&Cleaver { weight: 2.0 }));

        // `Knife` does not declare `implements(dyn Product)`.
        let err = build_up_from_str(&mut catalog, r#"{"featured":{"$type":"Knife"}}"#, &options).unwrap_err();
        assert!(matches!(err, JsonError::Coercion { member, .. } if member == "$.featured"));
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let deep = "[".repeat(100_000);
        let err = read_value(&deep).unwrap_err();
        assert!(matches!(err, JsonError::Text(vc_value::TextError::DepthExceeded(e)) if e.limit == 128));

        let options = options().with_max_depth(4);
        assert!(from_json::<JsonValue>("[[[[1]]]]", &options).is_ok());
        let err = from_json::<JsonValue>("[[[[[1]]]]]", &options).unwrap_err();
        assert!(matches!(err, JsonError::Text(vc_value::TextError::DepthExceeded(_))));
    }

    #[test]
    fn value_tree_entry_points() {
        let options = options().with_type_extension(false);
        let tree = to_value(&owner(), &options).unwrap();
        assert_eq!(tree.get("pet").and_then(|pet| pet.get("age")).and_then(JsonValue::as_u64), Some(4));

        let mut target = Owner::default();
        build_up(&mut target, &tree, &options).unwrap();
        assert_eq!(target, owner());
    }
}
