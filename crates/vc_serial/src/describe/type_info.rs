use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use bitflags::bitflags;

use crate::{DeclaredType, Describe, JsonData, Object};

// -----------------------------------------------------------------------------
// MemberInfo

bitflags! {
    /// How a member was declared, as seen by a
    /// [`DescribeStrategy`](crate::DescribeStrategy).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemberFlags: u8 {
        /// Declared `pub`.
        const PUBLIC  = 1 << 0;
        /// Marked `#[json(skip)]`.
        const SKIP    = 1 << 1;
        /// Marked `#[json(include)]`.
        const INCLUDE = 1 << 2;
    }
}

type Getter = fn(&dyn Object) -> Option<&dyn JsonData>;
type GetterMut = fn(&mut dyn Object) -> Option<&mut dyn JsonData>;

/// One member of a describable type, before any strategy is applied.
///
/// The accessors return `None` when handed an object of another type.
#[derive(Clone)]
pub struct MemberInfo {
    name: &'static str,
    rename: Option<&'static str>,
    flags: MemberFlags,
    declared_type: DeclaredType,
    get: Getter,
    get_mut: GetterMut,
}

impl MemberInfo {
    /// `T` is the member's declared type.
    pub fn new<T: JsonData>(
        name: &'static str,
        flags: MemberFlags,
        get: Getter,
        get_mut: GetterMut,
    ) -> Self {
        Self {
            name,
            rename: None,
            flags,
            declared_type: DeclaredType::of::<T>(),
            get,
            get_mut,
        }
    }

    /// The name to use under an attribute policy.
    #[inline]
    pub fn with_rename(mut self, rename: &'static str) -> Self {
        self.rename = Some(rename);
        self
    }

    /// The declared field name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn rename(&self) -> Option<&'static str> {
        self.rename
    }

    #[inline]
    pub fn flags(&self) -> MemberFlags {
        self.flags
    }

    #[inline]
    pub fn declared_type(&self) -> DeclaredType {
        self.declared_type
    }

    #[inline]
    pub fn getter(&self) -> Getter {
        self.get
    }

    #[inline]
    pub fn getter_mut(&self) -> GetterMut {
        self.get_mut
    }
}

impl fmt::Debug for MemberInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberInfo")
            .field("name", &self.name)
            .field("rename", &self.rename)
            .field("flags", &self.flags)
            .field("declared_type", &self.declared_type)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// TypeInfo

/// Static description of a describable type.
///
/// Built once per type, normally by `#[derive(Describe)]`, and kept in a
/// `'static` cell.
pub struct TypeInfo {
    type_id: TypeId,
    type_path: &'static str,
    type_name: &'static str,
    members: Box<[MemberInfo]>,
    construct: fn() -> Box<dyn Object>,
    // Each value is an `fn(Box<dyn Object>) -> Option<Box<U>>`, keyed by
    // the `TypeId` of `U`.
    upcasts: Vec<(TypeId, Box<dyn Any + Send + Sync>)>,
}

impl TypeInfo {
    /// `type_name` is the wire name written in the type tag.
    pub fn new<T: Describe>(
        type_name: &'static str,
        members: impl IntoIterator<Item = MemberInfo>,
    ) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_path: core::any::type_name::<T>(),
            type_name,
            members: members.into_iter().collect(),
            construct: || Box::new(T::default()),
            upcasts: Vec::new(),
        }
    }

    /// Lets a freshly built instance be returned as `Box<U>`, typically
    /// `Box<dyn Trait>`.
    pub fn with_upcast<U: ?Sized + 'static>(
        mut self,
        upcast: fn(Box<dyn Object>) -> Option<Box<U>>,
    ) -> Self {
        let key = TypeId::of::<U>();
        self.upcasts.retain(|(id, _)| *id != key);
        self.upcasts.push((key, Box::new(upcast)));
        self
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Full Rust path, for diagnostics.
    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.type_path
    }

    /// Wire name used in the type tag.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn members(&self) -> &[MemberInfo] {
        &self.members
    }

    /// A default instance of the type.
    #[inline]
    pub fn construct(&self) -> Box<dyn Object> {
        (self.construct)()
    }

    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    pub fn can_upcast<U: ?Sized + 'static>(&self) -> bool {
        let key = TypeId::of::<U>();
        self.upcasts.iter().any(|(id, _)| *id == key)
    }

    /// Converts an instance of this type to `Box<U>`.
    ///
    /// Returns `None` if no upcast to `U` was declared, or if `object` is
    /// not of this type.
    pub fn upcast<U: ?Sized + 'static>(&self, object: Box<dyn Object>) -> Option<Box<U>> {
        let key = TypeId::of::<U>();
        let (_, upcast) = self.upcasts.iter().find(|(id, _)| *id == key)?;
        let upcast = upcast.downcast_ref::<fn(Box<dyn Object>) -> Option<Box<U>>>()?;
        upcast(object)
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("type_path", &self.type_path)
            .field("type_name", &self.type_name)
            .field("members", &self.members)
            .field("upcasts", &self.upcasts.len())
            .finish()
    }
}
