use alloc::boxed::Box;
use alloc::format;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

use hashbrown::HashMap;
use vc_value::{FixedHashState, JsonValue};

use crate::{BuildContext, DeclaredType, JsonData, JsonError, MemberInfo, Object, TypeInfo, guard};

type Getter = fn(&dyn Object) -> Option<&dyn JsonData>;
type GetterMut = fn(&mut dyn Object) -> Option<&mut dyn JsonData>;

// -----------------------------------------------------------------------------
// MemberDescriptor

/// A named, typed member with a getter and a setter.
#[derive(Clone)]
pub struct MemberDescriptor {
    name: &'static str,
    declared_type: DeclaredType,
    get: Getter,
    get_mut: GetterMut,
}

impl MemberDescriptor {
    pub fn new(name: &'static str, declared_type: DeclaredType, get: Getter, get_mut: GetterMut) -> Self {
        Self {
            name,
            declared_type,
            get,
            get_mut,
        }
    }

    /// The accessors and type of `info`, published under `name`.
    #[inline]
    pub fn from_info(info: &MemberInfo, name: &'static str) -> Self {
        Self::new(name, info.declared_type(), info.getter(), info.getter_mut())
    }

    /// Wire name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn declared_type(&self) -> DeclaredType {
        self.declared_type
    }

    /// Reads the member from `object`.
    pub fn get<'a>(&self, object: &'a dyn Object) -> Result<&'a dyn JsonData, JsonError> {
        (self.get)(object).ok_or_else(|| self.mismatch(object.object_info()))
    }

    /// Builds the member of `object` up from `value`.
    pub fn set(
        &self,
        object: &mut dyn Object,
        value: &JsonValue,
        ctx: &mut BuildContext,
    ) -> Result<(), JsonError> {
        let info = object.object_info();
        match (self.get_mut)(object) {
            Some(member) => member.build_up(value, ctx),
            None => Err(self.mismatch(info)),
        }
    }

    #[cold]
    fn mismatch(&self, info: &TypeInfo) -> JsonError {
        JsonError::argument(
            "object",
            format!("member `{}` cannot be read from `{}`", self.name, info.type_path()),
        )
    }
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// TypeDescriptor

/// The ordered member list of one type, as written on the wire.
///
/// Immutable once built. Member names are unique and never equal to
/// [`TYPE_TAG`](crate::TYPE_TAG).
pub struct TypeDescriptor {
    info: &'static TypeInfo,
    members: Box<[MemberDescriptor]>,
    index: HashMap<&'static str, usize, FixedHashState>,
}

impl TypeDescriptor {
    pub fn new(info: &'static TypeInfo, members: Vec<MemberDescriptor>) -> Result<Self, JsonError> {
        guard::not_empty("type_name", info.type_name())?;

        let mut index = HashMap::with_capacity_and_hasher(members.len(), FixedHashState);
        for (i, member) in members.iter().enumerate() {
            guard::not_empty("member", member.name)?;
            guard::not_reserved("member", member.name)?;
            if index.insert(member.name, i).is_some() {
                return Err(JsonError::argument(
                    "member",
                    format!("`{}` appears twice in `{}`", member.name, info.type_path()),
                ));
            }
        }

        Ok(Self {
            info,
            members: members.into_boxed_slice(),
            index,
        })
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        self.info
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.info.type_id()
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.info.type_name()
    }

    /// Members in output order.
    #[inline]
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.index.get(name).map(|&i| &self.members[i])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name())
            .field("type_path", &self.info.type_path())
            .field("members", &self.members)
            .finish()
    }
}
