use alloc::vec::Vec;

use crate::{JsonError, MemberDescriptor, MemberFlags, TypeDescriptor, TypeInfo};

/// Turns a [`TypeInfo`] into the [`TypeDescriptor`] used on the wire.
///
/// The registry calls this once per type and caches the result.
pub trait DescribeStrategy: Send + Sync + 'static {
    fn describe(&self, info: &'static TypeInfo) -> Result<TypeDescriptor, JsonError>;
}

// -----------------------------------------------------------------------------
// PublicMembers

/// Every `pub` member under its declared name, in declaration order.
///
/// `#[json(...)]` member attributes are ignored. This is the default
/// strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicMembers;

impl DescribeStrategy for PublicMembers {
    fn describe(&self, info: &'static TypeInfo) -> Result<TypeDescriptor, JsonError> {
        let members = info
            .members()
            .iter()
            .filter(|member| member.flags().contains(MemberFlags::PUBLIC))
            .map(|member| MemberDescriptor::from_info(member, member.name()))
            .collect();
        TypeDescriptor::new(info, members)
    }
}

// -----------------------------------------------------------------------------
// AttributePolicy

/// Selects members by their `#[json(...)]` attributes and applies
/// `rename`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributePolicy {
    opt_in: bool,
}

impl AttributePolicy {
    /// `pub` members and members marked `include`, minus those marked
    /// `skip`.
    #[inline]
    pub const fn opt_out() -> Self {
        Self { opt_in: false }
    }

    /// Only members marked `include`, whatever their visibility.
    #[inline]
    pub const fn opt_in() -> Self {
        Self { opt_in: true }
    }

    fn selects(&self, flags: MemberFlags) -> bool {
        if self.opt_in {
            flags.contains(MemberFlags::INCLUDE)
        } else {
            !flags.contains(MemberFlags::SKIP)
                && flags.intersects(MemberFlags::PUBLIC | MemberFlags::INCLUDE)
        }
    }
}

impl Default for AttributePolicy {
    #[inline]
    fn default() -> Self {
        Self::opt_out()
    }
}

impl DescribeStrategy for AttributePolicy {
    fn describe(&self, info: &'static TypeInfo) -> Result<TypeDescriptor, JsonError> {
        let members: Vec<_> = info
            .members()
            .iter()
            .filter(|member| self.selects(member.flags()))
            .map(|member| MemberDescriptor::from_info(member, member.rename().unwrap_or(member.name())))
            .collect();
        TypeDescriptor::new(info, members)
    }
}
