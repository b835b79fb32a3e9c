//! Type descriptors and the registry that caches them.
//!
//! - [`TypeDescriptor`]: the ordered wire members of one type.
//! - [`MemberDescriptor`]: one named member with its accessors.
//! - [`TypeRegistry`]: the shared, lock-protected cache of descriptors and
//!   wire names.
//!
//! ## auto_register
//!
//! See [`TypeRegistry::auto_register`]. The [`inventory`] crate collects
//! the marked types at link time; on platforms it does not support, no
//! type is found and nothing fails.
//!
//! [`inventory`]: https://docs.rs/inventory

// -----------------------------------------------------------------------------
// Modules

mod descriptor;
mod type_id_map;
mod type_registry;

// -----------------------------------------------------------------------------
// Exports

pub use descriptor::{MemberDescriptor, TypeDescriptor};
pub use type_registry::TypeRegistry;
