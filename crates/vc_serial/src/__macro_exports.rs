//! Items used by code generated from `#[derive(Describe)]` and
//! [`impl_dyn_data!`](crate::impl_dyn_data). Not part of the public API.
#![doc(hidden)]

pub use alloc::boxed::Box;
pub use core::any::Any;
pub use core::result::Result;
pub use std::sync::OnceLock;

#[cfg(feature = "auto_register")]
pub mod auto_register {
    use crate::TypeInfo;

    pub use inventory;

    /// One type marked `#[json(auto_register)]`.
    pub struct __AutoRegisterFunc(pub fn() -> &'static TypeInfo);

    inventory::collect!(__AutoRegisterFunc);
}
