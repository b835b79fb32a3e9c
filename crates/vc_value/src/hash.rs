//! Fixed-seed hashing for string keys.
//!
//! Object keys are hashed with `foldhash` under a constant seed, so the
//! layout of a [`JsonMap`](crate::JsonMap) index never depends on process
//! randomness.

use core::hash::BuildHasher;

use foldhash::fast::{FixedState, FoldHasher};

const KEY_HASH_STATE: FixedState = FixedState::with_seed(0x6A09E667F3BCC908);

/// A [`BuildHasher`] with a constant seed.
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FoldHasher<'static>;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        KEY_HASH_STATE.build_hasher()
    }
}

#[inline]
pub(crate) fn hash_key(key: &str) -> u64 {
    FixedHashState.hash_one(key)
}
