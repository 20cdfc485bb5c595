//! Identifier types.

use core::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a [`crate::VfsFile`] handle.
///
/// Two handles for the same path compare equal only while the first one is
/// still alive; a later handle for that path gets a fresh id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct HandleId(NonZeroU64);

impl HandleId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NonZeroU64::new(NEXT.fetch_add(1, Ordering::Relaxed)).expect("handle id overflow"))
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

/// Identity of one mount in the mount table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct MountId(NonZeroU64);

impl MountId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NonZeroU64::new(NEXT.fetch_add(1, Ordering::Relaxed)).expect("mount id overflow"))
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0.get()
    }
}
