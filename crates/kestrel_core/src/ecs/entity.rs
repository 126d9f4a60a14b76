//! Entity identifiers and their allocator
//!
//! Entities carry no data of their own. An `EntityId` is an opaque integer
//! that gains meaning only through the components attached to it.

use once_cell::sync::Lazy;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Opaque entity identifier.
///
/// Ids are never recycled: once handed out by an [`EntityAllocator`] the same
/// value is not returned again for the life of that allocator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u64);

impl EntityId {
    /// Rebuild an id from its raw value (for logging or external bookkeeping).
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Process-wide allocator shared by registries that don't bring their own.
static SHARED_ALLOCATOR: Lazy<Arc<EntityAllocator>> =
    Lazy::new(|| Arc::new(EntityAllocator::new()));

/// Issues unique, monotonically increasing entity ids.
///
/// Allocation is a single atomic fetch-and-increment, so one allocator can be
/// shared between threads (and between registries) without a lock.
#[derive(Debug)]
pub struct EntityAllocator {
    next: AtomicU64,
}

impl EntityAllocator {
    /// Create an allocator whose first id is 1.
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// The allocator every `Registry::new()` uses.
    pub fn shared() -> Arc<EntityAllocator> {
        Arc::clone(&SHARED_ALLOCATOR)
    }

    /// Allocate the next id.
    #[inline]
    pub fn create(&self) -> EntityId {
        EntityId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> u64 {
        self.next.load(Ordering::Relaxed) - 1
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
