//! Item id allocation.

use satchel_shared::ItemId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out process-unique item ids.
///
/// Shared by every inventory on the server, so it must be callable from any
/// thread.
pub trait ItemIdAllocator: Send + Sync {
    /// Returns an id never returned before.
    fn next_id(&self) -> ItemId;
}

/// Monotonic counter allocator.
#[derive(Debug)]
pub struct SequentialItemIds {
    next: AtomicU64,
}

impl SequentialItemIds {
    /// Creates an allocator whose first id is `first`.
    #[must_use]
    pub const fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialItemIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl ItemIdAllocator for SequentialItemIds {
    fn next_id(&self) -> ItemId {
        ItemId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
