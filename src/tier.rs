//! Bounded tier interface.
//!
//! Every tier of the policy (Small, Main, Large and the ghost index) is a
//! capacity-limited container with the same operation set. The policy only
//! talks to tiers through this trait; [`crate::FifoTier`] is the one
//! implementation.
//!
//! Capacity is a budget, not a hard limit: `insert` always succeeds and the
//! caller is responsible for evicting until `occupied_bytes() <= capacity()`.

use crate::object::{ObjId, TierEntry};

/// A capacity-limited container ordered by insertion.
pub trait BoundedTier<E: TierEntry> {
    /// Insert an entry at the tail. An existing entry with the same id is
    /// replaced and moves to the tail.
    fn insert(&mut self, entry: E) -> &mut E;

    /// Look up an entry.
    fn find(&self, id: ObjId) -> Option<&E>;

    /// Look up an entry for in-place mutation. Does not reorder.
    fn find_mut(&mut self, id: ObjId) -> Option<&mut E>;

    /// Remove an entry, returning it if present.
    fn remove(&mut self, id: ObjId) -> Option<E>;

    /// The entry that would be evicted next (the oldest), without removing it.
    fn to_evict(&mut self) -> Option<&E>;

    /// Bytes currently charged against the tier.
    fn occupied_bytes(&self) -> u64;

    /// The tier's budget in bytes.
    fn capacity(&self) -> u64;

    /// Change the budget. Does not evict.
    fn resize(&mut self, capacity: u64);

    /// Number of entries held.
    fn len(&self) -> usize;

    /// Returns `true` if the tier holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the tier holds `id`.
    fn contains(&self, id: ObjId) -> bool {
        self.find(id).is_some()
    }

    /// Returns `true` if the tier holds more bytes than its budget.
    fn is_over_budget(&self) -> bool {
        self.occupied_bytes() > self.capacity()
    }
}
