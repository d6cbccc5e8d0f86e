//! FIFO tier with a hashtable index.
//!
//! Entries are owned by an `AHashMap` keyed by object id. Eviction order is
//! kept in a separate queue of `(id, seq)` records. Removing an entry only
//! touches the map; its queue record goes stale and is skipped when it
//! reaches the head, the same way a queue entry is re-validated against the
//! hashtable before it is acted on.
//!
//! ```text
//! head (oldest, evicted first) -> [id:seq] -> [id:seq] -> ... -> tail (newest)
//! ```

use crate::object::{ObjId, TierEntry};
use crate::tier::BoundedTier;
use ahash::AHashMap;
use std::collections::VecDeque;

/// Stale queue records tolerated beyond twice the live entry count before the
/// queue is compacted.
const COMPACT_SLACK: usize = 64;

/// Queue record pointing at a map entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueueEntry {
    /// Id of the entry this record was created for.
    id: ObjId,
    /// Insertion sequence. Only the record matching the slot's sequence is live.
    seq: u64,
}

#[derive(Debug)]
struct Slot<E> {
    entry: E,
    seq: u64,
}

/// Bounded FIFO container used for every tier of the policy.
#[derive(Debug)]
pub struct FifoTier<E> {
    entries: AHashMap<ObjId, Slot<E>>,
    queue: VecDeque<QueueEntry>,
    next_seq: u64,
    occupied: u64,
    capacity: u64,
}

impl<E: TierEntry> FifoTier<E> {
    /// Create an empty tier with the given budget in bytes.
    pub fn new(capacity: u64) -> Self {
        Self {
            entries: AHashMap::new(),
            queue: VecDeque::new(),
            next_seq: 0,
            occupied: 0,
            capacity,
        }
    }

    /// Insert an entry, first aging out the oldest entries until it fits.
    ///
    /// Returns `false` without inserting if the entry is larger than the whole
    /// budget. An entry that is already present is left where it is.
    pub fn insert_evicting(&mut self, entry: E) -> bool {
        if self.entries.contains_key(&entry.id()) {
            return true;
        }
        if entry.size() > self.capacity {
            return false;
        }
        while self.occupied + entry.size() > self.capacity {
            if self.pop_oldest().is_none() {
                break;
            }
        }
        self.insert(entry);
        true
    }

    /// Remove and return the oldest entry.
    pub fn pop_oldest(&mut self) -> Option<E> {
        let id = self.to_evict()?.id();
        self.remove(id)
    }

    /// Iterate over live entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &E> + '_ {
        self.queue.iter().filter_map(|record| {
            self.entries
                .get(&record.id)
                .filter(|slot| slot.seq == record.seq)
                .map(|slot| &slot.entry)
        })
    }

    /// Drop stale records from the head of the queue.
    fn skip_stale(&mut self) {
        while let Some(head) = self.queue.front() {
            if self.is_live(head) {
                break;
            }
            self.queue.pop_front();
        }
    }

    #[inline]
    fn is_live(&self, record: &QueueEntry) -> bool {
        self.entries
            .get(&record.id)
            .is_some_and(|slot| slot.seq == record.seq)
    }

    fn maybe_compact(&mut self) {
        if self.queue.len() > self.entries.len() * 2 + COMPACT_SLACK {
            let entries = &self.entries;
            self.queue.retain(|record| {
                entries
                    .get(&record.id)
                    .is_some_and(|slot| slot.seq == record.seq)
            });
        }
    }
}

impl<E: TierEntry> BoundedTier<E> for FifoTier<E> {
    fn insert(&mut self, entry: E) -> &mut E {
        let id = entry.id();
        self.remove(id);

        let seq = self.next_seq;
        self.next_seq += 1;
        self.occupied += entry.size();
        self.queue.push_back(QueueEntry { id, seq });

        &mut self.entries.entry(id).or_insert(Slot { entry, seq }).entry
    }

    #[inline]
    fn find(&self, id: ObjId) -> Option<&E> {
        self.entries.get(&id).map(|slot| &slot.entry)
    }

    #[inline]
    fn find_mut(&mut self, id: ObjId) -> Option<&mut E> {
        self.entries.get_mut(&id).map(|slot| &mut slot.entry)
    }

    fn remove(&mut self, id: ObjId) -> Option<E> {
        let slot = self.entries.remove(&id)?;
        self.occupied -= slot.entry.size();
        self.maybe_compact();
        Some(slot.entry)
    }

    fn to_evict(&mut self) -> Option<&E> {
        self.skip_stale();
        let head = self.queue.front()?;
        self.entries.get(&head.id).map(|slot| &slot.entry)
    }

    #[inline]
    fn occupied_bytes(&self) -> u64 {
        self.occupied
    }

    #[inline]
    fn capacity(&self) -> u64 {
        self.capacity
    }

    fn resize(&mut self, capacity: u64) {
        self.capacity = capacity;
    }

    #[inline]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::GhostEntry;

    fn ghost(id: ObjId, size: u64) -> GhostEntry {
        GhostEntry { id, size }
    }

    #[test]
    fn test_tier_creation() {
        let tier: FifoTier<GhostEntry> = FifoTier::new(100);
        assert_eq!(tier.capacity(), 100);
        assert_eq!(tier.occupied_bytes(), 0);
        assert!(tier.is_empty());
        assert!(!tier.is_over_budget());
    }

    #[test]
    fn test_insert_find_remove() {
        let mut tier = FifoTier::new(100);
        tier.insert(ghost(1, 30));
        tier.insert(ghost(2, 20));

        assert_eq!(tier.len(), 2);
        assert_eq!(tier.occupied_bytes(), 50);
        assert_eq!(tier.find(1), Some(&ghost(1, 30)));
        assert!(tier.contains(2));

        assert_eq!(tier.remove(1), Some(ghost(1, 30)));
        assert_eq!(tier.remove(1), None);
        assert_eq!(tier.occupied_bytes(), 20);
        assert_eq!(tier.len(), 1);
    }

    #[test]
    fn test_fifo_order() {
        let mut tier = FifoTier::new(100);
        for id in 0..5 {
            tier.insert(ghost(id, 10));
        }

        for id in 0..5 {
            assert_eq!(tier.pop_oldest().map(|e| e.id), Some(id));
        }
        assert!(tier.pop_oldest().is_none());
    }

    #[test]
    fn test_to_evict_skips_removed() {
        let mut tier = FifoTier::new(100);
        tier.insert(ghost(1, 10));
        tier.insert(ghost(2, 10));
        tier.insert(ghost(3, 10));

        tier.remove(1);
        tier.remove(2);

        // Peek does not remove
        assert_eq!(tier.to_evict().map(|e| e.id), Some(3));
        assert_eq!(tier.to_evict().map(|e| e.id), Some(3));
        assert_eq!(tier.len(), 1);
    }

    #[test]
    fn test_reinsert_moves_to_tail() {
        let mut tier = FifoTier::new(100);
        tier.insert(ghost(1, 10));
        tier.insert(ghost(2, 10));

        // Re-inserting 1 must not double count its bytes
        tier.insert(ghost(1, 10));
        assert_eq!(tier.occupied_bytes(), 20);
        assert_eq!(tier.len(), 2);

        let order: Vec<_> = tier.iter().map(|e| e.id).collect();
        assert_eq!(order, vec![2, 1]);
    }

    #[test]
    fn test_over_budget_and_resize() {
        let mut tier = FifoTier::new(25);
        tier.insert(ghost(1, 10));
        tier.insert(ghost(2, 10));
        assert!(!tier.is_over_budget());

        tier.resize(15);
        assert_eq!(tier.capacity(), 15);
        assert!(tier.is_over_budget());
        // Resize never evicts
        assert_eq!(tier.len(), 2);
    }

    #[test]
    fn test_insert_evicting_ages_out_oldest() {
        let mut tier = FifoTier::new(30);
        assert!(tier.insert_evicting(ghost(1, 10)));
        assert!(tier.insert_evicting(ghost(2, 10)));
        assert!(tier.insert_evicting(ghost(3, 10)));
        assert!(tier.insert_evicting(ghost(4, 15)));

        assert!(!tier.contains(1));
        assert!(!tier.contains(2));
        assert!(tier.contains(3));
        assert!(tier.contains(4));
        assert_eq!(tier.occupied_bytes(), 25);
    }

    #[test]
    fn test_insert_evicting_rejects_oversized() {
        let mut tier = FifoTier::new(30);
        tier.insert_evicting(ghost(1, 10));
        assert!(!tier.insert_evicting(ghost(2, 31)));
        assert!(tier.contains(1));
        assert!(!tier.contains(2));
    }

    #[test]
    fn test_stale_records_are_compacted() {
        let mut tier = FifoTier::new(u64::MAX);
        tier.insert(ghost(0, 1));
        for round in 0..1000 {
            tier.insert(ghost(1, 1));
            tier.remove(1);
            assert!(tier.queue.len() <= tier.len() * 2 + COMPACT_SLACK + 1, "round {round}");
        }
        assert_eq!(tier.to_evict().map(|e| e.id), Some(0));
    }
}
