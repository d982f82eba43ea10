//! Ordered sequence of pending entries (§4.3)
//!
//! Sorted ascending by `(deadline, insertion order)`. All operations
//! assume the caller already holds the clock lock — `EntryQueue` itself
//! has no internal locking, it is simply the payload of the
//! `Mutex<EntryQueue>` inside `Clock`.

use std::sync::Arc;

use crate::entry::Entry;

pub struct EntryQueue {
    entries: Vec<Arc<Entry>>,
}

impl EntryQueue {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert keeping ascending deadline order; on a tie, after all
    /// equal-deadline entries already present (stable
    /// later-arrival-later-position).
    pub fn insert_sorted(&mut self, entry: Arc<Entry>) {
        let deadline = entry.deadline_ns();
        let idx = self.entries.partition_point(|e| e.deadline_ns() <= deadline);
        self.entries.insert(idx, entry);
    }

    pub fn head(&self) -> Option<Arc<Entry>> {
        self.entries.first().cloned()
    }

    /// Remove the given entry by identity. Returns `true` if found.
    pub fn remove(&mut self, entry: &Arc<Entry>) -> bool {
        if let Some(idx) = self.entries.iter().position(|e| e.id() == entry.id()) {
            self.entries.remove(idx);
            true
        } else {
            false
        }
    }

    /// Re-sort in place after one entry's deadline changed (periodic
    /// advance, §4.6). A stable sort keeps entries that didn't move
    /// relative to each other, which preserves the arrival-order
    /// tiebreak for everyone but the one entry that was rearmed.
    pub fn resort(&mut self) {
        self.entries.sort_by_key(|e| e.deadline_ns());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drain all entries, in queue order, for disposal (§4.5 `disposal`).
    pub fn drain(&mut self) -> Vec<Arc<Entry>> {
        std::mem::take(&mut self.entries)
    }
}

impl Default for EntryQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Entry;

    #[test]
    fn insert_sorted_keeps_ascending_order() {
        let mut q = EntryQueue::new();
        q.insert_sorted(Arc::new(Entry::single(300, None)));
        q.insert_sorted(Arc::new(Entry::single(100, None)));
        q.insert_sorted(Arc::new(Entry::single(200, None)));

        assert_eq!(q.head().unwrap().deadline_ns(), 100);
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn ties_broken_by_arrival_order() {
        let mut q = EntryQueue::new();
        let first = Arc::new(Entry::single(100, None));
        let second = Arc::new(Entry::single(100, None));
        q.insert_sorted(first.clone());
        q.insert_sorted(second.clone());

        // The arrival order is preserved for equal deadlines.
        assert_eq!(q.head().unwrap().id(), first.id());
        q.remove(&first);
        assert_eq!(q.head().unwrap().id(), second.id());
    }

    #[test]
    fn remove_returns_false_when_absent() {
        let mut q = EntryQueue::new();
        let e = Arc::new(Entry::single(100, None));
        assert!(!q.remove(&e));
    }

    #[test]
    fn resort_reflects_deadline_mutation() {
        let mut q = EntryQueue::new();
        let a = Arc::new(Entry::single(100, None));
        let b = Arc::new(Entry::single(200, None));
        q.insert_sorted(a.clone());
        q.insert_sorted(b.clone());

        {
            let mut guard = a.lock();
            guard.deadline_ns = 300;
        }
        q.resort();

        assert_eq!(q.head().unwrap().id(), b.id());
    }

    #[test]
    fn drain_empties_the_queue() {
        let mut q = EntryQueue::new();
        q.insert_sorted(Arc::new(Entry::single(100, None)));
        q.insert_sorted(Arc::new(Entry::single(200, None)));
        let drained = q.drain();
        assert_eq!(drained.len(), 2);
        assert!(q.is_empty());
    }
}
