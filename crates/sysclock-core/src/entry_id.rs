//! Timer entry identifier

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Globally unique identifier for a scheduled [`Entry`](crate) / timer.
///
/// Assigned once, at entry construction, and never reused. Besides
/// identifying an entry in logs it is also the tiebreaker the
/// `EntryQueue` uses for deterministic, stable ordering of entries that
/// share a deadline: entries compare by `(deadline, id)`, and ids are
/// handed out in construction order, so equal-deadline entries keep
/// their arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(u64);

impl EntryId {
    /// Generate a new, never-before-seen entry id.
    #[inline]
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        EntryId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value, for logging.
    #[inline]
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
