//! Entry status and scheduler wait-outcome enums
//!
//! These are two distinct enums on purpose. `EntryStatus` is the
//! internal state machine stored under an entry's lock (§3 of the
//! design doc); `WaitOutcome` is what the three public scheduler
//! operations (`wait_sync`, `wait_async`, `unschedule`) return to
//! callers. They overlap in name but not in role: `Done` is a status
//! an entry can rest in but never a value `WaitCore` returns, and
//! `Error` is an outcome a caller can observe but never a status an
//! entry holds.

use crate::error::ClockError;
use core::fmt;

/// Status of a single [`Entry`](crate), guarded by the entry's own lock.
///
/// Transitions: `OK -> Busy` only by the thread currently waiting on
/// the entry (sync waiter or dispatcher); `Busy -> {Done, Early, OK}`
/// only by that same thread. Any thread may push any non-terminal
/// status to `Unscheduled`, and once there it is sticky.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Freshly created, or re-armed after a periodic fire. Not yet waited on.
    Ok,
    /// A wait is currently in flight on this entry's wait primitive.
    Busy,
    /// The entry fired and (for single-shot entries) has run its course.
    Done,
    /// The wait returned below the platform's minimum wait floor.
    Early,
    /// Cancelled. Sticky: once set, never transitions away.
    Unscheduled,
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryStatus::Ok => "ok",
            EntryStatus::Busy => "busy",
            EntryStatus::Done => "done",
            EntryStatus::Early => "early",
            EntryStatus::Unscheduled => "unscheduled",
        };
        f.write_str(s)
    }
}

/// Outcome of a scheduler wait operation, returned to callers.
///
/// `Busy` is never meant to escape the dispatcher — it is the value
/// `WaitCore` returns when a newer, earlier head preempted an
/// in-flight async wait, and the dispatcher consumes it internally
/// (§4.6) by re-peeking the queue head. A sync waiter that ever
/// observes it has found a bug, and it is logged, not propagated.
#[derive(Debug, Clone)]
pub enum WaitOutcome {
    /// Wait completed at or after the deadline.
    Ok,
    /// Wait returned below the platform wait floor; fire immediately.
    Early,
    /// A newer in-flight wait preempted this one (dispatcher-internal).
    Busy,
    /// The entry was cancelled before or during the wait.
    Unscheduled,
    /// The operation could not proceed.
    Err(ClockError),
}

/// Manual, not derived: `ClockError` wraps `std::io::Error` which has
/// no `PartialEq`, so the four plain-data variants compare structurally
/// and two `Err(_)` values are never equal to each other — callers that
/// need to distinguish error causes match on the variant directly.
impl PartialEq for WaitOutcome {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (WaitOutcome::Ok, WaitOutcome::Ok)
                | (WaitOutcome::Early, WaitOutcome::Early)
                | (WaitOutcome::Busy, WaitOutcome::Busy)
                | (WaitOutcome::Unscheduled, WaitOutcome::Unscheduled)
        )
    }
}

impl WaitOutcome {
    /// True for the two outcomes that mean "the deadline was reached".
    pub fn is_fired(&self) -> bool {
        matches!(self, WaitOutcome::Ok | WaitOutcome::Early)
    }

    pub fn is_unscheduled(&self) -> bool {
        matches!(self, WaitOutcome::Unscheduled)
    }
}

impl From<ClockError> for WaitOutcome {
    fn from(e: ClockError) -> Self {
        WaitOutcome::Err(e)
    }
}

impl fmt::Display for WaitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitOutcome::Ok => write!(f, "ok"),
            WaitOutcome::Early => write!(f, "early"),
            WaitOutcome::Busy => write!(f, "busy"),
            WaitOutcome::Unscheduled => write!(f, "unscheduled"),
            WaitOutcome::Err(e) => write!(f, "error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_fired_matches_ok_and_early() {
        assert!(WaitOutcome::Ok.is_fired());
        assert!(WaitOutcome::Early.is_fired());
        assert!(!WaitOutcome::Busy.is_fired());
        assert!(!WaitOutcome::Unscheduled.is_fired());
    }

    #[test]
    fn status_display() {
        assert_eq!(EntryStatus::Unscheduled.to_string(), "unscheduled");
    }
}
