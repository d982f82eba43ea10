//! Scheduler operations on [`Clock`]: `wait_sync`, `wait_async`,
//! `unschedule` (§4.5).
//!
//! Lock order throughout: clock lock, then entry lock — never the
//! reverse, and the clock lock is always dropped before blocking in
//! `wait_on_entry` or invoking a callback (§5).

use std::sync::Arc;

use sysclock_core::{ctrace, ClockError, EntryStatus, WaitOutcome};

use crate::clock::Clock;
use crate::entry::Entry;
use crate::wait::wait_on_entry;

impl Clock {
    /// Block the calling thread until `entry` fires, is preempted by a
    /// later submission, or is unscheduled (§4.5 `wait_sync`).
    ///
    /// `entry` is not inserted into the queue — sync waits are a
    /// direct wait on the caller's own entry, mirroring the design
    /// doc's framing of `wait_sync` as "the caller *is* the waiter".
    pub fn wait_sync(&self, entry: &Arc<Entry>) -> WaitOutcome {
        {
            let _state = self.clock_lock();
            entry.ensure_initialized();
        }

        let mut guard = entry.lock();
        if guard.status == EntryStatus::Unscheduled {
            return WaitOutcome::Unscheduled;
        }
        guard.status = EntryStatus::Busy;

        let (outcome, jitter) =
            wait_on_entry(entry, guard, &*self.time_source(), true, &self.wait_config);
        ctrace!("wait_sync entry {} -> {:?} (jitter {}ns)", entry.id(), outcome, jitter);
        outcome
    }

    /// Submit `entry` to the dispatcher thread, starting it if
    /// necessary, and return once the entry is queued (§4.5
    /// `wait_async`). The dispatcher thread — not this call — invokes
    /// the entry's callback when it fires.
    pub fn wait_async(self: &Arc<Self>, entry: Arc<Entry>) -> WaitOutcome {
        let mut state = self.clock_lock();

        if let Err(ClockError::DispatcherSpawnFailed(e)) = self.ensure_dispatcher_started(&mut state) {
            return WaitOutcome::Err(ClockError::DispatcherSpawnFailed(e));
        }

        entry.ensure_initialized();

        if entry.is_unscheduled() {
            return WaitOutcome::Unscheduled;
        }

        let prev_head = state.queue.head();
        state.queue.insert_sorted(entry.clone());
        let became_head = state
            .queue
            .head()
            .map(|h| h.id() == entry.id())
            .unwrap_or(false);

        if became_head {
            match prev_head {
                None => {
                    // Dispatcher was idle on an empty queue; wake it.
                    self.inner.entries_changed.notify_all();
                }
                Some(prev) => {
                    // Preempt whichever wait the dispatcher had in
                    // flight on the previous head (§4.6 "preemption").
                    // Hold `prev`'s own lock across the check and the
                    // broadcast: the dispatcher holds this same lock
                    // continuously from its Ok→Busy transition through
                    // to the point it actually parks on the condvar
                    // (see wait_on_entry), so acquiring it here blocks
                    // until that's true, and the broadcast can't go
                    // out before anyone is listening for it.
                    let guard = prev.lock();
                    if guard.status == EntryStatus::Busy {
                        prev.condvar().notify_all();
                    }
                }
            }
        }

        drop(state);
        ctrace!("wait_async entry {} queued", entry.id());
        WaitOutcome::Ok
    }

    /// Cancel `entry`: sticky regardless of current status, wakes an
    /// in-flight wait if one was running (§4.5 `unschedule`).
    pub fn unschedule(&self, entry: &Arc<Entry>) {
        let state = self.clock_lock();
        entry.ensure_initialized();
        drop(state);
        entry.unschedule();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sysclock_core::TimeSourceKind;

    #[test]
    fn wait_sync_returns_ok_for_past_deadline() {
        let clock = Clock::new(TimeSourceKind::Monotonic);
        let entry = Arc::new(Entry::single(0, None));
        let outcome = clock.wait_sync(&entry);
        assert!(matches!(outcome, WaitOutcome::Ok | WaitOutcome::Early));
    }

    #[test]
    fn wait_sync_respects_prior_unschedule() {
        let clock = Clock::new(TimeSourceKind::Monotonic);
        let entry = Arc::new(Entry::single(u64::MAX, None));
        entry.unschedule();
        assert_eq!(clock.wait_sync(&entry), WaitOutcome::Unscheduled);
    }

    #[test]
    fn unschedule_before_submission_is_observed_by_wait_async() {
        let clock = Clock::new(TimeSourceKind::Monotonic);
        let entry = Arc::new(Entry::single(u64::MAX, None));
        clock.unschedule(&entry);
        assert_eq!(clock.wait_async(entry), WaitOutcome::Unscheduled);
    }

    #[test]
    fn wait_async_queues_entry_and_starts_dispatcher() {
        let clock = Clock::new(TimeSourceKind::Monotonic);
        let deadline = clock.now_ns() + 5_000_000;
        let entry = Arc::new(Entry::single(deadline, None));
        let outcome = clock.wait_async(entry);
        assert_eq!(outcome, WaitOutcome::Ok);
        assert_eq!(clock.pending_count(), 1);
        clock.dispose();
    }
}
