//! AsyncDispatcher: the dedicated worker thread behind `wait_async`
//! entries (§4.6).

use std::sync::Arc;

use sysclock_core::kprint::{clear_current_entry, set_current_entry};
use sysclock_core::{cerror, ctrace, EntryStatus, WaitOutcome};

use crate::clock::Clock;
use crate::wait::wait_on_entry;

/// Entry point run on the `sysclock-dispatcher` thread. Owns the
/// queue's head-of-line waiting: peek the earliest deadline, wait on
/// it without holding the clock lock, then re-peek — so a submission
/// that becomes the new head while we're waiting is picked up on the
/// next iteration instead of stalling behind whatever we were already
/// waiting on.
pub(crate) fn run_dispatcher(clock: Arc<Clock>) {
    {
        let mut state = clock.clock_lock();
        state.starting = false;
        clock.inner.entries_changed.notify_all();
    }

    'dispatch: loop {
        let mut state = clock.clock_lock();
        let head = loop {
            if state.stopping {
                return;
            }
            match state.queue.head() {
                Some(head) => break head,
                None => {
                    state = clock
                        .inner
                        .entries_changed
                        .wait(state)
                        .unwrap_or_else(|poisoned| {
                            cerror!("dispatcher: clock lock poisoned, recovering");
                            poisoned.into_inner()
                        });
                }
            }
        };

        set_current_entry(head.id().raw());

        // Observe status and, if runnable, transition to Busy — all
        // under the same clock-lock hold that produced `head`, so a
        // concurrent wait_async can't insert a new, earlier head and
        // have us commit to waiting on this now-stale one regardless
        // (§4.6 step c, §8 "Preemption"). The entry lock then stays
        // held past `drop(state)`, straight into `wait_on_entry`.
        let mut guard = head.lock();
        match guard.status {
            EntryStatus::Unscheduled => {
                drop(guard);
                state.queue.remove(&head);
                drop(state);
                clear_current_entry();
                continue 'dispatch;
            }
            EntryStatus::Busy | EntryStatus::Done => {
                // Another thread's wait_sync briefly owns this entry,
                // or we're racing our own prior iteration; re-peek
                // rather than double-wait on it.
                drop(guard);
                drop(state);
                clear_current_entry();
                continue 'dispatch;
            }
            EntryStatus::Ok | EntryStatus::Early => {
                guard.status = EntryStatus::Busy;
            }
        }
        drop(state);

        let requested_deadline = guard.deadline_ns;
        let time_source = clock.time_source();
        let (outcome, jitter) =
            wait_on_entry(&head, guard, &*time_source, false, &clock.wait_config);

        match outcome {
            WaitOutcome::Unscheduled => {
                let mut state = clock.clock_lock();
                state.queue.remove(&head);
            }
            WaitOutcome::Busy => {
                // Preempted mid-wait by a newer head; wait_on_entry
                // left status Busy for us to notice, reset it to Ok
                // so the next iteration re-peeks cleanly.
                let mut guard = head.lock();
                if guard.status == EntryStatus::Busy {
                    guard.status = EntryStatus::Ok;
                }
            }
            WaitOutcome::Ok | WaitOutcome::Early => {
                ctrace!(
                    "entry {} fired ({:?}, jitter {}ns)",
                    head.id(),
                    outcome,
                    jitter
                );
                if let Some(cb) = head.callback() {
                    cb.on_fire(requested_deadline, head.id());
                }
                match head.kind() {
                    crate::entry::EntryKind::Periodic { interval_ns } => {
                        let mut state = clock.clock_lock();
                        {
                            let mut guard = head.lock();
                            if guard.status != EntryStatus::Unscheduled {
                                guard.deadline_ns = requested_deadline + interval_ns;
                                guard.status = EntryStatus::Ok;
                            }
                        }
                        state.queue.resort();
                    }
                    crate::entry::EntryKind::Single => {
                        {
                            let mut guard = head.lock();
                            if guard.status != EntryStatus::Unscheduled {
                                guard.status = EntryStatus::Done;
                            }
                        }
                        let mut state = clock.clock_lock();
                        state.queue.remove(&head);
                    }
                }
            }
            WaitOutcome::Err(e) => {
                cerror!("entry {} wait failed: {}", head.id(), e);
                let mut state = clock.clock_lock();
                state.queue.remove(&head);
            }
        }

        clear_current_entry();
    }
}

#[allow(dead_code)]
fn _assert_send_sync() {
    fn is_send_sync<T: Send + Sync>() {}
    is_send_sync::<Arc<Clock>>();
}
