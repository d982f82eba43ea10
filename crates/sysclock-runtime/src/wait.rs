//! WaitCore: absolute-deadline wait on an entry's wait primitive (§4.4)

use std::sync::MutexGuard;
use std::time::Duration;

use sysclock_core::{cdebug, ctrace, cwarn, EntryStatus, TimeSource, WaitOutcome};

use crate::entry::{Entry, EntryState};
use crate::time::host_monotonic_ns;

/// The three constants the design doc calls out as per-platform
/// configuration (§9), bundled so callers can override them in tests
/// without touching the build-time defaults in `crate::config`.
#[derive(Debug, Clone, Copy)]
pub struct WaitConfig {
    /// Below this, a wait returns immediately (`Early`/`Ok`) rather
    /// than blocking at all.
    pub min_wait_ns: u64,
    /// At or below this, use the nanosleep fast path instead of the
    /// wait primitive.
    pub nanosleep_ceiling_ns: u64,
    /// Below this, subtract `overshoot_reduction_ns` from the
    /// requested wait before blocking, to compensate for the wakeup
    /// primitive's worst-case latency.
    pub coarse_wait_switch_ns: u64,
    pub overshoot_reduction_ns: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            min_wait_ns: crate::config::CLOCK_MIN_WAIT_TIME_NS,
            nanosleep_ceiling_ns: crate::config::CLOCK_NANOSLEEP_CEILING_NS,
            coarse_wait_switch_ns: crate::config::CLOCK_COARSE_WAIT_SWITCH_NS,
            overshoot_reduction_ns: crate::config::CLOCK_OVERSHOOT_REDUCTION_NS,
        }
    }
}

/// `wait_on_entry(entry, guard, time_source, restart_allowed) -> (outcome, jitter_ns)`
///
/// Called with the entry lock held (`guard`) and the clock lock not
/// held by the caller, matching the design doc's contract: the caller
/// has already moved `entry` from `Ok`/`Early` towards `Busy` under
/// this same lock (or it's a fresh `Ok`, for the first iteration), and
/// that lock stays held, unbroken, from here until the `wait_timeout`
/// call below. Releasing it in between — to read the time, say — would
/// let a preempting `wait_async` lock the entry, observe `Busy`, and
/// `notify_all` before this thread has actually parked on the condvar,
/// and a `notify_all` with nobody parked is simply lost (§8
/// "Preemption"). None of this crate's `TimeSource` implementations
/// take an internal lock, so there's nothing to protect against by
/// dropping the guard around `now_ns()`/`host_monotonic_ns()`; the only
/// intentional release is around the nanosleep fast path (5a), which
/// is documented as not a wakeup path.
///
/// Returns one of `{Ok, Early, Unscheduled, Busy}` — never `Err`; the
/// `WaitOutcome::Err` arm exists for the scheduler layer, not here.
pub fn wait_on_entry(
    entry: &Entry,
    mut guard: MutexGuard<'_, EntryState>,
    time_source: &dyn TimeSource,
    restart_allowed: bool,
    config: &WaitConfig,
) -> (WaitOutcome, i64) {
    loop {
        // Step 1: read times, holding the entry lock throughout.
        let now = time_source.now_ns();
        let mono_ns = host_monotonic_ns();

        // Step 2: re-check status.
        if guard.status == EntryStatus::Unscheduled {
            return (WaitOutcome::Unscheduled, 0);
        }

        // Step 3: compute diff / jitter.
        let diff = guard.deadline_ns as i64 - now as i64;
        let jitter = -diff;

        // Step 4: resolution floor.
        if diff <= config.min_wait_ns as i64 {
            if diff != 0 {
                guard.status = EntryStatus::Early;
                ctrace!("entry {} fired Early, diff={}ns", entry.id(), diff);
                return (WaitOutcome::Early, jitter);
            } else {
                guard.status = EntryStatus::Ok;
                return (WaitOutcome::Ok, jitter);
            }
        }

        // Step 5: enter the wait loop proper.
        let diff_ns = diff as u64;
        if diff_ns <= config.nanosleep_ceiling_ns {
            // 5a. Fine-grained nanosleep fast path; not a wakeup path,
            // so releasing the lock around it can't drop a broadcast.
            drop(guard);
            sleep_until_monotonic(mono_ns + diff_ns);
            guard = entry.lock();
        } else {
            let mut wait_ns = diff_ns;
            if diff_ns < config.coarse_wait_switch_ns {
                // 5b. Calibrated overshoot reduction; the remaining
                // slice is absorbed by the next loop iteration's
                // precise path (5a) once we re-measure.
                wait_ns = wait_ns.saturating_sub(config.overshoot_reduction_ns);
            }

            // 5c. Block on the entry's wait primitive. Set Busy here,
            // under the same lock we're about to park with — the lock
            // has been held since step 1, with `wait_timeout` the only
            // point that releases it, and it does so atomically with
            // parking, so a notifier that also takes this lock before
            // checking Busy and broadcasting can never miss us.
            guard.status = EntryStatus::Busy;
            let elapsed_since_read = host_monotonic_ns().saturating_sub(mono_ns);
            let remaining = wait_ns.saturating_sub(elapsed_since_read);
            let (g2, timeout_result) = entry
                .condvar()
                .wait_timeout(guard, Duration::from_nanos(remaining))
                .unwrap_or_else(|poisoned| {
                    cwarn!("entry {} wait primitive mutex poisoned, recovering", entry.id());
                    poisoned.into_inner()
                });
            guard = g2;

            // Step 6: after waking, recheck status.
            if guard.status == EntryStatus::Unscheduled {
                return (WaitOutcome::Unscheduled, jitter);
            }
            if !timeout_result.timed_out() {
                if !restart_allowed {
                    // Async path: the dispatcher will re-peek the head.
                    cdebug!("entry {} wait preempted, deferring to dispatcher", entry.id());
                    return (WaitOutcome::Busy, jitter);
                }
                // Sync path: re-measure and loop.
                continue;
            }
            // Timed out: fall through and re-measure below.
        }

        if guard.status == EntryStatus::Unscheduled {
            return (WaitOutcome::Unscheduled, jitter);
        }

        // Timed out (from either 5a or 5c): re-read time and decide
        // whether we're done, still under the same held lock.
        let now2 = time_source.now_ns();
        let diff2 = guard.deadline_ns as i64 - now2 as i64;
        if diff2 <= config.min_wait_ns as i64 {
            guard.status = EntryStatus::Ok;
            return (WaitOutcome::Ok, -diff2);
        }
        guard.status = EntryStatus::Busy;
    }
}

/// Blocking absolute nanosleep against `CLOCK_MONOTONIC`, matching
/// step 5a's "host offers a blocking absolute nanosleep" fast path.
fn sleep_until_monotonic(target_ns: u64) {
    let ts = libc::timespec {
        tv_sec: (target_ns / 1_000_000_000) as i64,
        tv_nsec: (target_ns % 1_000_000_000) as i64,
    };
    let rc = unsafe {
        libc::clock_nanosleep(
            libc::CLOCK_MONOTONIC,
            libc::TIMER_ABSTIME,
            &ts,
            std::ptr::null_mut(),
        )
    };
    if rc != 0 && rc != libc::EINTR {
        cwarn!("clock_nanosleep failed (errno {}), falling back to relative sleep", rc);
        let now = host_monotonic_ns();
        if target_ns > now {
            std::thread::sleep(Duration::from_nanos(target_ns - now));
        }
    }
}
