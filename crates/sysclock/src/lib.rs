//! # sysclock
//!
//! A monotonic time source combined with a timer-entry scheduler:
//! synchronous blocking waits, asynchronous callback delivery from a
//! dedicated worker thread, one-shot and periodic timers, and
//! unschedule-with-immediate-effect on any pending entry.
//!
//! ## Quick start
//!
//! ```ignore
//! use sysclock::{obtain_default, Entry, FnClockCallback};
//! use std::sync::Arc;
//!
//! let clock = obtain_default();
//! let deadline = clock.now_ns() + 1_000_000_000; // 1s out
//! let entry = Arc::new(Entry::single(deadline, Some(Arc::new(FnClockCallback(
//!     |requested_ns, id| println!("entry {} fired, requested at {}", id, requested_ns),
//! )))));
//! clock.wait_async(entry);
//! ```
//!
//! ## Architecture
//!
//! `sysclock-core` defines the platform-agnostic types (`EntryId`,
//! `EntryStatus`, `WaitOutcome`, `TimeSource`, `ClockError`) and the
//! `kprint` logging macros. `sysclock-runtime` implements the actual
//! wait algorithm, the entry queue, and the `Clock`/`Entry` types
//! against `libc::clock_gettime`/`clock_nanosleep`. This crate adds the
//! one piece that only makes sense at the top of the stack: the
//! process-wide default-clock singleton (§6 of the design doc).

// Re-export core types
pub use sysclock_core::{ClockError, ClockResult, EntryId, EntryStatus, TimeSource, TimeSourceKind, WaitOutcome};

// Re-export kprint macros for debug logging
pub use sysclock_core::{cdebug, cerror, cinfo, ctrace, cwarn, cprint, cprintln};
pub use sysclock_core::kprint::{
    init as init_logging, set_flush_enabled, set_log_level, set_time_enabled, LogLevel,
};

// Re-export env utilities
pub use sysclock_core::{env_get, env_get_bool, env_get_opt, env_get_str, env_is_set};

// Re-export runtime types
pub use sysclock_runtime::{
    host_monotonic_ns, Clock, ClockCallback, ClockFlags, Entry, EntryKind, FnClockCallback,
    MonotonicTimeSource, RealtimeTimeSource, TaiTimeSource, WaitConfig,
};

use std::sync::{Arc, Mutex, OnceLock};

/// Guards the default-clock slot. This is the "process-wide singleton
/// lock" of §5 — outermost in the lock order, and never held while
/// calling into a `Clock`'s scheduler operations: the accessor
/// functions below clone the `Arc` and release the lock before
/// returning it to the caller.
fn singleton() -> &'static Mutex<Option<Arc<Clock>>> {
    static SINGLETON: OnceLock<Mutex<Option<Arc<Clock>>>> = OnceLock::new();
    SINGLETON.get_or_init(|| Mutex::new(None))
}

/// Return the process-wide default clock, creating it on first call
/// (§6 `obtain_default`). The created clock reads `TimeSourceKind::Monotonic`.
pub fn obtain_default() -> Arc<Clock> {
    let mut guard = singleton().lock().unwrap_or_else(|poisoned| {
        cerror!("default clock singleton lock poisoned, recovering");
        poisoned.into_inner()
    });
    guard
        .get_or_insert_with(|| Clock::new(TimeSourceKind::Monotonic))
        .clone()
}

/// Override the process-wide default clock, or clear it with `None`
/// (§6 `set_default`). Intended for tests that want an isolated clock
/// instance instead of sharing the process default.
pub fn set_default(clock: Option<Arc<Clock>>) {
    let mut guard = singleton().lock().unwrap_or_else(|poisoned| {
        cerror!("default clock singleton lock poisoned, recovering");
        poisoned.into_inner()
    });
    *guard = clock;
}
