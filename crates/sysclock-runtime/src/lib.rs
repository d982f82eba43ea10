//! # sysclock-runtime
//!
//! Platform implementation of the sysclock system clock: concrete
//! `TimeSource`s, the WaitCore deadline-wait algorithm, the entry
//! queue, and the `Clock` type with its scheduler operations and async
//! dispatcher thread.
//!
//! Everything platform-agnostic (ids, status enums, error types,
//! logging) lives in `sysclock-core`; this crate is where it meets
//! `libc::clock_gettime`/`clock_nanosleep` and `std::thread`.

mod clock;
mod config;
mod dispatcher;
mod entry;
mod queue;
mod scheduler;
mod time;
mod wait;

pub use clock::{Clock, ClockFlags};
pub use entry::{ClockCallback, Entry, EntryKind, FnClockCallback};
pub use time::{host_monotonic_ns, MonotonicTimeSource, RealtimeTimeSource, TaiTimeSource};
pub use wait::WaitConfig;

pub use sysclock_core::{ClockError, ClockResult, EntryId, EntryStatus, TimeSource, TimeSourceKind, WaitOutcome};
