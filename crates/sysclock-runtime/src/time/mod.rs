//! Concrete [`TimeSource`] implementations
//!
//! `sysclock-core` only describes the trait; reading an actual host
//! clock is platform-specific, so the implementations live here,
//! split from the platform-agnostic trait the same way the rest of
//! this workspace separates `sysclock-core` from `sysclock-runtime`.

mod monotonic;
mod realtime;
mod tai;

pub use monotonic::MonotonicTimeSource;
pub use realtime::RealtimeTimeSource;
pub use tai::TaiTimeSource;

use sysclock_core::TimeSourceKind;
use std::sync::Arc;

/// Construct the `TimeSource` implementation for a given kind.
pub fn make_time_source(kind: TimeSourceKind) -> Arc<dyn sysclock_core::TimeSource> {
    match kind {
        TimeSourceKind::Monotonic => Arc::new(MonotonicTimeSource::new()),
        TimeSourceKind::Realtime => Arc::new(RealtimeTimeSource::new()),
        TimeSourceKind::Tai => Arc::new(TaiTimeSource::new()),
    }
}

/// Read `CLOCK_MONOTONIC` directly in nanoseconds, independent of
/// which `TimeSource` a `Clock` is configured with. `WaitCore` always
/// schedules its nanosleep/condvar wakeups against this value (§4.4
/// step 1 / open question in §9), never against the clock's
/// configured source, so a custom or non-monotonic `TimeSource` cannot
/// itself cause the wait primitive to oversleep or undersleep.
#[inline]
pub fn host_monotonic_ns() -> u64 {
    clock_gettime_ns(libc::CLOCK_MONOTONIC)
}

#[inline]
pub(crate) fn clock_gettime_ns(clock_id: libc::clockid_t) -> u64 {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    let rc = unsafe { libc::clock_gettime(clock_id, &mut ts) };
    if rc != 0 {
        sysclock_core::cerror!(
            "clock_gettime({}) failed, returning 0: {}",
            clock_id,
            std::io::Error::last_os_error()
        );
        return 0;
    }
    ts.tv_sec as u64 * 1_000_000_000 + ts.tv_nsec as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_monotonic_is_nondecreasing() {
        let a = host_monotonic_ns();
        let b = host_monotonic_ns();
        assert!(b >= a);
    }
}
