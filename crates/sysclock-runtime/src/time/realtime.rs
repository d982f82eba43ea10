//! Realtime (wall-clock) time source: `CLOCK_REALTIME`, nanoseconds
//! since the Unix epoch.

use super::clock_gettime_ns;
use sysclock_core::{TimeSource, TimeSourceKind};

pub struct RealtimeTimeSource {
    resolution_ns: u64,
}

impl RealtimeTimeSource {
    pub fn new() -> Self {
        Self {
            resolution_ns: query_resolution_ns(),
        }
    }
}

impl Default for RealtimeTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for RealtimeTimeSource {
    #[inline]
    fn now_ns(&self) -> u64 {
        clock_gettime_ns(libc::CLOCK_REALTIME)
    }

    #[inline]
    fn resolution_ns(&self) -> u64 {
        self.resolution_ns
    }

    #[inline]
    fn kind(&self) -> TimeSourceKind {
        TimeSourceKind::Realtime
    }
}

fn query_resolution_ns() -> u64 {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    let rc = unsafe { libc::clock_getres(libc::CLOCK_REALTIME, &mut ts) };
    if rc != 0 {
        return 1;
    }
    (ts.tv_sec as u64 * 1_000_000_000 + ts.tv_nsec as u64).max(1)
}
