//! International Atomic Time source, falling back to realtime with a
//! logged degradation where the host offers no TAI clock (§4.1).

use super::clock_gettime_ns;
use sysclock_core::{TimeSource, TimeSourceKind};
use std::sync::Once;

pub struct TaiTimeSource {
    resolution_ns: u64,
    degraded: bool,
}

impl TaiTimeSource {
    pub fn new() -> Self {
        let degraded = !tai_available();
        if degraded {
            warn_degraded_once();
        }
        Self {
            resolution_ns: query_resolution_ns(degraded),
            degraded,
        }
    }

    /// True if this instance is silently reading `CLOCK_REALTIME`
    /// because the host kernel has no `CLOCK_TAI` support.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

impl Default for TaiTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for TaiTimeSource {
    #[inline]
    fn now_ns(&self) -> u64 {
        if self.degraded {
            clock_gettime_ns(libc::CLOCK_REALTIME)
        } else {
            clock_gettime_ns(libc::CLOCK_TAI)
        }
    }

    #[inline]
    fn resolution_ns(&self) -> u64 {
        self.resolution_ns
    }

    #[inline]
    fn kind(&self) -> TimeSourceKind {
        TimeSourceKind::Tai
    }
}

fn tai_available() -> bool {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    unsafe { libc::clock_gettime(libc::CLOCK_TAI, &mut ts) == 0 }
}

fn query_resolution_ns(degraded: bool) -> u64 {
    let id = if degraded {
        libc::CLOCK_REALTIME
    } else {
        libc::CLOCK_TAI
    };
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    let rc = unsafe { libc::clock_getres(id, &mut ts) };
    if rc != 0 {
        return 1;
    }
    (ts.tv_sec as u64 * 1_000_000_000 + ts.tv_nsec as u64).max(1)
}

static WARN_ONCE: Once = Once::new();

fn warn_degraded_once() {
    WARN_ONCE.call_once(|| {
        sysclock_core::cwarn!("CLOCK_TAI unavailable on this host, degrading to CLOCK_REALTIME");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_is_tai_even_when_degraded() {
        let src = TaiTimeSource::new();
        assert_eq!(src.kind(), TimeSourceKind::Tai);
    }

    #[test]
    fn now_ns_is_plausible() {
        let src = TaiTimeSource::new();
        assert!(src.now_ns() > 1_577_836_800_000_000_000);
    }
}
