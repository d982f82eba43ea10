//! Time source selection and the platform-agnostic `TimeSource` trait
//!
//! Concrete implementations (`MonotonicTimeSource`, `RealtimeTimeSource`,
//! `TaiTimeSource`) live in `sysclock-runtime`, since reading a host
//! clock is inherently platform-specific. This crate only describes the
//! shape of the abstraction.

use core::fmt;

/// Which underlying host clock a `Clock` reads.
///
/// Selected at construction and changeable afterwards only through the
/// `clock-type` configuration property (§6) — never written directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeSourceKind {
    /// Monotonic, non-decreasing, unaffected by wall-clock adjustments.
    #[default]
    Monotonic,
    /// Wall-clock time, in nanoseconds since the Unix epoch.
    Realtime,
    /// International Atomic Time, if the host provides it; otherwise
    /// implementations fall back to `Realtime` and log the degradation.
    Tai,
}

impl TimeSourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            TimeSourceKind::Monotonic => "monotonic",
            TimeSourceKind::Realtime => "realtime",
            TimeSourceKind::Tai => "tai",
        }
    }

    /// Parse the `clock-type` configuration property's textual values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monotonic" => Some(TimeSourceKind::Monotonic),
            "realtime" => Some(TimeSourceKind::Realtime),
            "tai" => Some(TimeSourceKind::Tai),
            _ => None,
        }
    }
}

impl fmt::Display for TimeSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A readable host clock.
///
/// All implementations must be thread-safe: the clock lock, entry
/// locks and the dispatcher thread all call `now()` independently and
/// concurrently.
pub trait TimeSource: Send + Sync {
    /// Current time in nanoseconds on this source.
    fn now_ns(&self) -> u64;

    /// Granularity of this source in nanoseconds; bounds expected jitter.
    fn resolution_ns(&self) -> u64;

    /// Which kind this is, for the `clock-type` property and logging.
    fn kind(&self) -> TimeSourceKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_name() {
        for kind in [
            TimeSourceKind::Monotonic,
            TimeSourceKind::Realtime,
            TimeSourceKind::Tai,
        ] {
            assert_eq!(TimeSourceKind::parse(kind.name()), Some(kind));
        }
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!(TimeSourceKind::parse("bogus"), None);
    }
}
