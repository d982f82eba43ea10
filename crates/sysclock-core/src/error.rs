//! Error types for the sysclock system clock

use core::fmt;

/// Result type for fallible, non-wait clock operations (construction,
/// singleton access). The three scheduler operations themselves
/// return `WaitOutcome` (see `status.rs`), not this: `Early`/`Busy`/
/// `Unscheduled` are routine outcomes, not failures, and forcing every
/// caller to match on `Err` to observe them would be backwards.
pub type ClockResult<T> = Result<T, ClockError>;

/// Fatal (to the call, not to the clock) error conditions, per §7.
#[derive(Debug)]
pub enum ClockError {
    /// The dispatcher thread could not be spawned.
    DispatcherSpawnFailed(std::io::Error),
    /// The configured time source is unavailable on this host.
    TimeSourceUnavailable(&'static str),
    /// An entry's wait primitive (mutex/condvar pair) could not be
    /// initialized. Reserved for symmetry with the design doc; in
    /// practice this crate treats primitive-init failure as a
    /// programmer/platform error and aborts rather than returning it
    /// (§7: "the only fatal condition ... aborts").
    PrimitiveInitFailed,
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockError::DispatcherSpawnFailed(e) => {
                write!(f, "failed to spawn async dispatcher thread: {}", e)
            }
            ClockError::TimeSourceUnavailable(which) => {
                write!(f, "time source unavailable: {}", which)
            }
            ClockError::PrimitiveInitFailed => {
                write!(f, "failed to initialize entry wait primitive")
            }
        }
    }
}

impl std::error::Error for ClockError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClockError::DispatcherSpawnFailed(e) => Some(e),
            _ => None,
        }
    }
}
