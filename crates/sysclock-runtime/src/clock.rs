//! The clock instance: owns the entry queue, the dispatcher thread,
//! and the configured [`TimeSource`] (§3 "Clock state").

use std::sync::{Arc, Condvar, Mutex, RwLock};
use std::thread::JoinHandle;

use sysclock_core::{ClockError, TimeSource, TimeSourceKind};

use crate::queue::EntryQueue;
use crate::time::make_time_source;
use crate::wait::WaitConfig;

/// Capability flags advertised by every `Clock` (§6): this
/// implementation always supports all four modes, so the flags are
/// constant rather than queried from the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockFlags {
    pub can_do_single_sync: bool,
    pub can_do_single_async: bool,
    pub can_do_periodic_sync: bool,
    pub can_do_periodic_async: bool,
}

impl Default for ClockFlags {
    fn default() -> Self {
        Self {
            can_do_single_sync: true,
            can_do_single_async: true,
            can_do_periodic_sync: true,
            can_do_periodic_async: true,
        }
    }
}

/// Everything the "clock lock" guards (§5): the queue, worker
/// lifecycle flags, and the dispatcher's join handle. One mutex, one
/// lock acquisition per operation — matching the design doc's claim
/// that the clock lock "guards queue, worker lifecycle flags, and
/// `entries_changed`" as a single unit rather than several
/// independently-lockable pieces.
pub(crate) struct ClockState {
    pub(crate) queue: EntryQueue,
    pub(crate) starting: bool,
    pub(crate) stopping: bool,
    pub(crate) dispatcher_handle: Option<JoinHandle<()>>,
}

pub(crate) struct ClockInner {
    pub(crate) state: Mutex<ClockState>,
    pub(crate) entries_changed: Condvar,
}

/// A monotonic time source plus a timer-entry scheduler (§1).
pub struct Clock {
    pub(crate) inner: Arc<ClockInner>,
    time_source: RwLock<Arc<dyn TimeSource>>,
    time_source_kind: RwLock<TimeSourceKind>,
    pub(crate) wait_config: WaitConfig,
}

impl Clock {
    /// Construct a clock reading the given `TimeSource` kind.
    pub fn new(kind: TimeSourceKind) -> Arc<Self> {
        Arc::new(Self {
            inner: Arc::new(ClockInner {
                state: Mutex::new(ClockState {
                    queue: EntryQueue::new(),
                    starting: false,
                    stopping: false,
                    dispatcher_handle: None,
                }),
                entries_changed: Condvar::new(),
            }),
            time_source: RwLock::new(make_time_source(kind)),
            time_source_kind: RwLock::new(kind),
            wait_config: WaitConfig::default(),
        })
    }

    pub fn flags(&self) -> ClockFlags {
        ClockFlags::default()
    }

    /// Current nanosecond reading on the configured `TimeSource`.
    pub fn now_ns(&self) -> u64 {
        self.time_source.read().unwrap().now_ns()
    }

    pub fn resolution_ns(&self) -> u64 {
        self.time_source.read().unwrap().resolution_ns()
    }

    /// The `clock-type` configuration property (§6): `monotonic`,
    /// `realtime`, or `tai`.
    pub fn clock_type(&self) -> TimeSourceKind {
        *self.time_source_kind.read().unwrap()
    }

    /// Change the `clock-type` property. Takes effect for subsequent
    /// `now()` reads; entries already queued keep their
    /// previously-computed deadlines (§3: deadlines are absolute on
    /// "the clock's chosen TimeSource" at submission time).
    pub fn set_clock_type(&self, kind: TimeSourceKind) {
        *self.time_source.write().unwrap() = make_time_source(kind);
        *self.time_source_kind.write().unwrap() = kind;
        sysclock_core::cinfo!("clock-type changed to {}", kind);
    }

    pub(crate) fn time_source(&self) -> Arc<dyn TimeSource> {
        self.time_source.read().unwrap().clone()
    }

    pub(crate) fn clock_lock(&self) -> std::sync::MutexGuard<'_, ClockState> {
        self.inner.state.lock().unwrap()
    }

    pub fn pending_count(&self) -> usize {
        self.clock_lock().queue.len()
    }

    pub fn is_stopping(&self) -> bool {
        self.clock_lock().stopping
    }

    /// Spawn the dispatcher thread if it is not already running.
    /// Propagates spawn failure as `ClockError::DispatcherSpawnFailed`
    /// (§4.5 `wait_async` step 2).
    pub(crate) fn ensure_dispatcher_started(
        self: &Arc<Self>,
        state: &mut ClockState,
    ) -> Result<(), ClockError> {
        if state.dispatcher_handle.is_some() {
            return Ok(());
        }
        state.starting = true;
        let clock = self.clone();
        let result = std::thread::Builder::new()
            .name("sysclock-dispatcher".into())
            .spawn(move || crate::dispatcher::run_dispatcher(clock));
        match result {
            Ok(handle) => {
                state.dispatcher_handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                state.starting = false;
                Err(ClockError::DispatcherSpawnFailed(e))
            }
        }
    }

    /// Disposal (§4.5 `disposal`): cancel every queued entry, wake the
    /// dispatcher, join it, and drop the queue.
    pub fn dispose(self: &Arc<Self>) {
        let drained = {
            let mut state = self.clock_lock();
            state.stopping = true;
            state.queue.drain()
        };
        for entry in &drained {
            entry.unschedule();
        }
        self.inner.entries_changed.notify_all();

        let handle = {
            let mut state = self.clock_lock();
            state.dispatcher_handle.take()
        };
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("clock_type", &self.clock_type())
            .field("pending", &self.pending_count())
            .finish()
    }
}
