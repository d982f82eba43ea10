//! Timer entries: the unit of work submitted to a [`Clock`](crate::clock::Clock).

use std::sync::{Condvar, Mutex};

use sysclock_core::{EntryId, EntryStatus};

/// One-shot vs. self-rearming entry kinds (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Single,
    /// `interval_ns` must be > 0; enforced by [`Entry::periodic`].
    Periodic { interval_ns: u64 },
}

impl EntryKind {
    #[inline]
    pub fn is_periodic(&self) -> bool {
        matches!(self, EntryKind::Periodic { .. })
    }

    #[inline]
    pub fn interval_ns(&self) -> Option<u64> {
        match self {
            EntryKind::Periodic { interval_ns } => Some(*interval_ns),
            EntryKind::Single => None,
        }
    }
}

/// Callback ABI (§6): invoked on the dispatcher thread, no locks held.
///
/// A plain trait object rather than a raw function pointer plus opaque
/// `user_data`, since a `Fn` closure already captures what it needs.
pub trait ClockCallback: Send + Sync {
    fn on_fire(&self, requested_deadline_ns: u64, entry_id: EntryId);
}

/// Wraps a closure as a [`ClockCallback`].
pub struct FnClockCallback<F>(pub F);

impl<F> ClockCallback for FnClockCallback<F>
where
    F: Fn(u64, EntryId) + Send + Sync,
{
    fn on_fire(&self, requested_deadline_ns: u64, entry_id: EntryId) {
        (self.0)(requested_deadline_ns, entry_id)
    }
}

/// State guarded by an entry's own lock (§3): `status` and `deadline`.
/// The condvar paired with this same mutex is the "wait primitive".
pub(crate) struct EntryState {
    pub(crate) status: EntryStatus,
    pub(crate) deadline_ns: u64,
}

/// One scheduled timer (§3).
///
/// The design doc calls for the lock/condvar pair to be lazily
/// constructed on first submission, guarded by the clock lock, so that
/// an entry created but never submitted costs nothing (§9, "lazy
/// per-entry primitives"). `std::sync::Mutex`/`Condvar` are plain
/// value types with no backing OS object until actually contended, so
/// there is no allocation or syscall to defer here; eager construction
/// already gives the "free until used" property the design doc is
/// after, which is why `Entry` holds its `Mutex`/`Condvar` directly
/// rather than behind a lazy cell. See DESIGN.md for this open-question
/// resolution. `ensure_initialized` is kept as a call site — invoked
/// by the scheduler exactly where the design doc calls for the init
/// step — so the structure of §4.5's algorithms is preserved even
/// though the call itself is a no-op here.
pub struct Entry {
    id: EntryId,
    kind: EntryKind,
    callback: Option<std::sync::Arc<dyn ClockCallback>>,
    mutex: Mutex<EntryState>,
    condvar: Condvar,
}

impl Entry {
    fn new_raw(
        kind: EntryKind,
        deadline_ns: u64,
        callback: Option<std::sync::Arc<dyn ClockCallback>>,
    ) -> Self {
        Self {
            id: EntryId::new(),
            kind,
            callback,
            mutex: Mutex::new(EntryState {
                status: EntryStatus::Ok,
                deadline_ns,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Create a single-shot entry firing at `deadline_ns` (absolute,
    /// on the clock's configured `TimeSource`).
    pub fn single(deadline_ns: u64, callback: Option<std::sync::Arc<dyn ClockCallback>>) -> Self {
        Self::new_raw(EntryKind::Single, deadline_ns, callback)
    }

    /// Create a periodic entry, first firing at `deadline_ns`, then
    /// every `interval_ns` thereafter. Panics if `interval_ns == 0`
    /// (§3: "must be > 0").
    pub fn periodic(
        deadline_ns: u64,
        interval_ns: u64,
        callback: Option<std::sync::Arc<dyn ClockCallback>>,
    ) -> Self {
        assert!(interval_ns > 0, "periodic entry interval must be > 0");
        Self::new_raw(EntryKind::Periodic { interval_ns }, deadline_ns, callback)
    }

    #[inline]
    pub fn id(&self) -> EntryId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn callback(&self) -> Option<&std::sync::Arc<dyn ClockCallback>> {
        self.callback.as_ref()
    }

    /// No-op placeholder for the design doc's clock-lock-guarded lazy
    /// init step; see the type-level doc comment for why Rust doesn't
    /// need one. Scheduler call sites invoke it anyway, at the same
    /// point §4.5 calls for it, so the algorithms read the same way.
    pub(crate) fn ensure_initialized(&self) {}

    pub fn status(&self) -> EntryStatus {
        self.mutex.lock().unwrap().status
    }

    pub fn deadline_ns(&self) -> u64 {
        self.mutex.lock().unwrap().deadline_ns
    }

    pub(crate) fn lock(&self) -> std::sync::MutexGuard<'_, EntryState> {
        self.mutex.lock().unwrap()
    }

    pub(crate) fn condvar(&self) -> &Condvar {
        &self.condvar
    }

    /// Set status to `Unscheduled` regardless of prior value (§4.5
    /// `unschedule`); broadcasts the wait primitive if a wait was in
    /// flight. Idempotent.
    pub fn unschedule(&self) {
        let mut guard = self.lock();
        let was_busy = guard.status == EntryStatus::Busy;
        guard.status = EntryStatus::Unscheduled;
        drop(guard);
        if was_busy {
            self.condvar.notify_all();
        }
    }

    pub fn is_unscheduled(&self) -> bool {
        self.status() == EntryStatus::Unscheduled
    }
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn single_entry_starts_ok() {
        let e = Entry::single(1_000, None);
        assert_eq!(e.status(), EntryStatus::Ok);
        assert_eq!(e.deadline_ns(), 1_000);
        assert!(!e.kind().is_periodic());
    }

    #[test]
    fn periodic_entry_rejects_zero_interval() {
        let result = std::panic::catch_unwind(|| Entry::periodic(1_000, 0, None));
        assert!(result.is_err());
    }

    #[test]
    fn unschedule_is_sticky_and_idempotent() {
        let e = Entry::single(1_000, None);
        e.unschedule();
        assert_eq!(e.status(), EntryStatus::Unscheduled);
        e.unschedule();
        assert_eq!(e.status(), EntryStatus::Unscheduled);
    }

    #[test]
    fn unschedule_wakes_busy_waiter() {
        let e = Arc::new(Entry::single(u64::MAX, None));
        {
            let mut g = e.lock();
            g.status = EntryStatus::Busy;
        }
        let woken = Arc::new(AtomicUsize::new(0));
        let e2 = e.clone();
        let woken2 = woken.clone();
        let t = std::thread::spawn(move || {
            let guard = e2.lock();
            let _ = e2
                .condvar()
                .wait_timeout(guard, std::time::Duration::from_secs(5))
                .unwrap();
            woken2.fetch_add(1, Ordering::SeqCst);
        });
        std::thread::sleep(std::time::Duration::from_millis(20));
        e.unschedule();
        t.join().unwrap();
        assert_eq!(woken.load(Ordering::SeqCst), 1);
        assert_eq!(e.status(), EntryStatus::Unscheduled);
    }

    #[test]
    fn callback_invokes_closure() {
        let called = Arc::new(AtomicUsize::new(0));
        let called2 = called.clone();
        let cb: Arc<dyn ClockCallback> = Arc::new(FnClockCallback(move |_deadline, _id| {
            called2.fetch_add(1, Ordering::SeqCst);
        }));
        let e = Entry::single(1_000, Some(cb));
        e.callback().unwrap().on_fire(1_000, e.id());
        assert_eq!(called.load(Ordering::SeqCst), 1);
    }
}
