//! Integration tests over the public `sysclock` facade, covering the
//! testable properties of the wait/unschedule/async-dispatch state
//! machine: monotonicity, ordering, unschedule idempotence,
//! at-most-once callback delivery, periodic cadence, preemption,
//! cancel-during-wait, and the resolution floor.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sysclock::{Clock, Entry, FnClockCallback, TimeSourceKind, WaitOutcome};

fn millis(n: u64) -> u64 {
    n * 1_000_000
}

#[test]
fn monotonicity_holds_across_threads() {
    let clock = Clock::new(TimeSourceKind::Monotonic);
    let clock2 = clock.clone();
    let last = Arc::new(AtomicU64::new(0));
    let last2 = last.clone();

    let t = std::thread::spawn(move || {
        for _ in 0..2_000 {
            let now = clock2.now_ns();
            let prev = last2.swap(now, Ordering::SeqCst);
            assert!(now >= prev);
        }
    });

    for _ in 0..2_000 {
        let now = clock.now_ns();
        let prev = last.swap(now, Ordering::SeqCst);
        assert!(now >= prev);
    }
    t.join().unwrap();
}

#[test]
fn callbacks_fire_in_nondecreasing_deadline_order() {
    // Scenario 2: submit T+100ms then T+10ms, expect (T+10ms, T+100ms).
    let clock = Clock::new(TimeSourceKind::Monotonic);
    let order = Arc::new(Mutex::new(Vec::new()));
    let t0 = clock.now_ns();

    let make_cb = |order: Arc<Mutex<Vec<u64>>>| {
        Arc::new(FnClockCallback(move |requested_ns: u64, _id| {
            order.lock().unwrap().push(requested_ns);
        })) as Arc<dyn sysclock::ClockCallback>
    };

    let far = Arc::new(Entry::single(t0 + millis(100), Some(make_cb(order.clone()))));
    let near = Arc::new(Entry::single(t0 + millis(10), Some(make_cb(order.clone()))));

    clock.wait_async(far);
    clock.wait_async(near);

    std::thread::sleep(Duration::from_millis(150));
    let fired = order.lock().unwrap().clone();
    assert_eq!(fired, vec![t0 + millis(10), t0 + millis(100)]);
    clock.dispose();
}

#[test]
fn unschedule_is_idempotent() {
    let clock = Clock::new(TimeSourceKind::Monotonic);
    let entry = Arc::new(Entry::single(clock.now_ns() + millis(500), None));
    clock.unschedule(&entry);
    clock.unschedule(&entry);
    assert!(entry.is_unscheduled());
}

#[test]
fn single_shot_callback_fires_at_most_once() {
    let clock = Clock::new(TimeSourceKind::Monotonic);
    let count = Arc::new(AtomicUsize::new(0));
    let count2 = count.clone();
    let cb: Arc<dyn sysclock::ClockCallback> =
        Arc::new(FnClockCallback(move |_deadline, _id| {
            count2.fetch_add(1, Ordering::SeqCst);
        }));
    let entry = Arc::new(Entry::single(clock.now_ns() + millis(5), Some(cb)));
    clock.wait_async(entry);

    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(count.load(Ordering::SeqCst), 1);
    clock.dispose();
}

#[test]
fn periodic_cadence_matches_t0_plus_k_times_interval() {
    // Scenario 3: Periodic at T+20ms, interval 30ms, unschedule after 3
    // callbacks. Expect requested_deadlines {T+20, T+50, T+80}ms.
    let clock = Clock::new(TimeSourceKind::Monotonic);
    let t0 = clock.now_ns();
    let interval = millis(30);
    let first = t0 + millis(20);

    let deadlines = Arc::new(Mutex::new(Vec::new()));
    let deadlines2 = deadlines.clone();
    let entry_holder: Arc<Mutex<Option<Arc<Entry>>>> = Arc::new(Mutex::new(None));
    let entry_holder2 = entry_holder.clone();

    let cb: Arc<dyn sysclock::ClockCallback> = Arc::new(FnClockCallback(move |requested_ns, _id| {
        let mut v = deadlines2.lock().unwrap();
        v.push(requested_ns);
        if v.len() == 3 {
            if let Some(e) = entry_holder2.lock().unwrap().as_ref() {
                e.unschedule();
            }
        }
    }));

    let entry = Arc::new(Entry::periodic(first, interval, Some(cb)));
    *entry_holder.lock().unwrap() = Some(entry.clone());
    clock.wait_async(entry);

    std::thread::sleep(Duration::from_millis(250));
    let fired = deadlines.lock().unwrap().clone();
    assert_eq!(fired, vec![first, first + interval, first + 2 * interval]);
    clock.dispose();
}

#[test]
fn preemption_lets_a_newly_submitted_earlier_entry_fire_first() {
    let clock = Clock::new(TimeSourceKind::Monotonic);
    let order = Arc::new(Mutex::new(Vec::new()));
    let t0 = clock.now_ns();

    let make_cb = |order: Arc<Mutex<Vec<&'static str>>>, label: &'static str| {
        Arc::new(FnClockCallback(move |_requested_ns: u64, _id| {
            order.lock().unwrap().push(label);
        })) as Arc<dyn sysclock::ClockCallback>
    };

    // Head starts far out; dispatcher parks waiting on it.
    let far = Arc::new(Entry::single(t0 + millis(200), Some(make_cb(order.clone(), "far"))));
    clock.wait_async(far);
    std::thread::sleep(Duration::from_millis(10));

    // A much nearer entry should preempt the in-flight wait.
    let near = Arc::new(Entry::single(t0 + millis(30), Some(make_cb(order.clone(), "near"))));
    clock.wait_async(near);

    std::thread::sleep(Duration::from_millis(60));
    assert_eq!(order.lock().unwrap().clone(), vec!["near"]);
    clock.dispose();
}

#[test]
fn cancel_during_wait_suppresses_the_callback() {
    let clock = Clock::new(TimeSourceKind::Monotonic);
    let fired = Arc::new(AtomicUsize::new(0));
    let fired2 = fired.clone();
    let cb: Arc<dyn sysclock::ClockCallback> =
        Arc::new(FnClockCallback(move |_deadline, _id| {
            fired2.fetch_add(1, Ordering::SeqCst);
        }));
    let entry = Arc::new(Entry::single(clock.now_ns() + millis(100), Some(cb)));
    clock.wait_async(entry.clone());

    std::thread::sleep(Duration::from_millis(10));
    clock.unschedule(&entry);

    std::thread::sleep(Duration::from_millis(150));
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    clock.dispose();
}

#[test]
fn resolution_floor_returns_without_blocking() {
    // Scenario 4-ish / §8 resolution floor: a deadline at or before
    // `now()` resolves immediately through wait_sync.
    let clock = Clock::new(TimeSourceKind::Monotonic);
    let entry = Arc::new(Entry::single(clock.now_ns(), None));
    let start = std::time::Instant::now();
    let outcome = clock.wait_sync(&entry);
    assert!(matches!(outcome, WaitOutcome::Ok | WaitOutcome::Early));
    assert!(start.elapsed() < Duration::from_millis(5));
}

#[test]
fn two_sync_waiters_do_not_block_each_other() {
    // Scenario 6: two threads wait_sync on independent entries with
    // different deadlines; neither should wait longer than its own.
    let clock = Clock::new(TimeSourceKind::Monotonic);
    let t0 = clock.now_ns();
    let e1 = Arc::new(Entry::single(t0 + millis(10), None));
    let e2 = Arc::new(Entry::single(t0 + millis(20), None));

    let c1 = clock.clone();
    let h1 = std::thread::spawn(move || c1.wait_sync(&e1));
    let c2 = clock.clone();
    let h2 = std::thread::spawn(move || c2.wait_sync(&e2));

    assert_eq!(h1.join().unwrap(), WaitOutcome::Ok);
    assert_eq!(h2.join().unwrap(), WaitOutcome::Ok);
}

#[test]
fn default_clock_singleton_is_shared_and_overridable() {
    sysclock::set_default(None);
    let a = sysclock::obtain_default();
    let b = sysclock::obtain_default();
    assert!(Arc::ptr_eq(&a, &b));

    let custom = Clock::new(TimeSourceKind::Realtime);
    sysclock::set_default(Some(custom.clone()));
    assert!(Arc::ptr_eq(&sysclock::obtain_default(), &custom));
    sysclock::set_default(None);
}
