//! Sysclock basic example
//!
//! Demonstrates a synchronous wait, an asynchronous one-shot callback,
//! and an asynchronous periodic callback cancelled after a few fires.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sysclock::{obtain_default, ClockCallback, Entry, FnClockCallback};

fn main() {
    println!("=== Sysclock Basic Example ===\n");

    let clock = obtain_default();
    println!("clock-type: {}", clock.clock_type());

    println!("\nwaiting synchronously for 20ms...");
    let deadline = clock.now_ns() + 20_000_000;
    let entry = Arc::new(Entry::single(deadline, None));
    let outcome = clock.wait_sync(&entry);
    println!("wait_sync returned {:?}", outcome);

    println!("\nscheduling an async one-shot timer for 30ms out...");
    let done = Arc::new(AtomicUsize::new(0));
    let done2 = done.clone();
    let cb: Arc<dyn ClockCallback> = Arc::new(FnClockCallback(move |requested_ns, id| {
        println!("[async] entry {} fired, requested at {}ns", id, requested_ns);
        done2.fetch_add(1, Ordering::SeqCst);
    }));
    let deadline = clock.now_ns() + 30_000_000;
    clock.wait_async(Arc::new(Entry::single(deadline, Some(cb))));

    println!("\nscheduling a periodic timer, interval 25ms, stopping after 3 fires...");
    let count = Arc::new(AtomicUsize::new(0));
    let count2 = count.clone();
    let holder: Arc<std::sync::Mutex<Option<Arc<Entry>>>> = Arc::new(std::sync::Mutex::new(None));
    let holder2 = holder.clone();
    let periodic_cb: Arc<dyn ClockCallback> = Arc::new(FnClockCallback(move |requested_ns, id| {
        let n = count2.fetch_add(1, Ordering::SeqCst) + 1;
        println!("[periodic] entry {} fire #{}, requested at {}ns", id, n, requested_ns);
        if n == 3 {
            if let Some(e) = holder2.lock().unwrap().as_ref() {
                e.unschedule();
            }
        }
    }));
    let deadline = clock.now_ns() + 25_000_000;
    let periodic = Arc::new(Entry::periodic(deadline, 25_000_000, Some(periodic_cb)));
    *holder.lock().unwrap() = Some(periodic.clone());
    clock.wait_async(periodic);

    std::thread::sleep(Duration::from_millis(200));
    println!(
        "\none-shot fired {} time(s), periodic fired {} time(s)",
        done.load(Ordering::SeqCst),
        count.load(Ordering::SeqCst)
    );

    clock.dispose();
    println!("done.");
}
