//! Level-filtered diagnostic print macros for sysclock
//!
//! Thread-safe, context-aware debug output, zero external logging
//! dependency, configured through environment variables read once and
//! cached in atomics. Every line is automatically stamped with
//! `[entry:<id>]`, set by the scheduler/dispatcher around the
//! operation on a particular entry.
//!
//! # Environment Variables
//!
//! - `SYSCLOCK_LOG_FLUSH=1` - Flush stderr after each line
//! - `SYSCLOCK_LOG_LEVEL=<level>` - off|error|warn|info|debug|trace (or 0-5)
//! - `SYSCLOCK_LOG_TIME=1` - Prefix each line with a nanosecond timestamp
//!
//! # Output Format
//!
//! Without timestamp: `[LEVEL] [entry:<id>] message`
//! With timestamp:    `[LEVEL] [<ns>] [entry:<id>] message`
//!
//! # Usage
//!
//! ```ignore
//! use sysclock_core::{cinfo, cwarn, cerror};
//!
//! cdebug!("wait_sync entering WaitCore, diff={}ns", diff);
//! cwarn!("TAI clock unavailable, degrading to realtime");
//! cerror!("dispatcher thread failed to spawn: {}", err);
//! ```

use crate::env::env_get_bool;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Instant;

/// Log levels, most to least severe filtering.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => LogLevel::Off,
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Off => "",
            LogLevel::Error => "[ERROR]",
            LogLevel::Warn => "[WARN] ",
            LogLevel::Info => "[INFO] ",
            LogLevel::Debug => "[DEBUG]",
            LogLevel::Trace => "[TRACE]",
        }
    }
}

static FLUSH_ENABLED: AtomicBool = AtomicBool::new(false);
static TIME_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);
static INITIALIZED: AtomicBool = AtomicBool::new(false);

static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize logging configuration from the environment.
///
/// Called automatically on first log; callable explicitly for
/// deterministic initialization (e.g. at the top of `main`).
pub fn init() {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    START_TIME.get_or_init(Instant::now);

    FLUSH_ENABLED.store(env_get_bool("SYSCLOCK_LOG_FLUSH", false), Ordering::Relaxed);
    TIME_ENABLED.store(env_get_bool("SYSCLOCK_LOG_TIME", false), Ordering::Relaxed);

    if let Ok(val) = std::env::var("SYSCLOCK_LOG_LEVEL") {
        let level = match val.to_lowercase().as_str() {
            "off" | "0" => LogLevel::Off,
            "error" | "1" => LogLevel::Error,
            "warn" | "2" => LogLevel::Warn,
            "info" | "3" => LogLevel::Info,
            "debug" | "4" => LogLevel::Debug,
            "trace" | "5" => LogLevel::Trace,
            _ => LogLevel::Info,
        };
        LOG_LEVEL.store(level as u8, Ordering::Relaxed);
    }
}

#[inline]
pub fn flush_enabled() -> bool {
    if !INITIALIZED.load(Ordering::Relaxed) {
        init();
    }
    FLUSH_ENABLED.load(Ordering::Relaxed)
}

#[inline]
pub fn time_enabled() -> bool {
    if !INITIALIZED.load(Ordering::Relaxed) {
        init();
    }
    TIME_ENABLED.load(Ordering::Relaxed)
}

#[inline]
pub fn log_level() -> LogLevel {
    if !INITIALIZED.load(Ordering::Relaxed) {
        init();
    }
    LogLevel::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

pub fn set_log_level(level: LogLevel) {
    LOG_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn set_flush_enabled(enabled: bool) {
    FLUSH_ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn set_time_enabled(enabled: bool) {
    TIME_ENABLED.store(enabled, Ordering::Relaxed);
}

#[inline]
pub fn level_enabled(level: LogLevel) -> bool {
    level as u8 <= log_level() as u8
}

#[inline]
pub fn elapsed_ns() -> u64 {
    let start = START_TIME.get_or_init(Instant::now);
    start.elapsed().as_nanos() as u64
}

// Thread-local: which entry the calling thread is currently operating
// on, for log context. Set/cleared by the scheduler and dispatcher
// around a single operation; never by user code.
thread_local! {
    static CURRENT_ENTRY: std::cell::Cell<Option<u64>> = const { std::cell::Cell::new(None) };
}

pub fn set_current_entry(id: u64) {
    CURRENT_ENTRY.with(|c| c.set(Some(id)));
}

pub fn clear_current_entry() {
    CURRENT_ENTRY.with(|c| c.set(None));
}

#[inline]
pub fn get_current_entry() -> Option<u64> {
    CURRENT_ENTRY.with(|c| c.get())
}

fn format_context() -> String {
    match get_current_entry() {
        Some(id) => format!("[entry:{}]", id),
        None => "[entry:--]".to_string(),
    }
}

#[doc(hidden)]
pub fn _cprint_impl(args: std::fmt::Arguments<'_>) {
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = handle.write_fmt(args);
    if flush_enabled() {
        let _ = handle.flush();
    }
}

#[doc(hidden)]
pub fn _cprintln_impl(args: std::fmt::Arguments<'_>) {
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = handle.write_fmt(args);
    let _ = handle.write_all(b"\n");
    if flush_enabled() {
        let _ = handle.flush();
    }
}

#[doc(hidden)]
pub fn _clog_impl(level: LogLevel, args: std::fmt::Arguments<'_>) {
    if !level_enabled(level) {
        return;
    }

    let stderr = std::io::stderr();
    let mut handle = stderr.lock();

    let _ = write!(handle, "{} ", level.prefix());

    if time_enabled() {
        let _ = write!(handle, "[{}] ", elapsed_ns());
    }

    let _ = write!(handle, "{} ", format_context());

    let _ = handle.write_fmt(args);
    let _ = handle.write_all(b"\n");

    if flush_enabled() {
        let _ = handle.flush();
    }
}

/// Print to stderr (no newline, no context).
#[macro_export]
macro_rules! cprint {
    ($($arg:tt)*) => {{
        $crate::kprint::_cprint_impl(format_args!($($arg)*));
    }};
}

/// Print to stderr with newline (no context).
#[macro_export]
macro_rules! cprintln {
    () => {{
        $crate::kprint::_cprintln_impl(format_args!(""));
    }};
    ($($arg:tt)*) => {{
        $crate::kprint::_cprintln_impl(format_args!($($arg)*));
    }};
}

/// Error level log with entry context.
#[macro_export]
macro_rules! cerror {
    ($($arg:tt)*) => {{
        $crate::kprint::_clog_impl($crate::kprint::LogLevel::Error, format_args!($($arg)*));
    }};
}

/// Warning level log with entry context.
#[macro_export]
macro_rules! cwarn {
    ($($arg:tt)*) => {{
        $crate::kprint::_clog_impl($crate::kprint::LogLevel::Warn, format_args!($($arg)*));
    }};
}

/// Info level log with entry context.
#[macro_export]
macro_rules! cinfo {
    ($($arg:tt)*) => {{
        $crate::kprint::_clog_impl($crate::kprint::LogLevel::Info, format_args!($($arg)*));
    }};
}

/// Debug level log with entry context.
#[macro_export]
macro_rules! cdebug {
    ($($arg:tt)*) => {{
        $crate::kprint::_clog_impl($crate::kprint::LogLevel::Debug, format_args!($($arg)*));
    }};
}

/// Trace level log with entry context.
#[macro_export]
macro_rules! ctrace {
    ($($arg:tt)*) => {{
        $crate::kprint::_clog_impl($crate::kprint::LogLevel::Trace, format_args!($($arg)*));
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    #[test]
    fn from_u8_clamps_to_trace() {
        assert_eq!(LogLevel::from_u8(0), LogLevel::Off);
        assert_eq!(LogLevel::from_u8(1), LogLevel::Error);
        assert_eq!(LogLevel::from_u8(99), LogLevel::Trace);
    }

    #[test]
    fn current_entry_context() {
        assert_eq!(get_current_entry(), None);
        set_current_entry(7);
        assert_eq!(get_current_entry(), Some(7));
        clear_current_entry();
        assert_eq!(get_current_entry(), None);
    }

    #[test]
    fn elapsed_ns_increases() {
        let t1 = elapsed_ns();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let t2 = elapsed_ns();
        assert!(t2 > t1);
    }

    #[test]
    fn macros_compile_and_are_silenceable() {
        set_log_level(LogLevel::Off);
        cprint!("test");
        cprintln!("test {}", 42);
        cerror!("error {}", "msg");
        cwarn!("warn");
        cinfo!("info");
        cdebug!("debug");
        ctrace!("trace");
    }
}
