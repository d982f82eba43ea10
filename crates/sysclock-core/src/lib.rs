//! # sysclock-core
//!
//! Platform-agnostic types and traits for the sysclock system clock.
//!
//! This crate contains no OS-specific code; everything that touches a
//! real clock source or OS synchronization primitive lives in
//! `sysclock-runtime`.
//!
//! ## Modules
//!
//! - `entry_id` - Globally unique timer entry identifier
//! - `status` - Entry status and scheduler wait-outcome enums
//! - `time_source` - `TimeSourceKind` and the `TimeSource` trait
//! - `error` - Error types
//! - `kprint` - Level-filtered debug printing macros
//! - `env` - Environment variable utilities

#![allow(dead_code)]

pub mod entry_id;
pub mod env;
pub mod error;
pub mod kprint;
pub mod status;
pub mod time_source;

pub use entry_id::EntryId;
pub use env::{env_get, env_get_bool, env_get_opt, env_get_str, env_is_set};
pub use error::{ClockError, ClockResult};
pub use status::{EntryStatus, WaitOutcome};
pub use time_source::{TimeSource, TimeSourceKind};
