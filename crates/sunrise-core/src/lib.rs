//! Core of the `sunrise` recovery daemon.
//!
//! Watches the Sunshine log for a trigger line (a client found no display),
//! and when a new one appears, runs a command to wake the display and
//! optionally restarts Sunshine.
//!
//! # Layout
//!
//! ```text
//! timestamp      parse "[YYYY-MM-DD HH:MM:SS.mmm]" line prefixes
//! observe        read log size + lines
//! tracker        rotation detection and per-timestamp deduplication
//! command        CommandSpec, Launcher trait, SystemLauncher
//! orchestrator   one tick: scan, then wake / wait / restart
//! config         YAML config, validation, resolved Settings
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod io;
pub mod observe;
pub mod orchestrator;
pub mod timestamp;
pub mod tracker;

pub use error::{Result, SunriseError};
