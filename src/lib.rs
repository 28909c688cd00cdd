//! peak_fitness - terminal client for the Peak Fitness exercise tracker
//!
//! This library provides both CLI and TUI interfaces for logging pushups,
//! pull-ups and custom exercises, browsing the leaderboard and managing the
//! account, with credentials kept in the system keyring.

pub mod api;
pub mod cli;
pub mod core;
pub mod error;
pub mod tui;

pub use error::{PeakError, Result};
