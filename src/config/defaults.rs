//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Default number of history entries the picker displays.
/// Display cap only; the store itself is unbounded.
pub const DEFAULT_HISTORY_LENGTH: usize = 10;

/// Default seconds the hotkey chord must stay down before the picker shows.
/// Shorter presses are treated as a plain paste.
pub const DEFAULT_HOLD_BEFORE_SHOWING_SECS: f64 = 0.15;

/// Default seconds between clipboard polls.
pub const DEFAULT_POLL_CLIPBOARD_INTERVAL_SECS: f64 = 0.5;
