//! Configuration type definitions
//!
//! This module contains the struct definitions for user settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::defaults::*;

// ============================================
// SETTINGS
// ============================================

/// User-facing settings, stored as JSON in the config file.
///
/// Field names match the on-disk keys. Unknown keys in the file are ignored
/// so older builds can read newer files; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// How many entries the picker shows (default: 10).
    /// Display cap only; storage keeps everything.
    #[serde(default = "default_history_length")]
    pub history_length: usize,
    /// Seconds the chord must stay down before the picker appears (default: 0.15)
    #[serde(default = "default_hold_before_showing")]
    pub hold_before_showing: f64,
    /// Seconds between clipboard polls (default: 0.5)
    #[serde(default = "default_poll_clipboard_interval")]
    pub poll_clipboard_interval: f64,
}

fn default_history_length() -> usize {
    DEFAULT_HISTORY_LENGTH
}
fn default_hold_before_showing() -> f64 {
    DEFAULT_HOLD_BEFORE_SHOWING_SECS
}
fn default_poll_clipboard_interval() -> f64 {
    DEFAULT_POLL_CLIPBOARD_INTERVAL_SECS
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            history_length: DEFAULT_HISTORY_LENGTH,
            hold_before_showing: DEFAULT_HOLD_BEFORE_SHOWING_SECS,
            poll_clipboard_interval: DEFAULT_POLL_CLIPBOARD_INTERVAL_SECS,
        }
    }
}

impl Settings {
    /// Hold threshold as a `Duration`.
    /// Non-finite or negative values fall back to the default.
    pub fn hold_threshold(&self) -> Duration {
        seconds_or_default(self.hold_before_showing, DEFAULT_HOLD_BEFORE_SHOWING_SECS)
    }

    /// Monitor poll interval as a `Duration`.
    /// Non-finite or negative values fall back to the default.
    pub fn poll_interval(&self) -> Duration {
        seconds_or_default(
            self.poll_clipboard_interval,
            DEFAULT_POLL_CLIPBOARD_INTERVAL_SECS,
        )
    }
}

fn seconds_or_default(secs: f64, fallback: f64) -> Duration {
    let secs = if secs.is_finite() && secs >= 0.0 {
        secs
    } else {
        fallback
    };
    Duration::from_secs_f64(secs)
}
