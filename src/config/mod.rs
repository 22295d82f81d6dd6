//! Configuration module - Application settings and user preferences
//!
//! This module provides functionality for:
//! - Loading settings from the JSON config file
//! - Default values for all settings
//! - Type definitions for the settings structure
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Settings struct definition and accessors
//! - `loader` - File system loading and persistence

mod defaults;
mod loader;
mod types;

// Re-export defaults that are used externally
pub use defaults::{
    DEFAULT_HISTORY_LENGTH, DEFAULT_HOLD_BEFORE_SHOWING_SECS, DEFAULT_POLL_CLIPBOARD_INTERVAL_SECS,
};

// Re-export types that are used externally
pub use types::Settings;

// Re-export loader
pub use loader::{default_config_path, load_or_create, load_settings, save_settings};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
