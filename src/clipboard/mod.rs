//! Clipboard Module
//!
//! Snapshot capture, format classification and change monitoring for the
//! system clipboard.
//!
//! ## Module Structure
//! - `snapshot`: Core types (ContentKind, Snapshot, Observation) and the `Clipboard` seam
//! - `formats`: Format identifiers and the classification policy
//! - `win32`: Win32-backed `Clipboard` implementation
//! - `monitor`: Background polling, deduplication and the persist protocol

mod formats;
mod monitor;
mod snapshot;
mod win32;

// Re-export public API

// Types and the clipboard seam
pub use snapshot::{Clipboard, ContentKind, Observation, Snapshot};

// Classification
pub use formats::{
    classify, Classification, FormatTable, CF_HDROP, CF_TEXT, CF_UNICODETEXT, HTML_FORMAT_NAME,
    MARKER_FORMAT_NAME,
};

// Win32 backend
pub use win32::SystemClipboard;

// Monitor
pub use monitor::start_monitor;

// Test-only exports
#[cfg(test)]
pub use snapshot::testing;
#[cfg(test)]
pub(crate) use monitor::check_clipboard;
