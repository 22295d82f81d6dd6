//! ClipKeep - a clipboard history keeper for Windows
//!
//! Polls the system clipboard into a persistent history and intercepts the
//! paste combination: hold it to paste an older entry, tap it to paste as
//! usual.

pub mod clipboard;
pub mod config;
pub mod error;
pub mod focus;
pub mod history;
pub mod hotkey;
pub mod logging;
pub mod paste;
pub mod picker;
pub mod watcher;
