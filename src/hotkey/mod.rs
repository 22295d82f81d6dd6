//! Global hotkey interception
//!
//! Claims the paste combination system-wide and turns each trigger into a
//! hold/tap session. A hold shows the history picker and pastes the entry
//! chosen at release; a tap forwards a plain paste to the foreground
//! window as if the combination had never been intercepted.
//!
//! ## Module Structure
//!
//! - `backend`: the OS seam (registration, key state, message pump,
//!   keystroke synthesis)
//! - `session`: the hold/tap state machine for one trigger
//! - `listener`: the worker loop that owns registration and the pump

mod backend;
mod listener;
mod session;

// Backend seam
pub use backend::{HotkeyBackend, PumpEvent, CHORD_NAME, MODIFIER_KEY, TRIGGER_KEY};
#[cfg(target_os = "windows")]
pub use backend::{current_thread_id, post_quit, Win32Backend};
#[cfg(not(target_os = "windows"))]
pub use backend::NullBackend;

// Session resolution
pub use session::{resolve_hold, HoldOutcome, HoldPhase};

// Worker loop
pub use listener::run_listener;

// Shared fakes for tests in other modules
#[cfg(test)]
pub use backend::testing;
