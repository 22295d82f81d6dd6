//! Paste dispatcher
//!
//! Writes a chosen history entry back to the clipboard as an internal
//! write, restores the window the user was working in, then replays the
//! native paste combination so the entry lands there.

use tracing::info;

use crate::clipboard::{Clipboard, Snapshot};
use crate::error::Result;
use crate::focus::ForegroundWindow;
use crate::hotkey::HotkeyBackend;

/// Apply one history entry to the foreground application.
///
/// The caller must have released the hotkey registration first; an active
/// registration would trap the synthesized combination instead of letting
/// it reach the foreground window. No keystroke is sent when the clipboard
/// write fails.
pub fn dispatch<C, B>(
    entry: &Snapshot,
    clipboard: &mut C,
    backend: &mut B,
    focus: Option<&ForegroundWindow>,
) -> Result<()>
where
    C: Clipboard,
    B: HotkeyBackend,
{
    clipboard.write(entry)?;
    if let Some(window) = focus {
        window.restore();
    }
    backend.send_combination();
    info!(kind = ?entry.kind, "Pasted history entry");
    Ok(())
}
