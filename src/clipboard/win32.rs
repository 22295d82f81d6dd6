//! Win32 clipboard backend
//!
//! Talks to the OS clipboard through the `windows` crate. The clipboard is a
//! single shared resource, so every open is paired with a close through an
//! RAII guard, and opens retry briefly while another process holds it.
//!
//! On non-Windows platforms the backend still constructs so the rest of the
//! program can run, but it observes nothing and rejects writes.

use std::time::Duration;

use tracing::warn;

use super::formats::FormatTable;
use super::snapshot::{Clipboard, Observation, Snapshot};
use crate::error::{ClipKeepError, Result};

/// Retry cadence while another process holds the clipboard open.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
const OPEN_RETRY: Duration = Duration::from_millis(25);

/// Total budget for opening the clipboard before giving up on this attempt.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
const OPEN_BUDGET: Duration = Duration::from_millis(2_000);

/// Clipboard backed by the Win32 API.
pub struct SystemClipboard {
    #[cfg_attr(not(target_os = "windows"), allow(dead_code))]
    table: FormatTable,
}

impl SystemClipboard {
    pub fn new() -> Self {
        SystemClipboard {
            table: register_formats(),
        }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "windows")]
fn register_formats() -> FormatTable {
    use super::formats::{HTML_FORMAT_NAME, MARKER_FORMAT_NAME};
    use tracing::debug;

    let html = sys::register_format(HTML_FORMAT_NAME);
    let marker = sys::register_format(MARKER_FORMAT_NAME);
    if marker == 0 {
        // Without the marker every write of ours looks external and gets
        // re-recorded by the monitor.
        warn!("Failed to register the internal-write marker format");
    }
    debug!(html, marker, "Registered clipboard formats");
    FormatTable::new(html, marker)
}

#[cfg(not(target_os = "windows"))]
fn register_formats() -> FormatTable {
    warn!("System clipboard access requires Windows; clipboard will observe nothing");
    FormatTable::new(0, 0)
}

#[cfg(target_os = "windows")]
impl Clipboard for SystemClipboard {
    fn observe(&mut self) -> Observation {
        sys::observe(&self.table)
    }

    fn write(&mut self, snapshot: &Snapshot) -> Result<()> {
        sys::write(&self.table, snapshot)
    }
}

#[cfg(not(target_os = "windows"))]
impl Clipboard for SystemClipboard {
    fn observe(&mut self) -> Observation {
        Observation::external(Snapshot::none())
    }

    fn write(&mut self, _snapshot: &Snapshot) -> Result<()> {
        Err(ClipKeepError::Clipboard(
            "system clipboard writes are only supported on Windows".into(),
        ))
    }
}

/// Pick the highest-fidelity format for a snapshot and encode its payload.
///
/// Unicode text wins over everything else; a file list is written back as
/// its text representation (paths joined by CRLF) rather than re-packed as
/// CF_HDROP; ANSI text and HTML are byte formats with a trailing NUL.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn writable_payload(table: &FormatTable, snapshot: &Snapshot) -> Result<(u32, Vec<u8>)> {
    use super::formats::{CF_TEXT, CF_UNICODETEXT};

    if let Some(text) = &snapshot.unicode_text {
        return Ok((CF_UNICODETEXT, wide_bytes(text)));
    }
    if let Some(paths) = &snapshot.file_list {
        return Ok((CF_UNICODETEXT, wide_bytes(&paths.join("\r\n"))));
    }
    if let Some(text) = &snapshot.text {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        return Ok((CF_TEXT, bytes));
    }
    if let Some(html) = &snapshot.html {
        if table.html != 0 {
            let mut bytes = html.as_bytes().to_vec();
            bytes.push(0);
            return Ok((table.html, bytes));
        }
    }
    Err(ClipKeepError::Clipboard(
        "snapshot has no writable payload".into(),
    ))
}

/// UTF-16LE bytes with a trailing NUL, as CF_UNICODETEXT expects.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn wide_bytes(s: &str) -> Vec<u8> {
    s.encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(|unit| unit.to_le_bytes())
        .collect()
}

#[cfg(target_os = "windows")]
mod sys {
    use std::ffi::c_void;
    use std::thread;
    use std::time::Instant;

    use tracing::{debug, warn};
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::{HANDLE, HGLOBAL};
    use windows::Win32::System::DataExchange::{
        CloseClipboard, EmptyClipboard, EnumClipboardFormats, GetClipboardData, OpenClipboard,
        RegisterClipboardFormatW, SetClipboardData,
    };
    use windows::Win32::System::Memory::{
        GlobalAlloc, GlobalFree, GlobalLock, GlobalSize, GlobalUnlock, GMEM_MOVEABLE,
    };
    use windows::Win32::UI::Shell::{DragQueryFileW, HDROP};

    use super::{writable_payload, OPEN_BUDGET, OPEN_RETRY};
    use crate::clipboard::formats::{classify, FormatTable, CF_HDROP, CF_TEXT, CF_UNICODETEXT};
    use crate::clipboard::snapshot::{ContentKind, Observation, Snapshot};
    use crate::error::{ClipKeepError, Result};

    /// Register a named clipboard format, returning 0 when registration fails.
    pub(super) fn register_format(name: &str) -> u32 {
        let wide: Vec<u16> = name.encode_utf16().chain(std::iter::once(0)).collect();
        unsafe { RegisterClipboardFormatW(PCWSTR(wide.as_ptr())) }
    }

    /// Holds the clipboard open; closes it on drop so no code path can leak
    /// the open and lock out every other program.
    struct ClipboardGuard;

    impl ClipboardGuard {
        /// Open the clipboard, retrying while another process holds it.
        /// Returns `None` once the budget is spent.
        fn open() -> Option<ClipboardGuard> {
            let deadline = Instant::now() + OPEN_BUDGET;
            loop {
                match unsafe { OpenClipboard(None) } {
                    Ok(()) => return Some(ClipboardGuard),
                    Err(e) => {
                        if Instant::now() >= deadline {
                            debug!(error = ?e, "Clipboard stayed busy past the open budget");
                            return None;
                        }
                        thread::sleep(OPEN_RETRY);
                    }
                }
            }
        }
    }

    impl Drop for ClipboardGuard {
        fn drop(&mut self) {
            if let Err(e) = unsafe { CloseClipboard() } {
                warn!(error = ?e, "CloseClipboard failed");
            }
        }
    }

    /// All format ids currently advertised. Caller must hold the open guard.
    fn enumerate_formats() -> Vec<u32> {
        let mut formats = Vec::new();
        let mut current = 0u32;
        loop {
            current = unsafe { EnumClipboardFormats(current) };
            if current == 0 {
                break;
            }
            formats.push(current);
        }
        formats
    }

    /// Read CF_UNICODETEXT. The allocation size bounds the scan for the
    /// terminating NUL, so a missing terminator cannot read past the end.
    fn read_unicode_text() -> Option<String> {
        unsafe {
            let handle = GetClipboardData(CF_UNICODETEXT).ok()?;
            let hglobal = HGLOBAL(handle.0 as *mut c_void);
            let ptr = GlobalLock(hglobal) as *const u16;
            if ptr.is_null() {
                return None;
            }
            let units = GlobalSize(hglobal) / 2;
            let slice = std::slice::from_raw_parts(ptr, units);
            let len = slice.iter().position(|&u| u == 0).unwrap_or(units);
            let text = String::from_utf16_lossy(&slice[..len]);
            let _ = GlobalUnlock(hglobal);
            Some(text)
        }
    }

    /// Read a byte-oriented format (CF_TEXT, registered HTML) as a string.
    fn read_bytes_as_string(format: u32) -> Option<String> {
        unsafe {
            let handle = GetClipboardData(format).ok()?;
            let hglobal = HGLOBAL(handle.0 as *mut c_void);
            let ptr = GlobalLock(hglobal) as *const u8;
            if ptr.is_null() {
                return None;
            }
            let size = GlobalSize(hglobal);
            let slice = std::slice::from_raw_parts(ptr, size);
            let len = slice.iter().position(|&b| b == 0).unwrap_or(size);
            let text = String::from_utf8_lossy(&slice[..len]).into_owned();
            let _ = GlobalUnlock(hglobal);
            Some(text)
        }
    }

    /// Read CF_HDROP as a list of absolute paths.
    fn read_file_list() -> Option<Vec<String>> {
        unsafe {
            let handle = GetClipboardData(CF_HDROP).ok()?;
            let hdrop = HDROP(handle.0);
            let count = DragQueryFileW(hdrop, 0xFFFF_FFFF, None);
            let mut paths = Vec::with_capacity(count as usize);
            for index in 0..count {
                let len = DragQueryFileW(hdrop, index, None) as usize;
                let mut buf = vec![0u16; len + 1];
                let copied = DragQueryFileW(hdrop, index, Some(&mut buf)) as usize;
                paths.push(String::from_utf16_lossy(&buf[..copied]));
            }
            Some(paths)
        }
    }

    /// Capture whatever is on the clipboard right now.
    ///
    /// A busy clipboard or a failed payload read is not an error: both
    /// degrade to a `None`-kind snapshot and the monitor moves on.
    pub(super) fn observe(table: &FormatTable) -> Observation {
        let Some(_guard) = ClipboardGuard::open() else {
            return Observation::external(Snapshot::none());
        };

        let formats = enumerate_formats();
        let class = classify(&formats, table);

        let mut snapshot = match class.kind {
            ContentKind::None => Snapshot::none(),
            ContentKind::UnicodeText => match read_unicode_text() {
                Some(text) => Snapshot::unicode(text),
                None => Snapshot::none(),
            },
            ContentKind::Text => match read_bytes_as_string(CF_TEXT) {
                Some(text) => Snapshot::ansi(text),
                None => Snapshot::none(),
            },
            ContentKind::FileList => match read_file_list() {
                Some(paths) => Snapshot::files(paths),
                None => Snapshot::none(),
            },
            ContentKind::Html => match read_bytes_as_string(table.html) {
                Some(html) => Snapshot::html_fragment(html),
                None => Snapshot::none(),
            },
        };

        if class.has_html && !snapshot.is_none() && snapshot.kind != ContentKind::Html {
            if let Some(html) = read_bytes_as_string(table.html) {
                snapshot = snapshot.with_html(html);
            }
        }

        Observation {
            snapshot,
            internal: class.internal,
        }
    }

    /// Replace the clipboard contents with a snapshot's payload and stamp
    /// the internal-write marker beside it.
    pub(super) fn write(table: &FormatTable, snapshot: &Snapshot) -> Result<()> {
        let (format, bytes) = writable_payload(table, snapshot)?;

        let _guard = ClipboardGuard::open().ok_or_else(|| {
            ClipKeepError::Clipboard("clipboard stayed busy, write abandoned".into())
        })?;

        unsafe { EmptyClipboard() }
            .map_err(|e| ClipKeepError::Clipboard(format!("EmptyClipboard failed: {e}")))?;

        set_clipboard_bytes(format, &bytes)?;

        if table.marker != 0 {
            set_clipboard_bytes(table.marker, &[0])?;
        }
        Ok(())
    }

    /// Copy bytes into a movable global allocation and hand it to the
    /// clipboard. Ownership transfers to the OS on success; on failure the
    /// allocation is freed here.
    fn set_clipboard_bytes(format: u32, bytes: &[u8]) -> Result<()> {
        unsafe {
            let hglobal = GlobalAlloc(GMEM_MOVEABLE, bytes.len().max(1))
                .map_err(|e| ClipKeepError::Clipboard(format!("GlobalAlloc failed: {e}")))?;
            let ptr = GlobalLock(hglobal);
            if ptr.is_null() {
                let _ = GlobalFree(hglobal);
                return Err(ClipKeepError::Clipboard("GlobalLock returned null".into()));
            }
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr as *mut u8, bytes.len());
            let _ = GlobalUnlock(hglobal);

            if let Err(e) = SetClipboardData(format, HANDLE(hglobal.0 as isize)) {
                let _ = GlobalFree(hglobal);
                return Err(ClipKeepError::Clipboard(format!(
                    "SetClipboardData({format}) failed: {e}"
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests (always run with `cargo test`)
// ============================================================================

#[cfg(test)]
mod tests {
    use super::super::formats::{CF_TEXT, CF_UNICODETEXT};
    use super::*;

    const TABLE: FormatTable = FormatTable {
        html: 0xC123,
        marker: 0xC456,
    };

    #[test]
    fn test_wide_bytes_are_utf16le_with_nul() {
        assert_eq!(wide_bytes("a"), vec![0x61, 0x00, 0x00, 0x00]);
        // '€' is U+20AC, little-endian AC 20
        assert_eq!(wide_bytes("€"), vec![0xAC, 0x20, 0x00, 0x00]);
    }

    #[test]
    fn test_payload_prefers_unicode_text() {
        let snapshot = Snapshot::unicode("hi").with_html("<b>hi</b>");
        let (format, bytes) = writable_payload(&TABLE, &snapshot).unwrap();
        assert_eq!(format, CF_UNICODETEXT);
        assert_eq!(bytes, wide_bytes("hi"));
    }

    #[test]
    fn test_file_list_written_as_text_representation() {
        let snapshot = Snapshot::files(["C:\\a.txt", "C:\\b.txt"]);
        let (format, bytes) = writable_payload(&TABLE, &snapshot).unwrap();
        assert_eq!(format, CF_UNICODETEXT);
        assert_eq!(bytes, wide_bytes("C:\\a.txt\r\nC:\\b.txt"));
    }

    #[test]
    fn test_ansi_text_gets_trailing_nul() {
        let (format, bytes) = writable_payload(&TABLE, &Snapshot::ansi("abc")).unwrap();
        assert_eq!(format, CF_TEXT);
        assert_eq!(bytes, b"abc\0");
    }

    #[test]
    fn test_html_only_uses_registered_format() {
        let snapshot = Snapshot::html_fragment("<p>x</p>");
        let (format, bytes) = writable_payload(&TABLE, &snapshot).unwrap();
        assert_eq!(format, TABLE.html);
        assert_eq!(bytes, b"<p>x</p>\0");

        // Without a registered id there is nowhere to put the fragment.
        let unregistered = FormatTable::new(0, 0);
        assert!(writable_payload(&unregistered, &snapshot).is_err());
    }

    #[test]
    fn test_empty_snapshot_has_no_payload() {
        assert!(writable_payload(&TABLE, &Snapshot::none()).is_err());
    }

    #[test]
    fn test_empty_string_is_a_writable_payload() {
        let (format, bytes) = writable_payload(&TABLE, &Snapshot::unicode("")).unwrap();
        assert_eq!(format, CF_UNICODETEXT);
        assert_eq!(bytes, vec![0x00, 0x00]);
    }
}

// ============================================================================
// System Tests (require `cargo test --features system-tests`)
// ============================================================================
// These tests replace the real clipboard contents.

#[cfg(all(test, target_os = "windows", feature = "system-tests"))]
mod system_tests {
    use super::*;

    #[test]
    fn test_write_then_observe_round_trips_and_marks_internal() {
        let mut clipboard = SystemClipboard::new();
        clipboard
            .write(&Snapshot::unicode("clipkeep system test"))
            .expect("clipboard write should succeed");

        let observation = clipboard.observe();
        assert!(observation.internal, "own write should carry the marker");
        assert_eq!(
            observation.snapshot.unicode_text.as_deref(),
            Some("clipkeep system test")
        );
    }
}
