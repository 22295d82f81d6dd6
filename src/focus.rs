//! Foreground window tracking
//!
//! A real picker window steals focus when it shows, but the paste has to
//! land in the window the user was working in when the hold began. That
//! window is captured at trigger time and restored before any synthesized
//! keystroke goes out.

/// The window that had focus when a hotkey session began.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundWindow {
    #[cfg(target_os = "windows")]
    hwnd: isize,
    title: String,
}

impl ForegroundWindow {
    /// Capture the current foreground window. `None` when the desktop has
    /// no focused window (or off Windows).
    #[cfg(target_os = "windows")]
    pub fn capture() -> Option<ForegroundWindow> {
        use windows::Win32::UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowTextW};

        let hwnd = unsafe { GetForegroundWindow() };
        if hwnd.0 == 0 {
            return None;
        }
        let mut buf = [0u16; 256];
        let len = unsafe { GetWindowTextW(hwnd, &mut buf) } as usize;
        Some(ForegroundWindow {
            hwnd: hwnd.0,
            title: String::from_utf16_lossy(&buf[..len]),
        })
    }

    #[cfg(not(target_os = "windows"))]
    pub fn capture() -> Option<ForegroundWindow> {
        None
    }

    /// Bring the captured window back to the foreground. Failure is only
    /// worth a debug line; the paste still goes to whatever has focus.
    #[cfg(target_os = "windows")]
    pub fn restore(&self) {
        use tracing::debug;
        use windows::Win32::Foundation::HWND;
        use windows::Win32::UI::WindowsAndMessaging::SetForegroundWindow;

        let restored = unsafe { SetForegroundWindow(HWND(self.hwnd)) }.as_bool();
        if !restored {
            debug!(title = %self.title, "Could not restore foreground window");
        }
    }

    #[cfg(not(target_os = "windows"))]
    pub fn restore(&self) {}

    pub fn title(&self) -> &str {
        &self.title
    }
}
