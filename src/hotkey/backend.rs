//! Hotkey OS seam
//!
//! Registration, instantaneous key-state sampling, the message-pump wait
//! and keystroke synthesis sit behind one trait so the hold/tap state
//! machine and the listener loop are testable off-platform.

use crate::error::Result;

/// Virtual-key code of the chord modifier (VK_CONTROL).
pub const MODIFIER_KEY: u32 = 0x11;

/// Virtual-key code of the chord trigger ('V').
pub const TRIGGER_KEY: u32 = 0x56;

/// Human name of the combination, for diagnostics.
pub const CHORD_NAME: &str = "Ctrl+V";

/// Identifier under which the combination is registered with the OS.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
const HOTKEY_ID: i32 = 1;

/// Message-pump outcomes the listener cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpEvent {
    /// The registered combination was triggered.
    Hotkey,
    /// A quit message arrived; unregister and exit.
    Quit,
    /// Anything else, already dispatched onward.
    Other,
}

/// OS surface for the hotkey worker.
pub trait HotkeyBackend {
    /// Claim the paste combination. Fails when another program owns it.
    fn register(&mut self) -> Result<()>;

    /// Release the registration.
    fn unregister(&mut self) -> Result<()>;

    /// Instantaneous down state of a virtual key.
    fn key_down(&self, key: u32) -> bool;

    /// Block until the next message of interest arrives.
    fn wait_message(&mut self) -> PumpEvent;

    /// Synthesize one press-and-release of the paste combination.
    fn send_combination(&mut self);
}

/// Backend that talks to the Win32 hotkey and input APIs.
///
/// Registration binds to the calling thread's message queue, so the same
/// thread must pump `wait_message`.
#[cfg(target_os = "windows")]
pub struct Win32Backend;

#[cfg(target_os = "windows")]
impl Win32Backend {
    pub fn new() -> Self {
        Win32Backend
    }
}

#[cfg(target_os = "windows")]
impl Default for Win32Backend {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "windows")]
impl HotkeyBackend for Win32Backend {
    fn register(&mut self) -> Result<()> {
        use windows::Win32::UI::Input::KeyboardAndMouse::{
            RegisterHotKey, MOD_CONTROL, MOD_NOREPEAT,
        };

        // MOD_NOREPEAT: the combination must be released before it can
        // re-trigger.
        unsafe { RegisterHotKey(None, HOTKEY_ID, MOD_CONTROL | MOD_NOREPEAT, TRIGGER_KEY) }
            .map_err(|e| crate::error::ClipKeepError::HotkeyRegistration {
                chord: CHORD_NAME.to_string(),
                code: e.code().0 as u32,
            })
    }

    fn unregister(&mut self) -> Result<()> {
        use windows::Win32::UI::Input::KeyboardAndMouse::UnregisterHotKey;

        unsafe { UnregisterHotKey(None, HOTKEY_ID) }
            .map_err(|e| crate::error::ClipKeepError::Hotkey(format!("unregister failed: {e}")))
    }

    fn key_down(&self, key: u32) -> bool {
        use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;

        let state = unsafe { GetAsyncKeyState(key as i32) };
        (state as u16 & 0x8000) != 0
    }

    fn wait_message(&mut self) -> PumpEvent {
        use windows::Win32::UI::WindowsAndMessaging::{
            DispatchMessageW, GetMessageW, TranslateMessage, MSG, WM_HOTKEY,
        };

        let mut msg = MSG::default();
        // Returns false once WM_QUIT is retrieved.
        let alive: bool = unsafe { GetMessageW(&mut msg, None, 0, 0) }.as_bool();
        if !alive {
            return PumpEvent::Quit;
        }
        if msg.message == WM_HOTKEY {
            return PumpEvent::Hotkey;
        }
        unsafe {
            TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
        PumpEvent::Other
    }

    fn send_combination(&mut self) {
        use tracing::warn;
        use windows::Win32::UI::Input::KeyboardAndMouse::{
            SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS,
            KEYEVENTF_KEYUP, VIRTUAL_KEY,
        };

        fn key_event(key: u32, flags: KEYBD_EVENT_FLAGS) -> INPUT {
            INPUT {
                r#type: INPUT_KEYBOARD,
                Anonymous: INPUT_0 {
                    ki: KEYBDINPUT {
                        wVk: VIRTUAL_KEY(key as u16),
                        wScan: 0,
                        dwFlags: flags,
                        time: 0,
                        dwExtraInfo: 0,
                    },
                },
            }
        }

        let sequence = [
            key_event(MODIFIER_KEY, KEYBD_EVENT_FLAGS(0)),
            key_event(TRIGGER_KEY, KEYBD_EVENT_FLAGS(0)),
            key_event(TRIGGER_KEY, KEYEVENTF_KEYUP),
            key_event(MODIFIER_KEY, KEYEVENTF_KEYUP),
        ];
        let sent =
            unsafe { SendInput(&sequence, std::mem::size_of::<INPUT>() as i32) };
        if sent != sequence.len() as u32 {
            warn!(sent, "SendInput delivered a partial combination");
        }
    }
}

/// The id of the thread that will pump hotkey messages.
#[cfg(target_os = "windows")]
pub fn current_thread_id() -> u32 {
    use windows::Win32::System::Threading::GetCurrentThreadId;

    unsafe { GetCurrentThreadId() }
}

/// Interrupt `wait_message` on the given thread with a quit message.
#[cfg(target_os = "windows")]
pub fn post_quit(thread_id: u32) {
    use tracing::warn;
    use windows::Win32::Foundation::{LPARAM, WPARAM};
    use windows::Win32::UI::WindowsAndMessaging::{PostThreadMessageW, WM_QUIT};

    if let Err(e) = unsafe { PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) } {
        warn!(error = ?e, thread_id, "Could not post quit to the hotkey listener");
    }
}

/// Backend for platforms without global hotkey support.
///
/// `register` succeeds with a warning so the rest of the program stays
/// alive; `wait_message` blocks until the quit channel fires.
#[cfg(not(target_os = "windows"))]
pub struct NullBackend {
    quit_rx: crossbeam_channel::Receiver<()>,
}

#[cfg(not(target_os = "windows"))]
impl NullBackend {
    pub fn new(quit_rx: crossbeam_channel::Receiver<()>) -> Self {
        NullBackend { quit_rx }
    }
}

#[cfg(not(target_os = "windows"))]
impl HotkeyBackend for NullBackend {
    fn register(&mut self) -> Result<()> {
        tracing::warn!("Global hotkeys require Windows; the paste combination is inactive");
        Ok(())
    }

    fn unregister(&mut self) -> Result<()> {
        Ok(())
    }

    fn key_down(&self, _key: u32) -> bool {
        false
    }

    fn wait_message(&mut self) -> PumpEvent {
        // Either an explicit quit or the sender going away ends the pump.
        let _ = self.quit_rx.recv();
        PumpEvent::Quit
    }

    fn send_combination(&mut self) {
        tracing::debug!("Keystroke synthesis skipped off Windows");
    }
}

#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::error::ClipKeepError;

    /// What a backend was asked to do, in order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum BackendEvent {
        Register,
        Unregister,
        Send,
    }

    /// Scripted backend for session and listener tests.
    ///
    /// Both chord keys read as held from construction until `held_for`
    /// elapses; `wait_message` serves `pump` and quits once it runs dry.
    pub struct FakeBackend {
        started: Instant,
        pub held_for: Duration,
        pub pump: VecDeque<PumpEvent>,
        pub events: Vec<BackendEvent>,
        pub fail_register: bool,
    }

    impl FakeBackend {
        pub fn new(held_for: Duration) -> Self {
            FakeBackend {
                started: Instant::now(),
                held_for,
                pump: VecDeque::new(),
                events: Vec::new(),
                fail_register: false,
            }
        }

        pub fn send_count(&self) -> usize {
            self.events
                .iter()
                .filter(|event| **event == BackendEvent::Send)
                .count()
        }
    }

    impl HotkeyBackend for FakeBackend {
        fn register(&mut self) -> Result<()> {
            if self.fail_register {
                // 1409: ERROR_HOTKEY_ALREADY_REGISTERED
                return Err(ClipKeepError::HotkeyRegistration {
                    chord: CHORD_NAME.to_string(),
                    code: 1409,
                });
            }
            self.events.push(BackendEvent::Register);
            Ok(())
        }

        fn unregister(&mut self) -> Result<()> {
            self.events.push(BackendEvent::Unregister);
            Ok(())
        }

        fn key_down(&self, _key: u32) -> bool {
            self.started.elapsed() < self.held_for
        }

        fn wait_message(&mut self) -> PumpEvent {
            self.pump.pop_front().unwrap_or(PumpEvent::Quit)
        }

        fn send_combination(&mut self) {
            self.events.push(BackendEvent::Send);
        }
    }
}
