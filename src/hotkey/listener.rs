//! Hotkey listener loop
//!
//! Owns the hotkey registration and the native message pump. Each trigger
//! becomes a hold/tap session: a hold shows the picker and pastes the
//! selection on release, a tap replays the native combination unchanged.

use std::time::Duration;

use crossbeam_channel::Receiver;
use tracing::{debug, error, info};

use super::backend::{HotkeyBackend, PumpEvent, CHORD_NAME};
use super::session::{resolve_hold, HoldOutcome, HoldPhase};
use crate::clipboard::{Clipboard, Snapshot};
use crate::config::Settings;
use crate::error::{Result, ResultExt};
use crate::focus::ForegroundWindow;
use crate::history::HistoryStore;
use crate::paste;
use crate::picker::PickerPresenter;

/// Run the listener until a quit message arrives.
///
/// Registration failure is fatal to this worker alone: it is reported
/// loudly and the function returns without pumping messages, leaving the
/// rest of the program degraded but alive.
pub fn run_listener<B, C, S, P>(
    backend: &mut B,
    clipboard: &mut C,
    store: S,
    presenter: &mut P,
    settings: &Settings,
    settings_rx: Receiver<Settings>,
) where
    B: HotkeyBackend,
    C: Clipboard,
    S: HistoryStore,
    P: PickerPresenter,
{
    if let Err(e) = backend.register() {
        error!(error = %e, "{}", e.user_message());
        return;
    }

    let mut hold_threshold = settings.hold_threshold();
    let mut display_length = settings.history_length;
    info!(
        chord = CHORD_NAME,
        hold_threshold_ms = hold_threshold.as_millis() as u64,
        "Hotkey listener armed"
    );

    loop {
        match backend.wait_message() {
            PumpEvent::Quit => break,
            PumpEvent::Other => continue,
            PumpEvent::Hotkey => {}
        }

        while let Ok(updated) = settings_rx.try_recv() {
            hold_threshold = updated.hold_threshold();
            display_length = updated.history_length;
        }

        if let Err(e) = handle_trigger(
            backend,
            clipboard,
            &store,
            presenter,
            hold_threshold,
            display_length,
        ) {
            error!(error = %e, "{}", e.user_message());
            break;
        }
    }

    backend.unregister().log_err();
    info!("Hotkey listener stopped");
}

/// Resolve one trigger. The only error out of here is a failed
/// re-registration, which would leave the worker deaf; the caller exits on
/// it.
fn handle_trigger<B, C, S, P>(
    backend: &mut B,
    clipboard: &mut C,
    store: &S,
    presenter: &mut P,
    hold_threshold: Duration,
    display_length: usize,
) -> Result<()>
where
    B: HotkeyBackend,
    C: Clipboard,
    S: HistoryStore,
    P: PickerPresenter,
{
    let focus = ForegroundWindow::capture();
    if let Some(window) = &focus {
        debug!(window = %window.title(), "Hotkey session started");
    }

    let mut selection: Option<Snapshot> = None;
    let outcome = resolve_hold(backend, hold_threshold, |phase| match phase {
        HoldPhase::Press => {
            let entries = match store.read_all() {
                Ok(all) => recent_first(all, display_length),
                Err(e) => {
                    error!(error = %e, "Could not read history for the picker");
                    Vec::new()
                }
            };
            presenter.show(entries);
        }
        HoldPhase::Release => selection = presenter.hide(),
    });

    match outcome {
        HoldOutcome::Held => {
            if let Some(entry) = selection {
                // Dropping the registration lets the synthesized paste
                // through instead of trapping it as a new trigger.
                backend.unregister().log_err();
                if let Err(e) = paste::dispatch(&entry, clipboard, backend, focus.as_ref()) {
                    error!(error = %e, "Paste dispatch failed");
                }
                backend.register()?;
            }
        }
        HoldOutcome::Tapped => {
            backend.unregister().log_err();
            if let Some(window) = &focus {
                window.restore();
            }
            backend.send_combination();
            backend.register()?;
            debug!("Replayed the native combination for a tap");
        }
        HoldOutcome::Aborted => debug!("Ignored ghost hotkey trigger"),
    }
    Ok(())
}

/// Newest first, capped to the configured display length.
fn recent_first(mut entries: Vec<Snapshot>, display_length: usize) -> Vec<Snapshot> {
    entries.reverse();
    entries.truncate(display_length);
    entries
}
