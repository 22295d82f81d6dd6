//! Clipboard change-detection monitor
//!
//! Polls the clipboard on a fixed interval and appends each distinguishable
//! external change to the history. Writes made by this program carry the
//! internal marker and only move the comparison baseline; they are never
//! recorded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use tracing::{debug, error, info, warn};

use super::snapshot::{Clipboard, Snapshot};
use crate::config::Settings;
use crate::history::HistoryStore;

/// Cadence of the persist re-read loop while the clipboard settles.
const PERSIST_RETRY: Duration = Duration::from_millis(10);

/// Budget for the persist re-read loop before treating the change as a
/// duplicate of the stored tail.
const PERSIST_BUDGET: Duration = Duration::from_millis(1_000);

/// How often the sleep between ticks rechecks the stop flag.
const STOP_CHECK: Duration = Duration::from_millis(100);

/// Spawn the monitor on its own thread.
///
/// The thread exits once `stop` is set; the caller joins it on shutdown.
/// Settings updates arriving on `settings_rx` take effect on the next tick.
pub fn start_monitor<C, S>(
    clipboard: C,
    store: S,
    settings: &Settings,
    settings_rx: Receiver<Settings>,
    stop: Arc<AtomicBool>,
) -> JoinHandle<()>
where
    C: Clipboard + 'static,
    S: HistoryStore + Send + 'static,
{
    let poll_interval = settings.poll_interval();
    thread::spawn(move || run(clipboard, store, poll_interval, settings_rx, stop))
}

fn run<C, S>(
    mut clipboard: C,
    store: S,
    mut poll_interval: Duration,
    settings_rx: Receiver<Settings>,
    stop: Arc<AtomicBool>,
) where
    C: Clipboard,
    S: HistoryStore,
{
    info!(
        poll_interval_ms = poll_interval.as_millis() as u64,
        "Clipboard monitor started"
    );

    let mut last: Option<Snapshot> = None;
    while !stop.load(Ordering::Relaxed) {
        while let Ok(updated) = settings_rx.try_recv() {
            let interval = updated.poll_interval();
            if interval != poll_interval {
                info!(
                    poll_interval_ms = interval.as_millis() as u64,
                    "Monitor poll interval updated"
                );
                poll_interval = interval;
            }
        }

        check_clipboard(&mut clipboard, &store, &mut last);

        sleep_until(Instant::now() + poll_interval, &stop);
    }

    info!("Clipboard monitor stopping");
}

/// Sleep in short slices so a stop request is noticed promptly.
fn sleep_until(deadline: Instant, stop: &AtomicBool) {
    while !stop.load(Ordering::Relaxed) {
        match deadline.checked_duration_since(Instant::now()) {
            Some(remaining) => thread::sleep(remaining.min(STOP_CHECK)),
            None => break,
        }
    }
}

/// One poll tick: read, compare against the baseline, maybe persist.
pub(crate) fn check_clipboard<C, S>(clipboard: &mut C, store: &S, last: &mut Option<Snapshot>)
where
    C: Clipboard,
    S: HistoryStore,
{
    let observation = clipboard.observe();

    if observation.snapshot.is_none() {
        // Unreadable or empty clipboard; the old baseline stands.
        return;
    }
    if last.as_ref() == Some(&observation.snapshot) {
        return;
    }
    if observation.internal {
        // Our own paste-dispatch write. It becomes the baseline so the
        // same content does not re-trigger, but it is not history.
        debug!(kind = ?observation.snapshot.kind, "Skipping internal clipboard write");
        *last = Some(observation.snapshot);
        return;
    }

    if let Some(settled) = persist_distinct(
        observation.snapshot,
        clipboard,
        store,
        PERSIST_BUDGET,
        PERSIST_RETRY,
    ) {
        *last = Some(settled);
    }
}

/// Record a changed snapshot once it is distinguishable from the stored
/// tail, re-reading the clipboard while the write propagates.
///
/// Returns the snapshot to adopt as the new baseline, or `None` when the
/// append failed and the old baseline should stand so the next tick
/// retries.
fn persist_distinct<C, S>(
    snapshot: Snapshot,
    clipboard: &mut C,
    store: &S,
    budget: Duration,
    cadence: Duration,
) -> Option<Snapshot>
where
    C: Clipboard,
    S: HistoryStore,
{
    let deadline = Instant::now() + budget;
    let mut current = snapshot;

    loop {
        match store.last() {
            Ok(tail) => {
                if tail.as_ref() != Some(&current) {
                    return match store.append(&current) {
                        Ok(()) => {
                            info!(kind = ?current.kind, "Recorded clipboard entry");
                            Some(current)
                        }
                        Err(e) => {
                            error!(error = %e, "Failed to append history entry");
                            None
                        }
                    };
                }
            }
            Err(e) => warn!(error = %e, "Could not read history tail"),
        }

        if Instant::now() >= deadline {
            warn!(kind = ?current.kind, "Clipboard content matches stored tail; not recording");
            return Some(current);
        }
        thread::sleep(cadence);

        let fresh = clipboard.observe();
        if fresh.internal {
            // A paste dispatch overwrote the clipboard mid-settle; adopt
            // it as the baseline without recording.
            debug!(kind = ?fresh.snapshot.kind, "Internal write during persist window");
            return Some(fresh.snapshot);
        }
        if !fresh.snapshot.is_none() {
            current = fresh.snapshot;
        }
    }
}
