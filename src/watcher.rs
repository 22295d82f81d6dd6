//! Config file watching
//!
//! Watches the settings file for edits and pushes freshly loaded `Settings`
//! to every subscribed worker, so preference changes apply without a restart.

use notify::{recommended_watcher, RecursiveMode, Result as NotifyResult, Watcher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::config::{load_settings, Settings};

/// Debounce window for editor save bursts (many editors write twice).
const DEBOUNCE_MS: u64 = 500;

/// Watches the config file for changes and fans out reloaded settings.
pub struct SettingsWatcher {
    config_path: PathBuf,
    subscribers: Vec<Sender<Settings>>,
    stop: Arc<AtomicBool>,
    watcher_thread: Option<thread::JoinHandle<()>>,
}

impl SettingsWatcher {
    /// Create a new SettingsWatcher for the given config file.
    pub fn new(config_path: PathBuf) -> Self {
        SettingsWatcher {
            config_path,
            subscribers: Vec::new(),
            stop: Arc::new(AtomicBool::new(false)),
            watcher_thread: None,
        }
    }

    /// Register a worker for settings updates.
    ///
    /// Must be called before `start`; receivers subscribed afterwards would
    /// never see an update. Workers drain the receiver with `try_recv` at
    /// their loop boundaries.
    pub fn subscribe(&mut self) -> Receiver<Settings> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Start watching the config file for changes.
    ///
    /// Spawns a background thread that watches the file's parent directory
    /// and reloads + fans out settings when the file is created or modified.
    pub fn start(&mut self) -> NotifyResult<()> {
        let subscribers = std::mem::take(&mut self.subscribers);
        let config_path = self.config_path.clone();
        let stop = self.stop.clone();

        let thread_handle = thread::spawn(move || {
            if let Err(e) = Self::watch_loop(config_path, subscribers, stop) {
                warn!(error = %e, watcher = "settings", "Settings watcher error");
            }
        });

        self.watcher_thread = Some(thread_handle);
        Ok(())
    }

    /// Internal watch loop running in background thread
    fn watch_loop(
        config_path: PathBuf,
        subscribers: Vec<Sender<Settings>>,
        stop: Arc<AtomicBool>,
    ) -> NotifyResult<()> {
        // Watch the parent directory; the file itself may not exist yet
        let watch_path = config_path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = config_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("config.json")
            .to_string();

        let debounce_active = Arc::new(Mutex::new(false));

        // Channel for the file watcher callback
        let (watch_tx, watch_rx) = channel();

        let mut watcher: Box<dyn Watcher> = Box::new(recommended_watcher(
            move |res: notify::Result<notify::Event>| {
                let _ = watch_tx.send(res);
            },
        )?);

        watcher.watch(watch_path, RecursiveMode::NonRecursive)?;

        info!(
            path = %watch_path.display(),
            target = %file_name,
            "Settings watcher started"
        );

        // Main watch loop; the timeout bounds how long Drop waits for us
        loop {
            if stop.load(Ordering::Relaxed) {
                info!(watcher = "settings", "Settings watcher shutting down");
                break;
            }

            match watch_rx.recv_timeout(Duration::from_millis(DEBOUNCE_MS)) {
                Ok(Ok(event)) => {
                    if !event_touches_file(&event, &file_name) {
                        continue;
                    }

                    // Check if debounce is already active
                    let mut debounce = debounce_active.lock();
                    if !*debounce {
                        *debounce = true;
                        drop(debounce); // Release lock before spawning thread

                        let config_path = config_path.clone();
                        let subscribers = subscribers.clone();
                        let debounce_flag = debounce_active.clone();

                        // Spawn debounce thread
                        thread::spawn(move || {
                            thread::sleep(Duration::from_millis(DEBOUNCE_MS));
                            let settings = load_settings(&config_path);
                            info!(
                                path = %config_path.display(),
                                "Config file changed, pushing settings to workers"
                            );
                            for tx in &subscribers {
                                let _ = tx.send(settings.clone());
                            }
                            *debounce_flag.lock() = false;
                        });
                    }
                }
                Ok(Err(e)) => {
                    warn!(error = %e, watcher = "settings", "File watcher error");
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    info!(watcher = "settings", "Settings watcher channel closed");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// True when the event names our config file and is a create or modify.
fn event_touches_file(event: &notify::Event, file_name: &str) -> bool {
    let is_relevant_kind = matches!(
        event.kind,
        notify::EventKind::Create(_) | notify::EventKind::Modify(_)
    );
    if !is_relevant_kind {
        return false;
    }

    event.paths.iter().any(|path: &PathBuf| {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| name == file_name)
            .unwrap_or(false)
    })
}

impl Drop for SettingsWatcher {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.watcher_thread.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_watcher_creation() {
        let _watcher = SettingsWatcher::new(PathBuf::from("/tmp/config.json"));
        // Watcher should be created without panicking
    }

    #[test]
    fn test_subscribe_before_start_returns_receiver() {
        let mut watcher = SettingsWatcher::new(PathBuf::from("/tmp/config.json"));
        let rx = watcher.subscribe();
        assert!(rx.try_recv().is_err(), "no update should be pending yet");
    }

    #[test]
    fn test_event_touches_file_matches_create_and_modify() {
        use notify::event::{CreateKind, ModifyKind};

        let path = PathBuf::from("/home/user/.config/clipkeep/config.json");

        let create_event = notify::Event {
            kind: notify::EventKind::Create(CreateKind::File),
            paths: vec![path.clone()],
            attrs: Default::default(),
        };
        assert!(event_touches_file(&create_event, "config.json"));

        let modify_event = notify::Event {
            kind: notify::EventKind::Modify(ModifyKind::Data(notify::event::DataChange::Content)),
            paths: vec![path.clone()],
            attrs: Default::default(),
        };
        assert!(event_touches_file(&modify_event, "config.json"));
    }

    #[test]
    fn test_event_touches_file_ignores_other_files_and_kinds() {
        use notify::event::{CreateKind, RemoveKind};

        let other = notify::Event {
            kind: notify::EventKind::Create(CreateKind::File),
            paths: vec![PathBuf::from("/home/user/.config/clipkeep/notes.txt")],
            attrs: Default::default(),
        };
        assert!(!event_touches_file(&other, "config.json"));

        let removed = notify::Event {
            kind: notify::EventKind::Remove(RemoveKind::File),
            paths: vec![PathBuf::from("/home/user/.config/clipkeep/config.json")],
            attrs: Default::default(),
        };
        assert!(!event_touches_file(&removed, "config.json"));
    }
}
