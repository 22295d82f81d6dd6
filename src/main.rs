//! ClipKeep entry point
//!
//! Wires the pieces together: logging, settings, storage, the clipboard
//! monitor on a worker thread and the hotkey listener on the main thread.
//! The listener has to own the main thread because hotkey registration
//! binds to the thread that pumps messages.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use clipkeep::clipboard::{start_monitor, SystemClipboard};
use clipkeep::config;
use clipkeep::error::ResultExt;
use clipkeep::history::{default_db_path, SqliteHistory};
use clipkeep::hotkey;
use clipkeep::logging;
use clipkeep::picker::LoggingPresenter;
use clipkeep::watcher::SettingsWatcher;

/// Clipboard history keeper: records what you copy and pastes any of it
/// back with a held paste combination.
#[derive(Parser, Debug)]
#[command(name = "clipkeep", version, about)]
struct Cli {
    /// Path to the JSON settings file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Path to the history database
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset (e.g. "debug" or "clipkeep=trace")
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _logging_guard = logging::init(cli.log_level.as_deref());

    let config_path = cli.config.unwrap_or_else(config::default_config_path);
    let settings = config::load_or_create(&config_path);

    // Storage must be reachable before anything starts; without it there is
    // no history to keep.
    let db_path = cli.db.unwrap_or_else(default_db_path);
    let store = SqliteHistory::open(&db_path)
        .with_context(|| format!("opening history database at {}", db_path.display()))?;

    let stop = Arc::new(AtomicBool::new(false));
    let mut settings_watcher = SettingsWatcher::new(config_path.clone());
    let monitor_rx = settings_watcher.subscribe();
    let listener_rx = settings_watcher.subscribe();
    settings_watcher.start().warn_on_err();

    let monitor = start_monitor(
        SystemClipboard::new(),
        store.clone(),
        &settings,
        monitor_rx,
        stop.clone(),
    );

    // Ctrl+C flags the monitor down and interrupts the listener's message
    // wait so both sides wind down together.
    #[cfg(target_os = "windows")]
    let mut backend = {
        let listener_thread = hotkey::current_thread_id();
        let stop_flag = stop.clone();
        ctrlc::set_handler(move || {
            stop_flag.store(true, Ordering::Relaxed);
            hotkey::post_quit(listener_thread);
        })
        .context("installing the shutdown handler")?;
        hotkey::Win32Backend::new()
    };

    #[cfg(not(target_os = "windows"))]
    let mut backend = {
        let (quit_tx, quit_rx) = crossbeam_channel::bounded(1);
        let stop_flag = stop.clone();
        ctrlc::set_handler(move || {
            stop_flag.store(true, Ordering::Relaxed);
            let _ = quit_tx.try_send(());
        })
        .context("installing the shutdown handler")?;
        hotkey::NullBackend::new(quit_rx)
    };

    let mut clipboard = SystemClipboard::new();
    let mut presenter = LoggingPresenter::new();
    hotkey::run_listener(
        &mut backend,
        &mut clipboard,
        store,
        &mut presenter,
        &settings,
        listener_rx,
    );

    info!("Shutting down");
    stop.store(true, Ordering::Relaxed);
    if monitor.join().is_err() {
        warn!("Clipboard monitor exited abnormally");
    }
    Ok(())
}
