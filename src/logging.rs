//! Structured JSONL logging to file plus human-readable stderr output.
//!
//! Dual-output logging:
//! - **JSONL to file** (platform data dir, `clipkeep/logs/clipkeep.jsonl`) - structured, greppable
//! - **Compact to stderr** - human-readable while running in a terminal
//!
//! # Usage
//!
//! ```rust,ignore
//! use clipkeep::logging;
//!
//! // Initialize logging - MUST keep guard alive for duration of program
//! let _guard = logging::init(None);
//!
//! tracing::info!(event_type = "app_start", "Application started");
//! ```

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize the dual-output logging system.
///
/// `filter_override` replaces the default `info` fallback when `RUST_LOG`
/// is not set (RUST_LOG always wins when present).
///
/// Returns a guard that MUST be kept alive for the duration of the program.
/// Dropping the guard will flush remaining logs and close the file.
pub fn init(filter_override: Option<&str>) -> LoggingGuard {
    let log_dir = get_log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }

    let log_path = log_dir.join("clipkeep.jsonl");

    // Print log location for discoverability
    eprintln!("========================================");
    eprintln!("[CLIPKEEP] JSONL log: {}", log_path.display());
    eprintln!("[CLIPKEEP] Compact logs: stderr");
    eprintln!("========================================");

    // Open log file with append mode; fall back to a sink writer so a
    // read-only disk never takes the whole program down.
    let (non_blocking_file, file_guard) = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => tracing_appender::non_blocking(file),
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            tracing_appender::non_blocking(std::io::sink())
        }
    };

    // Environment filter - RUST_LOG wins, then the CLI override, then info
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_override.unwrap_or("info")));

    // JSONL layer for file output
    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    // Compact layer for stderr
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(stderr_layer)
        .init();

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %log_path.display(),
        "Logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// Get the log directory path (platform data dir + clipkeep/logs/)
fn get_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("clipkeep").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("clipkeep-logs"))
}

/// Get the path to the JSONL log file
pub fn log_path() -> PathBuf {
    get_log_dir().join("clipkeep.jsonl")
}
