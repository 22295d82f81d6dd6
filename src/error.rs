use thiserror::Error;
use tracing::{error, warn};

/// Error severity for diagnostics
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,     // informational
    Warning,  // recoverable
    Error,    // operation failed, worker may exit
    Critical, // unrecoverable, process should exit
}

/// Domain-specific errors for ClipKeep
#[derive(Error, Debug)]
pub enum ClipKeepError {
    #[error("Clipboard operation failed: {0}")]
    Clipboard(String),

    #[error("History storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Failed to register hotkey {chord} (os error {code})")]
    HotkeyRegistration { chord: String, code: u32 },

    #[error("Hotkey operation failed: {0}")]
    Hotkey(String),

    #[error("Failed to serialize entry payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Config file error for '{path}': {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[allow(dead_code)]
impl ClipKeepError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Clipboard(_) => ErrorSeverity::Warning,
            Self::Storage(_) => ErrorSeverity::Critical,
            Self::HotkeyRegistration { .. } => ErrorSeverity::Error,
            Self::Hotkey(_) => ErrorSeverity::Warning,
            Self::Serialize(_) => ErrorSeverity::Warning,
            Self::ConfigIo { .. } => ErrorSeverity::Warning,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Clipboard(msg) => format!("Clipboard unavailable: {}", msg),
            Self::Storage(e) => format!("History database unavailable: {}", e),
            Self::HotkeyRegistration { chord, .. } => format!(
                "Could not claim {}. Another application (a clipboard manager?) \
                 likely registered the same combination; close it and restart.",
                chord
            ),
            Self::Hotkey(msg) => format!("Hotkey problem: {}", msg),
            Self::Serialize(e) => format!("Invalid entry payload: {}", e),
            Self::ConfigIo { path, .. } => format!("Could not access config at {}", path),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClipKeepError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the user doesn't need to know.
///
/// Includes file/line information via `#[track_caller]` so the log line
/// points at the call site rather than at this module.
///
/// # Examples
///
/// ```ignore
/// use clipkeep::error::ResultExt;
///
/// // Silently log and continue if the focus restore fails
/// restore_focus(&win).log_err();
///
/// // Log as warning for expected failures
/// let settings = read_settings().warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}
