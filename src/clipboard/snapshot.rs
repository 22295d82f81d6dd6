//! Snapshot types and the clipboard seam
//!
//! A `Snapshot` is an owned, immutable capture of clipboard content at one
//! instant. Equality is structural and is what the monitor uses to decide
//! whether the clipboard actually changed.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Semantic kind of a clipboard snapshot.
///
/// `Html` is only the primary kind when no text or file format accompanies
/// the HTML fragment; otherwise HTML rides along in `Snapshot::html`.
/// There is no image kind: image formats are not captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    None,
    Text,
    UnicodeText,
    FileList,
    Html,
}

impl ContentKind {
    /// Stable lowercase name, used as the storage column value.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::None => "none",
            ContentKind::Text => "text",
            ContentKind::UnicodeText => "unicode_text",
            ContentKind::FileList => "file_list",
            ContentKind::Html => "html",
        }
    }

    /// Parse a stored kind name; unknown names map to `None`.
    pub fn from_str_or_none(s: &str) -> ContentKind {
        match s {
            "text" => ContentKind::Text,
            "unicode_text" => ContentKind::UnicodeText,
            "file_list" => ContentKind::FileList,
            "html" => ContentKind::Html,
            _ => ContentKind::None,
        }
    }
}

/// What the clipboard held at one instant.
///
/// Only the field named by `kind` is guaranteed to be populated; `html` may
/// additionally be present for any kind, since HTML is advertised alongside
/// other formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub kind: ContentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unicode_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_list: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl Snapshot {
    /// Snapshot representing "nothing readable".
    pub fn none() -> Self {
        Snapshot {
            kind: ContentKind::None,
            text: None,
            unicode_text: None,
            file_list: None,
            html: None,
        }
    }

    /// Unicode text snapshot.
    pub fn unicode(text: impl Into<String>) -> Self {
        Snapshot {
            kind: ContentKind::UnicodeText,
            unicode_text: Some(text.into()),
            ..Snapshot::none()
        }
    }

    /// ANSI text snapshot.
    pub fn ansi(text: impl Into<String>) -> Self {
        Snapshot {
            kind: ContentKind::Text,
            text: Some(text.into()),
            ..Snapshot::none()
        }
    }

    /// File list snapshot.
    pub fn files<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Snapshot {
            kind: ContentKind::FileList,
            file_list: Some(paths.into_iter().map(Into::into).collect()),
            ..Snapshot::none()
        }
    }

    /// Snapshot whose only content is an HTML fragment.
    pub fn html_fragment(html: impl Into<String>) -> Self {
        Snapshot {
            kind: ContentKind::Html,
            html: Some(html.into()),
            ..Snapshot::none()
        }
    }

    /// Attach an HTML fragment to an existing snapshot.
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// True when nothing readable was captured.
    pub fn is_none(&self) -> bool {
        self.kind == ContentKind::None
    }

    /// Short single-line description for logs and the headless picker.
    pub fn preview(&self) -> String {
        const MAX_CHARS: usize = 80;

        let text = match self.kind {
            ContentKind::None => return "(empty)".to_string(),
            ContentKind::Text => self.text.as_deref().unwrap_or(""),
            ContentKind::UnicodeText => self.unicode_text.as_deref().unwrap_or(""),
            ContentKind::Html => self.html.as_deref().unwrap_or(""),
            ContentKind::FileList => {
                return match &self.file_list {
                    Some(paths) if !paths.is_empty() => {
                        format!("{} file(s): {}", paths.len(), paths[0])
                    }
                    _ => "(empty file list)".to_string(),
                }
            }
        };

        let mut preview: String = text
            .chars()
            .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
            .take(MAX_CHARS + 1)
            .collect();
        if preview.chars().count() > MAX_CHARS {
            let cut = preview
                .char_indices()
                .nth(MAX_CHARS)
                .map(|(i, _)| i)
                .unwrap_or(preview.len());
            preview.truncate(cut);
            preview.push('…');
        }
        preview
    }
}

/// A snapshot plus whether the write came from this program.
///
/// The marker is a fact about the clipboard state, not about the content,
/// so it lives next to the snapshot rather than inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub snapshot: Snapshot,
    pub internal: bool,
}

impl Observation {
    /// An observation of content written by some other program.
    pub fn external(snapshot: Snapshot) -> Self {
        Observation {
            snapshot,
            internal: false,
        }
    }

    /// An observation carrying this program's internal-write marker.
    pub fn internal(snapshot: Snapshot) -> Self {
        Observation {
            snapshot,
            internal: true,
        }
    }
}

/// OS clipboard seam.
///
/// The production implementation talks to Win32; tests drive the monitor and
/// dispatcher with a scripted fake.
pub trait Clipboard: Send {
    /// Read the current clipboard contents.
    ///
    /// Contention and read failures surface as a `None`-kind snapshot, never
    /// as an error; the monitor loop must not care.
    fn observe(&mut self) -> Observation;

    /// Write a snapshot's payload back, marked as an internal write.
    fn write(&mut self, snapshot: &Snapshot) -> Result<()>;
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::error::ClipKeepError;
    use std::collections::VecDeque;

    /// Scripted clipboard for monitor and dispatch tests.
    ///
    /// `observe` drains `queue` first and then keeps returning `current`;
    /// `write` records the snapshot and makes it the current content with
    /// the internal flag set, like the real clipboard would.
    pub struct FakeClipboard {
        pub queue: VecDeque<Observation>,
        pub current: Observation,
        pub writes: Vec<Snapshot>,
        pub fail_writes: bool,
    }

    impl FakeClipboard {
        pub fn new() -> Self {
            FakeClipboard {
                queue: VecDeque::new(),
                current: Observation::external(Snapshot::none()),
                writes: Vec::new(),
                fail_writes: false,
            }
        }

        /// Replace the steady-state content.
        pub fn set(&mut self, observation: Observation) {
            self.current = observation;
        }

        /// Enqueue a one-shot observation served before `current`.
        pub fn push(&mut self, observation: Observation) {
            self.queue.push_back(observation);
        }
    }

    impl Clipboard for FakeClipboard {
        fn observe(&mut self) -> Observation {
            self.queue
                .pop_front()
                .unwrap_or_else(|| self.current.clone())
        }

        fn write(&mut self, snapshot: &Snapshot) -> Result<()> {
            if self.fail_writes {
                return Err(ClipKeepError::Clipboard("fake write failure".into()));
            }
            self.writes.push(snapshot.clone());
            self.current = Observation::internal(snapshot.clone());
            Ok(())
        }
    }
}
