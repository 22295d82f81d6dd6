//! Picker presentation seam
//!
//! The history popup is an external collaborator: the listener hands it
//! the recent entries when a hold begins and asks for the chosen one on
//! release. The shipped presenter is headless; it logs the entries a popup
//! would show and treats the newest one as the selection.

use tracing::info;

use crate::clipboard::Snapshot;

/// Presentation surface for the history popup.
pub trait PickerPresenter: Send {
    /// Present the given entries, newest first.
    fn show(&mut self, entries: Vec<Snapshot>);

    /// Take the picker down and report the chosen entry, if any.
    fn hide(&mut self) -> Option<Snapshot>;
}

/// Headless presenter backed by the log.
#[derive(Default)]
pub struct LoggingPresenter {
    current: Vec<Snapshot>,
}

impl LoggingPresenter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PickerPresenter for LoggingPresenter {
    fn show(&mut self, entries: Vec<Snapshot>) {
        if entries.is_empty() {
            info!("History is empty");
        }
        for (index, entry) in entries.iter().enumerate() {
            info!(index, preview = %entry.preview(), "History entry");
        }
        self.current = entries;
    }

    fn hide(&mut self) -> Option<Snapshot> {
        std::mem::take(&mut self.current).into_iter().next()
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Records what it was shown and returns a preset selection.
    #[derive(Default)]
    pub struct RecordingPresenter {
        pub shown: Vec<Vec<Snapshot>>,
        pub selection: Option<Snapshot>,
        pub hides: usize,
    }

    impl RecordingPresenter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_selection(selection: Snapshot) -> Self {
            RecordingPresenter {
                selection: Some(selection),
                ..Default::default()
            }
        }
    }

    impl PickerPresenter for RecordingPresenter {
        fn show(&mut self, entries: Vec<Snapshot>) {
            self.shown.push(entries);
        }

        fn hide(&mut self) -> Option<Snapshot> {
            self.hides += 1;
            self.selection.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_presenter_selects_the_newest_entry() {
        let mut presenter = LoggingPresenter::new();
        presenter.show(vec![Snapshot::unicode("newest"), Snapshot::unicode("older")]);

        assert_eq!(presenter.hide(), Some(Snapshot::unicode("newest")));
        // A second hide without a show has nothing to select.
        assert_eq!(presenter.hide(), None);
    }

    #[test]
    fn test_logging_presenter_with_empty_history_selects_nothing() {
        let mut presenter = LoggingPresenter::new();
        presenter.show(Vec::new());
        assert_eq!(presenter.hide(), None);
    }
}
