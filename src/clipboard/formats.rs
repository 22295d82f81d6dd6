//! Clipboard format classification
//!
//! Maps the set of format ids the clipboard advertises to a semantic
//! `ContentKind`, without reading any payload. Pure functions over the
//! enumerated id set so the policy is testable off-platform.

use super::snapshot::ContentKind;

/// Standard clipboard format identifiers (fixed by the OS).
pub const CF_TEXT: u32 = 1;
pub const CF_UNICODETEXT: u32 = 13;
pub const CF_HDROP: u32 = 15;

/// Name of the registered HTML clipboard format.
pub const HTML_FORMAT_NAME: &str = "HTML Format";

/// Name of the private format marking writes made by this program.
pub const MARKER_FORMAT_NAME: &str = "ClipKeepInternalWrite";

/// Registered format ids, resolved once at startup.
///
/// A zero id means the registration failed (or never ran, off-platform);
/// zero never matches because format enumeration cannot yield it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatTable {
    pub html: u32,
    pub marker: u32,
}

impl FormatTable {
    pub fn new(html: u32, marker: u32) -> Self {
        FormatTable { html, marker }
    }
}

/// Result of classifying an advertised format set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: ContentKind,
    /// The HTML format was advertised (auxiliary to any kind).
    pub has_html: bool,
    /// The internal-write marker was advertised.
    pub internal: bool,
}

/// Decide the content kind for a set of advertised format ids.
///
/// Policy: a file list overrides text; unicode text is preferred over ANSI
/// text; HTML becomes the primary kind only when nothing else matched. The
/// marker format never influences the kind. Unrecognized ids (including
/// every image format) are ignored.
pub fn classify(formats: &[u32], table: &FormatTable) -> Classification {
    let has_files = formats.contains(&CF_HDROP);
    let has_unicode = formats.contains(&CF_UNICODETEXT);
    let has_text = formats.contains(&CF_TEXT);
    let has_html = table.html != 0 && formats.contains(&table.html);
    let internal = table.marker != 0 && formats.contains(&table.marker);

    let kind = if has_files {
        ContentKind::FileList
    } else if has_unicode {
        ContentKind::UnicodeText
    } else if has_text {
        ContentKind::Text
    } else if has_html {
        ContentKind::Html
    } else {
        ContentKind::None
    };

    Classification {
        kind,
        has_html,
        internal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Plausible registered ids; real ones land in 0xC000..0xFFFF
    const TABLE: FormatTable = FormatTable {
        html: 0xC123,
        marker: 0xC456,
    };

    #[test]
    fn test_classify_is_deterministic() {
        let formats = [CF_TEXT, CF_UNICODETEXT, TABLE.html];
        assert_eq!(classify(&formats, &TABLE), classify(&formats, &TABLE));
    }

    #[test]
    fn test_empty_and_unknown_sets_classify_as_none() {
        let result = classify(&[], &TABLE);
        assert_eq!(result.kind, ContentKind::None);
        assert!(!result.has_html);
        assert!(!result.internal);

        let unknown = classify(&[2, 8, 17, 0x00FF], &TABLE);
        assert_eq!(unknown.kind, ContentKind::None);
    }

    #[test]
    fn test_unicode_preferred_over_ansi_text() {
        assert_eq!(classify(&[CF_TEXT], &TABLE).kind, ContentKind::Text);
        assert_eq!(
            classify(&[CF_UNICODETEXT], &TABLE).kind,
            ContentKind::UnicodeText
        );
        assert_eq!(
            classify(&[CF_TEXT, CF_UNICODETEXT], &TABLE).kind,
            ContentKind::UnicodeText
        );
    }

    #[test]
    fn test_file_list_overrides_text() {
        let result = classify(&[CF_UNICODETEXT, CF_TEXT, CF_HDROP], &TABLE);
        assert_eq!(result.kind, ContentKind::FileList);
    }

    #[test]
    fn test_html_is_auxiliary_beside_text() {
        let result = classify(&[CF_UNICODETEXT, TABLE.html], &TABLE);
        assert_eq!(result.kind, ContentKind::UnicodeText);
        assert!(result.has_html);
    }

    #[test]
    fn test_html_alone_is_primary() {
        let result = classify(&[TABLE.html], &TABLE);
        assert_eq!(result.kind, ContentKind::Html);
        assert!(result.has_html);
    }

    #[test]
    fn test_marker_sets_internal_without_touching_kind() {
        let with_marker = classify(&[CF_UNICODETEXT, TABLE.marker], &TABLE);
        assert_eq!(with_marker.kind, ContentKind::UnicodeText);
        assert!(with_marker.internal);

        let marker_only = classify(&[TABLE.marker], &TABLE);
        assert_eq!(marker_only.kind, ContentKind::None);
        assert!(marker_only.internal);
    }

    #[test]
    fn test_unregistered_table_ids_never_match() {
        let table = FormatTable::new(0, 0);
        let result = classify(&[CF_UNICODETEXT], &table);
        assert_eq!(result.kind, ContentKind::UnicodeText);
        assert!(!result.has_html);
        assert!(!result.internal);
    }

    #[test]
    fn test_bitmap_formats_are_not_recognized() {
        // CF_BITMAP = 2, CF_DIB = 8, CF_DIBV5 = 17: image capture is not
        // supported, so these never produce a kind on their own.
        let result = classify(&[2, 8, 17], &TABLE);
        assert_eq!(result.kind, ContentKind::None);

        let with_text = classify(&[2, 8, 17, CF_UNICODETEXT], &TABLE);
        assert_eq!(with_text.kind, ContentKind::UnicodeText);
    }
}
