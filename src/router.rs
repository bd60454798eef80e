//! Extension → render capability routing.

use serde::Serialize;

/// Handling strategy selected for a file based on its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RenderCapability {
    WordPreview,
    SlidePreview,
    SheetPreview,
    SearchOnly,
}

impl RenderCapability {
    /// Icon identifier shown by the host's tab UI.
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::WordPreview => "file-text",
            Self::SlidePreview => "presentation",
            Self::SheetPreview => "sheet",
            Self::SearchOnly => "search",
        }
    }

    #[must_use]
    pub fn is_preview(self) -> bool {
        !matches!(self, Self::SearchOnly)
    }
}

const ROUTES: &[(&str, RenderCapability)] = &[
    ("docx", RenderCapability::WordPreview),
    ("doc", RenderCapability::WordPreview),
    ("pptx", RenderCapability::SlidePreview),
    ("ppt", RenderCapability::SlidePreview),
    ("xlsx", RenderCapability::SheetPreview),
    ("xls", RenderCapability::SheetPreview),
];

/// Office formats without an in-place renderer that the panel still accepts
/// (they go straight to search).
const SEARCH_ONLY_FORMATS: &[&str] = &["pdf", "key", "pages", "numbers"];

/// Map an extension to its capability. Total and case-insensitive; anything
/// unknown is [`RenderCapability::SearchOnly`].
#[must_use]
pub fn classify(extension: &str) -> RenderCapability {
    let extension = extension.trim_start_matches('.');
    ROUTES
        .iter()
        .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        .map_or(RenderCapability::SearchOnly, |&(_, capability)| capability)
}

/// Whether a file activation for this extension should open the panel at all.
#[must_use]
pub fn handles(extension: &str) -> bool {
    classify(extension).is_preview()
        || SEARCH_ONLY_FORMATS
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Lowercased substring after the last `.` of a file name, or `""`.
#[must_use]
pub fn extension_of(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}
