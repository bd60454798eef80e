//! Structured error types for docpanel.
//!
//! Every variant is caught at the boundary of the procedure that produced it
//! and turned into a `RenderOutcome::Error` or `CopyOutcome::Error`; nothing
//! here is meant to reach the host as a crash.

/// All errors that can occur while loading, parsing, rendering or copying.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    /// The byte source for the target file could not be read.
    #[error("Could not read file: {0}")]
    Load(String),

    /// A word or slide renderer threw or rejected.
    #[error("Render failed: {0}")]
    Render(String),

    /// The spreadsheet could not be parsed.
    #[error("Could not parse spreadsheet: {0}")]
    Parse(String),

    /// Every clipboard strategy failed.
    #[error("Copy failed: {0}")]
    Clipboard(String),

    /// The panel was closed; no further transitions are accepted.
    #[error("Panel is closed")]
    Closed,

    /// Invalid panel configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Legacy binary workbook error from calamine.
    #[error("XLS workbook: {0}")]
    Xls(#[from] calamine::XlsError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PanelError>;

impl PanelError {
    /// Re-tag a lower-level failure as a spreadsheet parse failure so the
    /// sheet pipeline reports a single error kind.
    #[must_use]
    pub fn into_parse(self) -> Self {
        match self {
            Self::Parse(_) => self,
            other => Self::Parse(other.to_string()),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl From<PanelError> for wasm_bindgen::JsValue {
    fn from(e: PanelError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn into_parse_keeps_parse_errors() {
        let err = PanelError::Parse("bad sheet".into()).into_parse();
        assert_eq!(err.to_string(), "Could not parse spreadsheet: bad sheet");
    }

    #[test]
    fn into_parse_wraps_other_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated");
        let err = PanelError::from(io).into_parse();
        assert!(matches!(err, PanelError::Parse(_)));
        assert!(err.to_string().contains("truncated"));
    }
}
