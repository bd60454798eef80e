//! Panel configuration.
//!
//! Every field has a default, so hosts only pass the keys they want to
//! override (`{"search_url_template": "https://duckduckgo.com/?q={query}"}`).

use serde::{Deserialize, Serialize};

use crate::error::{PanelError, Result};

/// Placeholder substituted with the percent-encoded query term.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Tunables for the preview panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Search URL with a `{query}` placeholder.
    pub search_url_template: String,
    /// Viewports at or below this width (CSS px) use the narrow layout.
    pub narrow_breakpoint_px: f64,
    /// Slide size used when the container measures zero.
    pub slide_default_width: f64,
    pub slide_default_height: f64,
    /// Bounded wait after the word renderer resolves before styling.
    pub word_settle_ms: u32,
    /// Bounded wait after the slide previewer resolves before styling.
    pub slide_settle_ms: u32,
    /// Redirect to search automatically when a spreadsheet fails to parse.
    pub sheet_auto_fallback: bool,
    /// Delay before the automatic spreadsheet fallback.
    pub sheet_fallback_delay_ms: u32,
    /// Lifetime of the copy status banner.
    pub status_timeout_ms: u32,
    /// Fewest grid rows shown (short sheets are padded with empty rows).
    pub sheet_min_rows: usize,
    /// Most grid rows shown before the table is truncated.
    pub sheet_max_rows: usize,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            search_url_template: "https://www.baidu.com/s?wd={query}".to_string(),
            narrow_breakpoint_px: 768.0,
            slide_default_width: 960.0,
            slide_default_height: 540.0,
            word_settle_ms: 100,
            slide_settle_ms: 500,
            sheet_auto_fallback: true,
            sheet_fallback_delay_ms: 2000,
            status_timeout_ms: 2000,
            sheet_min_rows: 50,
            sheet_max_rows: 200,
        }
    }
}

impl PanelConfig {
    /// Parse a JSON object, filling missing keys with defaults.
    ///
    /// # Errors
    /// Returns an error for malformed JSON or a config that fails
    /// [`PanelConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the cross-field constraints serde cannot express.
    ///
    /// # Errors
    /// Returns [`PanelError::Config`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if !self.search_url_template.contains(QUERY_PLACEHOLDER) {
            return Err(PanelError::Config(format!(
                "search_url_template must contain {QUERY_PLACEHOLDER}"
            )));
        }
        if self.sheet_min_rows > self.sheet_max_rows {
            return Err(PanelError::Config(format!(
                "sheet_min_rows ({}) exceeds sheet_max_rows ({})",
                self.sheet_min_rows, self.sheet_max_rows
            )));
        }
        if self.slide_default_width <= 0.0 || self.slide_default_height <= 0.0 {
            return Err(PanelError::Config(
                "slide default size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
