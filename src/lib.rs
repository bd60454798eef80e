//! docpanel - document preview panel for the web
//!
//! Shows Word, PowerPoint and Excel files inside a host application's panel
//! and falls back to an embedded web search for everything else:
//! - Extension routing to a render capability
//! - Async render pipeline with generation tokens (stale renders never land)
//! - Spreadsheet grid with sheet tabs, row padding and truncation
//! - Copy-visible-text with clipboard fallbacks
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { DocPanel } from 'docpanel';
//! await init();
//! const panel = new DocPanel(container, {});
//! panel.open();
//! panel.retarget('report.xlsx', 'docs/report.xlsx', () => bytes);
//! ```
//!
//! Natively the same controller runs against [`mount::MemoryMount`]; see the
//! `docpanel_cli` binary.

pub mod clipboard;
pub mod config;
pub mod controller;
pub mod error;
pub mod mount;
#[cfg(not(target_arch = "wasm32"))]
pub mod outline;
pub mod pipeline;
pub mod router;
pub mod runtime;
pub mod search;
pub mod sheet;
pub mod style;
pub mod target;
pub mod xml_helpers;

#[cfg(target_arch = "wasm32")]
pub mod web;

use wasm_bindgen::prelude::*;

pub use clipboard::{ClipboardExporter, ClipboardStrategy, CopyOutcome, MemoryClipboard};
pub use config::PanelConfig;
pub use controller::{PanelServices, RenderState, ViewStateController};
pub use error::{PanelError, Result};
pub use mount::{Action, MemoryMount, MountPoint, Size, ViewNode};
pub use pipeline::{RenderOutcome, RenderPipeline};
pub use router::{classify, RenderCapability};
pub use search::SearchFallback;
pub use sheet::{GridView, OfficeWorkbookParser, SheetModel, WorkbookParser};
pub use target::{ByteSource, InMemory, TargetFile};

#[cfg(target_arch = "wasm32")]
pub use web::DocPanel;

/// Parse a workbook (`.xlsx` or `.xls`) and return the grid of its first
/// sheet as JSON.
///
/// # Errors
/// Returns an error if the workbook cannot be parsed.
#[wasm_bindgen(js_name = parseSheet)]
pub fn parse_sheet(data: &[u8]) -> std::result::Result<String, JsValue> {
    let model = OfficeWorkbookParser
        .parse(data)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let grid = GridView::for_active_sheet(&model, sheet::RowLimits::default());
    serde_json::to_string(&grid)
        .map_err(|e| JsValue::from_str(&format!("JSON serialization error: {e}")))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
