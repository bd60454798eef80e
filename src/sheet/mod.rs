//! Spreadsheet model, parsing and grid layout.
//!
//! Parsing is a collaborator ([`WorkbookParser`]); the default
//! [`OfficeWorkbookParser`] reads OOXML workbooks with zip + quick-xml and
//! legacy BIFF `.xls` files with calamine.

pub mod cell_ref;
pub mod grid;
mod xls;
mod xlsx;

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{PanelError, Result};

pub use grid::{tabs_view, GridRow, GridView, RowLimits, EMPTY_SHEET_TEXT};
pub use xls::parse_xls;
pub use xlsx::parse_xlsx;

/// Zero-based sheet position of the first stored row and column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Origin {
    pub row: u32,
    pub col: u32,
}

impl Origin {
    #[must_use]
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// In-memory tabular representation of one parsed workbook.
///
/// Rows are ragged: each row ends at its last non-empty cell, missing cells
/// inside a row are empty strings. Row 0 / column 0 of a sheet's rows sit at
/// that sheet's [`Origin`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetModel {
    sheet_names: Vec<String>,
    active_sheet_index: usize,
    cells_by_name: HashMap<String, Vec<Vec<String>>>,
    origins: HashMap<String, Origin>,
}

impl SheetModel {
    /// Build a model from sheets in workbook order, each starting at A1.
    /// The first sheet is active.
    #[must_use]
    pub fn new(sheets: Vec<(String, Vec<Vec<String>>)>) -> Self {
        Self::with_origins(
            sheets
                .into_iter()
                .map(|(name, rows)| (name, Origin::default(), rows))
                .collect(),
        )
    }

    /// Like [`SheetModel::new`], with the position of each sheet's first cell.
    #[must_use]
    pub fn with_origins(sheets: Vec<(String, Origin, Vec<Vec<String>>)>) -> Self {
        let mut sheet_names = Vec::with_capacity(sheets.len());
        let mut cells_by_name = HashMap::with_capacity(sheets.len());
        let mut origins = HashMap::with_capacity(sheets.len());
        for (name, origin, rows) in sheets {
            if cells_by_name.insert(name.clone(), rows).is_none() {
                origins.insert(name.clone(), origin);
                sheet_names.push(name);
            }
        }
        Self {
            sheet_names,
            active_sheet_index: 0,
            cells_by_name,
            origins,
        }
    }

    #[must_use]
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    #[must_use]
    pub fn sheet_count(&self) -> usize {
        self.sheet_names.len()
    }

    #[must_use]
    pub fn active_sheet_index(&self) -> usize {
        self.active_sheet_index
    }

    #[must_use]
    pub fn active_sheet_name(&self) -> Option<&str> {
        self.sheet_names
            .get(self.active_sheet_index)
            .map(String::as_str)
    }

    /// Make `index` the active sheet. Returns `false` for an out-of-range
    /// index, leaving the selection unchanged.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.sheet_names.len() {
            self.active_sheet_index = index;
            true
        } else {
            false
        }
    }

    /// Rows of the named sheet.
    #[must_use]
    pub fn rows(&self, name: &str) -> Option<&[Vec<String>]> {
        self.cells_by_name.get(name).map(Vec::as_slice)
    }

    /// Rows of the active sheet (empty for a workbook without sheets).
    #[must_use]
    pub fn active_rows(&self) -> &[Vec<String>] {
        self.active_sheet_name()
            .and_then(|name| self.rows(name))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn origin(&self, name: &str) -> Origin {
        self.origins.get(name).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn active_origin(&self) -> Origin {
        self.active_sheet_name()
            .map(|name| self.origin(name))
            .unwrap_or_default()
    }
}

/// Turns workbook bytes into a [`SheetModel`]. May fail on malformed input.
pub trait WorkbookParser {
    /// # Errors
    /// Returns [`PanelError::Parse`] when the bytes are not a readable workbook.
    fn parse(&self, bytes: &[u8]) -> Result<SheetModel>;
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Sniffs the container format: OOXML (`.xlsx`) or compound-file BIFF (`.xls`).
#[derive(Debug, Clone, Copy, Default)]
pub struct OfficeWorkbookParser;

impl WorkbookParser for OfficeWorkbookParser {
    fn parse(&self, bytes: &[u8]) -> Result<SheetModel> {
        let model = if bytes.starts_with(ZIP_MAGIC) {
            parse_xlsx(bytes)
        } else if bytes.starts_with(CFB_MAGIC) {
            parse_xls(bytes)
        } else {
            Err(PanelError::Parse(
                "not an Excel workbook (unrecognized file signature)".to_string(),
            ))
        };
        model.map_err(PanelError::into_parse)
    }
}

/// Densify sparse `(row, col, text)` cells into ragged rows starting at the
/// top-left non-empty cell, returned as the origin.
pub(crate) fn rows_from_cells(
    mut cells: Vec<(u32, u32, String)>,
) -> (Origin, Vec<Vec<String>>) {
    cells.retain(|(_, _, text)| !text.is_empty());
    let Some(min_row) = cells.iter().map(|c| c.0).min() else {
        return (Origin::default(), Vec::new());
    };
    let min_col = cells.iter().map(|c| c.1).min().unwrap_or(0);
    let max_row = cells.iter().map(|c| c.0).max().unwrap_or(min_row);

    let height = usize::try_from(max_row - min_row).unwrap_or(0) + 1;
    let mut rows: Vec<Vec<String>> = vec![Vec::new(); height];
    for (row, col, text) in cells {
        let (Ok(r), Ok(c)) = (
            usize::try_from(row - min_row),
            usize::try_from(col - min_col),
        ) else {
            continue;
        };
        let Some(cells_in_row) = rows.get_mut(r) else {
            continue;
        };
        if cells_in_row.len() <= c {
            cells_in_row.resize(c + 1, String::new());
        }
        if let Some(slot) = cells_in_row.get_mut(c) {
            *slot = text;
        }
    }
    (Origin::new(min_row, min_col), rows)
}
