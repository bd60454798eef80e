//! Legacy BIFF (`.xls`) workbooks, read through calamine.

use std::io::Cursor;

use calamine::{Data, Reader, Xls};

use super::xlsx::format_general;
use super::{rows_from_cells, SheetModel};
use crate::error::Result;

/// Parse a compound-file `.xls` workbook into a [`SheetModel`].
///
/// # Errors
/// Returns the calamine error when the stream is not a readable workbook.
pub fn parse_xls(data: &[u8]) -> Result<SheetModel> {
    let mut workbook: Xls<_> = Xls::new(Cursor::new(data))?;
    let names = workbook.sheet_names();

    let mut parsed = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook.worksheet_range(&name)?;
        let (row0, col0) = range.start().unwrap_or((0, 0));
        let cells = range
            .used_cells()
            .filter_map(|(row, col, value)| {
                let row = row0.saturating_add(u32::try_from(row).ok()?);
                let col = col0.saturating_add(u32::try_from(col).ok()?);
                Some((row, col, display(value)))
            })
            .collect();
        let (origin, rows) = rows_from_cells(cells);
        parsed.push((name, origin, rows));
    }
    tracing::debug!(sheets = parsed.len(), "parsed xls workbook");
    Ok(SheetModel::with_origins(parsed))
}

fn display(value: &Data) -> String {
    match value {
        Data::Float(f) => format_general(&f.to_string()),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}
