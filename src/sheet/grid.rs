//! Grid layout for the active sheet, and the tab strip.

use serde::Serialize;

use super::cell_ref::col_to_letter;
use super::{Origin, SheetModel};
use crate::config::PanelConfig;
use crate::mount::{el, Action, ViewNode};

pub const EMPTY_SHEET_TEXT: &str = "This sheet is empty";

/// Bounds on the number of displayed grid rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLimits {
    pub min: usize,
    pub max: usize,
}

impl Default for RowLimits {
    fn default() -> Self {
        Self { min: 50, max: 200 }
    }
}

impl RowLimits {
    #[must_use]
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn from_config(config: &PanelConfig) -> Self {
        Self::new(config.sheet_min_rows, config.sheet_max_rows)
    }

    /// `max(min, min(max, total))`: short sheets get filler rows, long ones
    /// are cut off.
    #[must_use]
    pub fn displayed(self, total: usize) -> usize {
        total.min(self.max).max(self.min)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRow {
    /// 1-based sheet row number shown in the leading column.
    pub number: usize,
    /// Exactly `GridView::width` cells.
    pub cells: Vec<String>,
}

/// Rectangular, bounded view of one sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridView {
    pub width: usize,
    pub rows: Vec<GridRow>,
    pub total_rows: usize,
    /// Sheet position of the first grid cell; headers and row numbers are
    /// labelled from here.
    pub origin: Origin,
}

impl GridView {
    /// Grid for rows starting at A1.
    #[must_use]
    pub fn build(rows: &[Vec<String>], limits: RowLimits) -> Self {
        Self::build_at(rows, Origin::default(), limits)
    }

    #[must_use]
    pub fn build_at(rows: &[Vec<String>], origin: Origin, limits: RowLimits) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let total_rows = rows.len();
        if width == 0 {
            return Self {
                width,
                rows: Vec::new(),
                total_rows,
                origin,
            };
        }

        let first_number = usize::try_from(origin.row).unwrap_or(0) + 1;

        let displayed = limits.displayed(total_rows);
        let grid_rows = (0..displayed)
            .map(|idx| {
                let mut cells = rows.get(idx).cloned().unwrap_or_default();
                cells.resize(width, String::new());
                GridRow {
                    number: first_number + idx,
                    cells,
                }
            })
            .collect();

        Self {
            width,
            rows: grid_rows,
            total_rows,
            origin,
        }
    }

    /// Grid for the model's active sheet.
    #[must_use]
    pub fn for_active_sheet(model: &SheetModel, limits: RowLimits) -> Self {
        Self::build_at(model.active_rows(), model.active_origin(), limits)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0
    }

    /// Data rows that did not fit.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.total_rows > self.rows.len()
    }

    #[must_use]
    pub fn summary(&self) -> Option<String> {
        self.is_truncated()
            .then(|| format!("Showing {} of {} rows", self.rows.len(), self.total_rows))
    }

    /// Table with column letters and a row-number column, followed by the
    /// truncation summary; the empty notice for an empty sheet.
    #[must_use]
    pub fn to_view(&self) -> ViewNode {
        if self.is_empty() {
            return el("div")
                .class("docpanel-notice")
                .text(EMPTY_SHEET_TEXT)
                .into();
        }

        let header = (0..self.width).fold(
            el("tr").child(el("th").class("corner")),
            |tr, col| {
                let letter = u32::try_from(col)
                    .ok()
                    .and_then(|col| self.origin.col.checked_add(col))
                    .map(col_to_letter)
                    .unwrap_or_default();
                tr.child(el("th").text(letter))
            },
        );

        let body = self.rows.iter().map(|row| {
            let numbered = el("tr").child(
                el("td")
                    .class("row-number")
                    .text(row.number.to_string()),
            );
            ViewNode::from(
                row.cells
                    .iter()
                    .fold(numbered, |tr, cell| tr.child(el("td").text(cell.clone()))),
            )
        });

        let table = el("table")
            .class("docpanel-grid")
            .child(el("thead").child(header))
            .child(el("tbody").children(body));

        let mut wrapper = el("div").class("docpanel-grid-wrapper").child(table);
        if let Some(summary) = self.summary() {
            wrapper = wrapper.child(el("div").class("docpanel-summary").text(summary));
        }
        wrapper.into()
    }
}

/// One button per sheet, the active one marked. `None` for single-sheet
/// workbooks.
#[must_use]
pub fn tabs_view(model: &SheetModel) -> Option<ViewNode> {
    if model.sheet_count() < 2 {
        return None;
    }
    let active = model.active_sheet_index();
    let tabs = model.sheet_names().iter().enumerate().map(|(idx, name)| {
        let mut tab = el("button")
            .class("docpanel-tab")
            .attr("title", name.clone())
            .text(name.clone())
            .on_click(Action::SelectSheet(idx));
        if idx == active {
            tab = tab.class("active");
        }
        ViewNode::from(tab)
    });
    Some(el("div").class("docpanel-tabs").children(tabs).into())
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    fn rows(lengths: &[usize]) -> Vec<Vec<String>> {
        lengths
            .iter()
            .enumerate()
            .map(|(r, &len)| (0..len).map(|c| format!("r{r}c{c}")).collect())
            .collect()
    }

    #[test]
    fn short_rows_are_padded_to_max_width() {
        let grid = GridView::build(&rows(&[3, 1, 2]), RowLimits::default());
        assert_eq!(grid.width, 3);
        assert!(grid.rows.iter().all(|r| r.cells.len() == 3));
        assert_eq!(grid.rows[1].cells, vec!["r1c0", "", ""]);
        let numbers: Vec<usize> = grid.rows.iter().take(3).map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn short_sheets_get_filler_rows() {
        let grid = GridView::build(&rows(&[2, 2]), RowLimits::default());
        assert_eq!(grid.rows.len(), 50);
        assert_eq!(grid.rows[49].number, 50);
        assert!(grid.rows[49].cells.iter().all(String::is_empty));
        assert!(grid.summary().is_none());
    }

    #[test]
    fn long_sheets_are_truncated_with_summary() {
        let grid = GridView::build(&rows(&[5; 300]), RowLimits::default());
        assert_eq!(grid.rows.len(), 200);
        assert!(grid.is_truncated());
        assert_eq!(grid.summary().as_deref(), Some("Showing 200 of 300 rows"));
        let text = grid.to_view().visible_text();
        assert!(text.ends_with("Showing 200 of 300 rows"));
    }

    #[test]
    fn displayed_rows_follow_limits() {
        let limits = RowLimits::new(50, 200);
        assert_eq!(limits.displayed(0), 50);
        assert_eq!(limits.displayed(120), 120);
        assert_eq!(limits.displayed(5000), 200);
    }

    #[test]
    fn empty_sheet_renders_notice() {
        let grid = GridView::build(&[], RowLimits::default());
        assert!(grid.is_empty());
        assert_eq!(grid.to_view().visible_text(), EMPTY_SHEET_TEXT);
    }

    #[test]
    fn table_has_letter_headers_and_row_numbers() {
        let grid = GridView::build(&rows(&[2]), RowLimits::new(1, 10));
        let text = grid.to_view().visible_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "\tA\tB");
        assert_eq!(lines[1], "1\tr0c0\tr0c1");
    }

    #[test]
    fn offset_grid_is_labelled_from_its_origin() {
        let grid = GridView::build_at(&rows(&[2, 2]), Origin::new(2, 2), RowLimits::new(1, 10));
        let text = grid.to_view().visible_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "\tC\tD");
        assert_eq!(lines[1], "3\tr0c0\tr0c1");
        assert_eq!(lines[2], "4\tr1c0\tr1c1");
    }

    #[test]
    fn tabs_only_for_multi_sheet_workbooks() {
        let single = SheetModel::new(vec![("Only".into(), vec![])]);
        assert!(tabs_view(&single).is_none());

        let mut model = SheetModel::new(vec![("A".into(), vec![]), ("B".into(), vec![])]);
        model.select(1);
        let tabs = tabs_view(&model).unwrap();
        assert_eq!(tabs.actions(), vec![Action::SelectSheet(0), Action::SelectSheet(1)]);
        let ViewNode::Element(strip) = tabs else {
            panic!("expected element");
        };
        let ViewNode::Element(second) = &strip.children[1] else {
            panic!("expected button");
        };
        assert!(second.has_class("active"));
    }
}
