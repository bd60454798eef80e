//! Workbook parsing against generated XLSX files.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

mod fixtures;

use docpanel::sheet::{
    parse_xlsx, GridView, OfficeWorkbookParser, Origin, RowLimits, WorkbookParser,
};
use docpanel::PanelError;
use fixtures::{minimal_xlsx, xlsx_with_text, CellValue, SheetBuilder, XlsxBuilder};

#[test]
fn test_single_text_cell() {
    let model = parse_xlsx(&xlsx_with_text("Hello")).unwrap();
    assert_eq!(model.sheet_names(), ["Sheet1"]);
    assert_eq!(model.active_rows(), [vec!["Hello".to_string()]]);
}

#[test]
fn test_sheet_order_and_names() {
    let xlsx = XlsxBuilder::new()
        .sheet(SheetBuilder::new("Summary").cell("A1", "s"))
        .sheet(SheetBuilder::new("Q1 & Q2").cell("A1", "q"))
        .sheet(SheetBuilder::new("Raw").cell("A1", "r"))
        .build();
    let model = parse_xlsx(&xlsx).unwrap();
    assert_eq!(model.sheet_names(), ["Summary", "Q1 & Q2", "Raw"]);
    assert_eq!(model.active_sheet_index(), 0);
    assert_eq!(model.rows("Raw").unwrap(), [vec!["r".to_string()]]);
}

#[test]
fn test_cell_types_as_display_text() {
    let xlsx = XlsxBuilder::new()
        .add_sheet("Types")
        .add_cell("A1", "shared")
        .add_cell("B1", 42)
        .add_cell("C1", 3.25)
        .add_cell("D1", true)
        .add_cell("E1", CellValue::Error("#DIV/0!".into()))
        .add_cell("F1", CellValue::InlineString("inline".into()))
        .build();
    let model = parse_xlsx(&xlsx).unwrap();
    assert_eq!(
        model.active_rows()[0],
        vec!["shared", "42", "3.25", "TRUE", "#DIV/0!", "inline"]
    );
}

#[test]
fn test_rows_start_at_top_left_cell_and_gaps_become_empty() {
    let xlsx = XlsxBuilder::new()
        .add_sheet("Sparse")
        .add_cell("B2", "b2")
        .add_cell("D4", "d4")
        .build();
    let model = parse_xlsx(&xlsx).unwrap();
    let rows = model.active_rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], vec!["b2"]);
    assert!(rows[1].iter().all(String::is_empty));
    assert_eq!(rows[2], vec!["", "", "d4"]);

    let grid = GridView::for_active_sheet(&model, RowLimits::default());
    assert_eq!(grid.width, 3);
    assert_eq!(grid.rows[0].cells, vec!["b2", "", ""]);
    assert_eq!(grid.rows[0].number, 2);
}

#[test]
fn test_offset_sheet_keeps_its_column_letters_and_row_numbers() {
    let xlsx = XlsxBuilder::new()
        .add_sheet("Offset")
        .add_cell("C3", "x")
        .add_cell("D3", "y")
        .build();
    let model = parse_xlsx(&xlsx).unwrap();
    assert_eq!(model.active_origin(), Origin::new(2, 2));

    let grid = GridView::for_active_sheet(&model, RowLimits::new(1, 10));
    assert_eq!(grid.rows[0].number, 3);
    let text = grid.to_view().visible_text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "\tC\tD");
    assert_eq!(lines[1], "3\tx\ty");
}

#[test]
fn test_empty_sheet() {
    let model = parse_xlsx(&minimal_xlsx()).unwrap();
    assert!(model.active_rows().is_empty());
    let grid = GridView::for_active_sheet(&model, RowLimits::default());
    assert!(grid.is_empty());
    assert!(grid.to_view().visible_text().contains("This sheet is empty"));
}

#[test]
fn test_escaped_shared_strings() {
    let model = parse_xlsx(&xlsx_with_text("a < b & \"c\"")).unwrap();
    assert_eq!(model.active_rows()[0][0], "a < b & \"c\"");
}

#[test]
fn test_garbage_is_parse_error() {
    let err = OfficeWorkbookParser.parse(b"definitely not a workbook").unwrap_err();
    assert!(matches!(err, PanelError::Parse(_)), "got {err:?}");
}

#[test]
fn test_office_parser_reads_xlsx() {
    let model = OfficeWorkbookParser.parse(&xlsx_with_text("via trait")).unwrap();
    assert_eq!(model.active_rows()[0][0], "via trait");
}
