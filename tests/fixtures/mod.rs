//! Test fixtures for generating Office files in memory.
//!
//! Builders for XLSX workbooks, DOCX documents and PPTX decks with known
//! contents, so the parsers and the panel can be tested without binary
//! assets.
//!
//! # Example
//!
//! ```rust,ignore
//! use fixtures::XlsxBuilder;
//!
//! let xlsx = XlsxBuilder::new()
//!     .add_sheet("Sheet1")
//!     .add_cell("A1", "Hello")
//!     .add_cell("B1", 42.0)
//!     .build();
//!
//! let model = docpanel::sheet::parse_xlsx(&xlsx).unwrap();
//! ```
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic,
    clippy::cast_possible_truncation
)]

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

// ============================================================================
// Cell Value
// ============================================================================

/// Represents a cell value that can be added to a sheet.
#[derive(Debug, Clone)]
pub enum CellValue {
    /// A shared string.
    String(String),
    /// A numeric value.
    Number(f64),
    /// A boolean value.
    Boolean(bool),
    /// An error value (e.g., "#DIV/0!").
    Error(String),
    /// An inline string (not shared).
    InlineString(String),
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

// ============================================================================
// XLSX Builder
// ============================================================================

/// Builder for a single worksheet.
#[derive(Debug, Clone, Default)]
pub struct SheetBuilder {
    pub name: String,
    pub cells: Vec<(String, CellValue)>,
}

impl SheetBuilder {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cells: Vec::new(),
        }
    }

    /// Add a cell by reference ("B3").
    #[must_use]
    pub fn cell<V: Into<CellValue>>(mut self, cell_ref: &str, value: V) -> Self {
        self.cells.push((cell_ref.to_string(), value.into()));
        self
    }

    /// Add `rows` x `cols` cells, each holding "r{row}c{col}".
    #[must_use]
    pub fn filled(mut self, rows: u32, cols: u32) -> Self {
        for row in 1..=rows {
            for col in 1..=cols {
                let cell_ref = format!("{}{}", col_letter(col), row);
                self.cells
                    .push((cell_ref, CellValue::String(format!("r{row}c{col}"))));
            }
        }
        self
    }
}

/// Builder for creating complete XLSX files.
#[derive(Debug, Default)]
pub struct XlsxBuilder {
    sheets: Vec<SheetBuilder>,
}

impl XlsxBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sheet(mut self, sheet: SheetBuilder) -> Self {
        self.sheets.push(sheet);
        self
    }

    /// Add a sheet by name (returns a builder for chaining).
    #[must_use]
    pub fn add_sheet(self, name: &str) -> XlsxSheetAdder {
        XlsxSheetAdder {
            builder: self,
            sheet: SheetBuilder::new(name),
        }
    }

    /// Build the XLSX file as bytes.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let mut shared_strings: Vec<String> = Vec::new();
        for sheet in &self.sheets {
            for (_, value) in &sheet.cells {
                if let CellValue::String(s) = value {
                    if !shared_strings.contains(s) {
                        shared_strings.push(s.clone());
                    }
                }
            }
        }

        let mut parts = vec![
            (
                "[Content_Types].xml".to_string(),
                content_types(&[(
                    "/xl/workbook.xml",
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
                )]),
            ),
            (
                "_rels/.rels".to_string(),
                package_rels("xl/workbook.xml"),
            ),
            (
                "xl/_rels/workbook.xml.rels".to_string(),
                workbook_rels(self.sheets.len()),
            ),
            ("xl/workbook.xml".to_string(), workbook_xml(&self.sheets)),
        ];
        if !shared_strings.is_empty() {
            parts.push((
                "xl/sharedStrings.xml".to_string(),
                shared_strings_xml(&shared_strings),
            ));
        }
        for (i, sheet) in self.sheets.iter().enumerate() {
            parts.push((
                format!("xl/worksheets/sheet{}.xml", i + 1),
                sheet_xml(sheet, &shared_strings),
            ));
        }
        zip_parts(&parts)
    }
}

/// Helper for fluent sheet building within `XlsxBuilder`.
pub struct XlsxSheetAdder {
    builder: XlsxBuilder,
    sheet: SheetBuilder,
}

impl XlsxSheetAdder {
    #[must_use]
    pub fn add_cell<V: Into<CellValue>>(mut self, cell_ref: &str, value: V) -> Self {
        self.sheet = self.sheet.cell(cell_ref, value);
        self
    }

    /// Finish the current sheet and return the builder.
    #[must_use]
    pub fn done(mut self) -> XlsxBuilder {
        self.builder.sheets.push(self.sheet);
        self.builder
    }

    /// Build the XLSX directly (finishes the current sheet automatically).
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.done().build()
    }
}

fn workbook_rels(sheet_count: usize) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(RELS_OPEN);
    for i in 1..=sheet_count {
        xml.push_str(&format!(
            r#"<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
        ));
    }
    xml.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
        sheet_count + 1
    ));
    xml.push_str("</Relationships>");
    xml
}

fn workbook_xml(sheets: &[SheetBuilder]) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#);
    xml.push_str("<sheets>");
    for (i, sheet) in sheets.iter().enumerate() {
        xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape_xml(&sheet.name),
            i + 1,
            i + 1
        ));
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn shared_strings_xml(strings: &[String]) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(&format!(
        r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
        strings.len()
    ));
    for s in strings {
        xml.push_str(&format!(
            r#"<si><t xml:space="preserve">{}</t></si>"#,
            escape_xml(s)
        ));
    }
    xml.push_str("</sst>");
    xml
}

fn sheet_xml(sheet: &SheetBuilder, shared_strings: &[String]) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#);
    xml.push_str("<sheetData>");

    let mut rows: std::collections::BTreeMap<u32, Vec<(u32, &str, &CellValue)>> =
        std::collections::BTreeMap::new();
    for (cell_ref, value) in &sheet.cells {
        let (col, row) = parse_cell_ref(cell_ref);
        rows.entry(row)
            .or_default()
            .push((col, cell_ref.as_str(), value));
    }

    for (row, mut cells) in rows {
        cells.sort_by_key(|(col, _, _)| *col);
        xml.push_str(&format!(r#"<row r="{row}">"#));
        for (_, cell_ref, value) in cells {
            let cell = match value {
                CellValue::String(s) => {
                    let idx = shared_strings.iter().position(|x| x == s).unwrap_or(0);
                    format!(r#"<c r="{cell_ref}" t="s"><v>{idx}</v></c>"#)
                }
                CellValue::Number(n) => format!(r#"<c r="{cell_ref}"><v>{n}</v></c>"#),
                CellValue::Boolean(b) => {
                    format!(r#"<c r="{cell_ref}" t="b"><v>{}</v></c>"#, u8::from(*b))
                }
                CellValue::Error(e) => {
                    format!(r#"<c r="{cell_ref}" t="e"><v>{}</v></c>"#, escape_xml(e))
                }
                CellValue::InlineString(s) => format!(
                    r#"<c r="{cell_ref}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    escape_xml(s)
                ),
            };
            xml.push_str(&cell);
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

// ============================================================================
// DOCX Builder
// ============================================================================

#[derive(Debug, Clone)]
enum DocBlock {
    Paragraph { style: Option<String>, text: String },
    Table(Vec<Vec<String>>),
}

/// Builder for a word document with paragraphs, headings and tables.
#[derive(Debug, Default)]
pub struct DocxBuilder {
    blocks: Vec<DocBlock>,
}

impl DocxBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn paragraph(mut self, text: &str) -> Self {
        self.blocks.push(DocBlock::Paragraph {
            style: None,
            text: text.to_string(),
        });
        self
    }

    /// Add a paragraph styled `Heading{level}`.
    #[must_use]
    pub fn heading(mut self, level: u8, text: &str) -> Self {
        self.blocks.push(DocBlock::Paragraph {
            style: Some(format!("Heading{level}")),
            text: text.to_string(),
        });
        self
    }

    #[must_use]
    pub fn table(mut self, rows: &[&[&str]]) -> Self {
        self.blocks.push(DocBlock::Table(
            rows.iter()
                .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
                .collect(),
        ));
        self
    }

    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let mut body = String::new();
        for block in &self.blocks {
            match block {
                DocBlock::Paragraph { style, text } => body.push_str(&docx_paragraph(style.as_deref(), text)),
                DocBlock::Table(rows) => {
                    body.push_str("<w:tbl><w:tblPr/>");
                    for row in rows {
                        body.push_str("<w:tr>");
                        for cell in row {
                            body.push_str("<w:tc><w:tcPr/>");
                            body.push_str(&docx_paragraph(None, cell));
                            body.push_str("</w:tc>");
                        }
                        body.push_str("</w:tr>");
                    }
                    body.push_str("</w:tbl>");
                }
            }
        }

        let mut document = String::from(XML_DECL);
        document.push_str(r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#);
        document.push_str(&body);
        document.push_str("<w:sectPr/></w:body></w:document>");

        zip_parts(&[
            (
                "[Content_Types].xml".to_string(),
                content_types(&[(
                    "/word/document.xml",
                    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
                )]),
            ),
            ("_rels/.rels".to_string(), package_rels("word/document.xml")),
            ("word/document.xml".to_string(), document),
        ])
    }
}

fn docx_paragraph(style: Option<&str>, text: &str) -> String {
    let props = style
        .map(|s| format!(r#"<w:pPr><w:pStyle w:val="{s}"/></w:pPr>"#))
        .unwrap_or_default();
    format!(
        r#"<w:p>{props}<w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape_xml(text)
    )
}

// ============================================================================
// PPTX Builder
// ============================================================================

/// Builder for a slide deck; each slide is a list of text paragraphs.
#[derive(Debug, Default)]
pub struct PptxBuilder {
    slides: Vec<Vec<String>>,
}

impl PptxBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn slide(mut self, paragraphs: &[&str]) -> Self {
        self.slides
            .push(paragraphs.iter().map(|p| (*p).to_string()).collect());
        self
    }

    /// Build with slides listed in reverse part order (slide parts are
    /// numbered 1..n, but presentation.xml lists them n..1), to check that
    /// readers follow the slide list instead of file names.
    #[must_use]
    pub fn build_reversed(self) -> Vec<u8> {
        self.build_with(true)
    }

    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.build_with(false)
    }

    fn build_with(self, reversed: bool) -> Vec<u8> {
        let count = self.slides.len();
        let mut order: Vec<usize> = (1..=count).collect();
        if reversed {
            order.reverse();
        }

        let mut rels = String::from(XML_DECL);
        rels.push_str(RELS_OPEN);
        for i in 1..=count {
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{i}.xml"/>"#,
                i + 1
            ));
        }
        rels.push_str("</Relationships>");

        let mut presentation = String::from(XML_DECL);
        presentation.push_str(r#"<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldIdLst>"#);
        for (pos, i) in order.iter().enumerate() {
            presentation.push_str(&format!(
                r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                256 + pos,
                i + 1
            ));
        }
        presentation.push_str(r#"</p:sldIdLst><p:sldSz cx="9144000" cy="5143500"/></p:presentation>"#);

        let mut parts = vec![
            (
                "[Content_Types].xml".to_string(),
                content_types(&[(
                    "/ppt/presentation.xml",
                    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml",
                )]),
            ),
            ("_rels/.rels".to_string(), package_rels("ppt/presentation.xml")),
            ("ppt/_rels/presentation.xml.rels".to_string(), rels),
            ("ppt/presentation.xml".to_string(), presentation),
        ];

        // The part listed at position `pos` holds the `pos`-th slide.
        for (pos, i) in order.iter().enumerate() {
            let paragraphs = &self.slides[pos];
            let mut slide = String::from(XML_DECL);
            slide.push_str(r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:txBody><a:bodyPr/>"#);
            for text in paragraphs {
                slide.push_str(&format!(
                    "<a:p><a:r><a:t>{}</a:t></a:r></a:p>",
                    escape_xml(text)
                ));
            }
            slide.push_str("</p:txBody></p:sp></p:spTree></p:cSld></p:sld>");
            parts.push((format!("ppt/slides/slide{i}.xml"), slide));
        }
        zip_parts(&parts)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const RELS_OPEN: &str =
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#;

fn zip_parts(parts: &[(String, String)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, body) in parts {
        zip.start_file(name.as_str(), options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().expect("Failed to finish ZIP").into_inner()
}

fn content_types(overrides: &[(&str, &str)]) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    for (part, content_type) in overrides {
        xml.push_str(&format!(
            r#"<Override PartName="{part}" ContentType="{content_type}"/>"#
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn package_rels(main_part: &str) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(RELS_OPEN);
    xml.push_str(&format!(
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="{main_part}"/>"#
    ));
    xml.push_str("</Relationships>");
    xml
}

/// Escape XML special characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// 1-based column number to letters (1 -> A, 27 -> AA).
pub fn col_letter(mut col: u32) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        col -= 1;
        letters.push(b'A' + (col % 26) as u8);
        col /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap()
}

/// "B3" -> (2, 3), both 1-based.
fn parse_cell_ref(cell_ref: &str) -> (u32, u32) {
    let split = cell_ref
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(cell_ref.len());
    let (letters, digits) = cell_ref.split_at(split);
    let col = letters
        .bytes()
        .fold(0, |acc, b| acc * 26 + u32::from(b.to_ascii_uppercase() - b'A' + 1));
    (col, digits.parse().unwrap_or(1))
}

// ============================================================================
// Convenience Functions
// ============================================================================

/// Create an XLSX with a single cell containing text.
#[must_use]
pub fn xlsx_with_text(text: &str) -> Vec<u8> {
    XlsxBuilder::new()
        .add_sheet("Sheet1")
        .add_cell("A1", text)
        .build()
}

/// Create a minimal valid XLSX with a single empty sheet.
#[must_use]
pub fn minimal_xlsx() -> Vec<u8> {
    XlsxBuilder::new().add_sheet("Sheet1").build()
}
