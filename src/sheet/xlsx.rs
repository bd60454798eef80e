//! OOXML workbook reader.
//!
//! Reads just what the grid needs: sheet order and names from
//! `xl/workbook.xml` (resolved through the workbook relationships), the
//! shared string table, and each worksheet's cell values as display text.

use std::collections::HashMap;
use std::io::{BufReader, Cursor, Read, Seek};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::cell_ref::parse_cell_ref;
use super::{rows_from_cells, SheetModel};
use crate::error::Result;
use crate::xml_helpers::{attr_bytes, attr_string, attr_string_local, text_of};

/// Sheet metadata from workbook.xml
struct SheetInfo {
    name: String,
    path: String,
}

#[derive(Default)]
struct WorkbookRelationships {
    worksheets: HashMap<String, String>,
    shared_strings: Option<String>,
}

/// Cell type tag from the `t` attribute of a `<c>` element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum CellKind {
    Shared,
    Inline,
    Str,
    Bool,
    Error,
    Number,
}

impl CellKind {
    fn from_tag(tag: Option<&[u8]>) -> Self {
        match tag {
            Some(b"s") => Self::Shared,
            Some(b"inlineStr") => Self::Inline,
            Some(b"str") => Self::Str,
            Some(b"b") => Self::Bool,
            Some(b"e") => Self::Error,
            _ => Self::Number,
        }
    }

    fn display(self, raw: &str, shared_strings: &[String]) -> String {
        match self {
            Self::Shared => raw
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| shared_strings.get(idx))
                .cloned()
                .unwrap_or_default(),
            Self::Bool => {
                if raw.trim() == "1" || raw.trim().eq_ignore_ascii_case("true") {
                    "TRUE".to_string()
                } else {
                    "FALSE".to_string()
                }
            }
            Self::Number => format_general(raw),
            Self::Inline | Self::Str | Self::Error => raw.to_string(),
        }
    }
}

/// Render a stored number the way a "General" cell shows it: integers without
/// a fraction, other values to at most ten decimals without trailing zeros.
pub(crate) fn format_general(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(n) = trimmed.parse::<f64>() else {
        return trimmed.to_string();
    };
    if !n.is_finite() {
        return trimmed.to_string();
    }
    let magnitude = n.abs();
    if magnitude >= 1e15 || (magnitude < 1e-9 && magnitude > 0.0) {
        return format!("{n:e}");
    }
    if n.fract() == 0.0 {
        return format!("{n:.0}");
    }
    let fixed = format!("{n:.10}");
    fixed
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Parse an `.xlsx` workbook into a [`SheetModel`].
///
/// # Errors
/// Fails when the archive is unreadable, `xl/workbook.xml` is missing, or a
/// worksheet's XML is malformed.
pub fn parse_xlsx(data: &[u8]) -> Result<SheetModel> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let rels = parse_workbook_relationships(&mut archive);
    let sheets = get_sheet_info(&mut archive, &rels.worksheets)?;
    let shared_strings = parse_shared_strings(&mut archive, rels.shared_strings.as_deref());

    let mut parsed = Vec::with_capacity(sheets.len());
    for info in sheets {
        let cells = parse_sheet_cells(&mut archive, &info.path, &shared_strings)?;
        let (origin, rows) = rows_from_cells(cells);
        parsed.push((info.name, origin, rows));
    }
    tracing::debug!(
        sheets = parsed.len(),
        shared_strings = shared_strings.len(),
        "parsed xlsx workbook"
    );
    Ok(SheetModel::with_origins(parsed))
}

fn parse_workbook_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> WorkbookRelationships {
    let mut rels = WorkbookRelationships::default();

    let Ok(file) = archive.by_name("xl/_rels/workbook.xml.rels") else {
        return rels; // Relationships file is optional
    };

    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e) | Event::Start(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let id = attr_string(e, b"Id").unwrap_or_default();
                let target = attr_string(e, b"Target").unwrap_or_default();
                let rel_type = attr_string(e, b"Type").unwrap_or_default();

                // Targets are relative to xl/ unless absolute
                let full_path = match target.strip_prefix('/') {
                    Some(stripped) => stripped.to_string(),
                    None => format!("xl/{target}"),
                };

                if rel_type.ends_with("/worksheet") && !id.is_empty() && !target.is_empty() {
                    rels.worksheets.insert(id, full_path);
                } else if rel_type.ends_with("/sharedStrings") {
                    rels.shared_strings = Some(full_path);
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    rels
}

fn get_sheet_info<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    relationships: &HashMap<String, String>,
) -> Result<Vec<SheetInfo>> {
    let file = archive.by_name("xl/workbook.xml")?;
    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(true);

    let mut sheets = Vec::new();
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Empty(ref e) | Event::Start(ref e) if e.local_name().as_ref() == b"sheet" => {
                if let Some(name) = attr_string(e, b"name").filter(|n| !n.is_empty()) {
                    let r_id = attr_string_local(e, b"id").unwrap_or_default();
                    // Fall back to the conventional part name when the rel is missing
                    let path = relationships.get(&r_id).cloned().unwrap_or_else(|| {
                        let idx = sheets.len() + 1;
                        format!("xl/worksheets/sheet{idx}.xml")
                    });
                    sheets.push(SheetInfo { name, path });
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

fn parse_shared_strings<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: Option<&str>,
) -> Vec<String> {
    let sst_path = path.unwrap_or("xl/sharedStrings.xml");
    let Ok(file) = archive.by_name(sst_path) else {
        return Vec::new(); // SharedStrings is optional
    };

    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(false);

    let mut strings = Vec::new();
    let mut buf = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;
    // Phonetic runs (<rPh>) are reading aids, not cell text
    let mut in_phonetic = false;

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"rPh" => in_phonetic = true,
                b"t" if in_si && !in_phonetic => in_t = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"si" => {
                strings.push(String::new());
            }
            Ok(Event::Text(ref t)) if in_t => current.push_str(&text_of(t)),
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"si" => {
                    strings.push(std::mem::take(&mut current));
                    in_si = false;
                }
                b"rPh" => in_phonetic = false,
                b"t" => in_t = false,
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    strings
}

struct PendingCell {
    row: u32,
    col: u32,
    kind: CellKind,
}

/// Read one worksheet into sparse `(row, col, text)` triples.
fn parse_sheet_cells<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
    shared_strings: &[String],
) -> Result<Vec<(u32, u32, String)>> {
    let file = archive.by_name(path)?;
    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(false);

    let mut cells = Vec::new();
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut pending: Option<PendingCell> = None;
    let mut row: u32 = 0;
    let mut seen_row = false;
    let mut next_col: u32 = 0;
    let mut in_value = false;
    let mut in_phonetic = false;

    loop {
        let event = xml.read_event_into(&mut buf)?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"row" => {
                        let explicit = attr_string(e, b"r")
                            .and_then(|r| r.parse::<u32>().ok())
                            .filter(|&r| r > 0);
                        row = match explicit {
                            Some(r) => r - 1,
                            None if seen_row => row.saturating_add(1),
                            None => 0,
                        };
                        seen_row = true;
                        next_col = 0;
                    }
                    b"c" => {
                        // Cells without `r` continue from the previous one
                        let (col, cell_row) = attr_bytes(e, b"r")
                            .and_then(|r| parse_cell_ref(&r))
                            .unwrap_or((next_col, row));
                        next_col = col.saturating_add(1);
                        if !is_empty {
                            let kind = CellKind::from_tag(attr_bytes(e, b"t").as_deref());
                            pending = Some(PendingCell {
                                row: cell_row,
                                col,
                                kind,
                            });
                            text.clear();
                        }
                    }
                    b"rPh" if !is_empty => in_phonetic = true,
                    b"v" | b"t" if pending.is_some() && !is_empty && !in_phonetic => {
                        in_value = true;
                    }
                    _ => {}
                }
            }
            Event::Text(ref t) if in_value => text.push_str(&text_of(t)),
            Event::CData(ref t) if in_value => {
                text.push_str(&String::from_utf8_lossy(t.as_ref()));
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"rPh" => in_phonetic = false,
                b"c" => {
                    if let Some(cell) = pending.take() {
                        let display = cell.kind.display(&text, shared_strings);
                        cells.push((cell.row, cell.col, display));
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(cells)
}
