//! Text outlines of word documents and slide decks.
//!
//! Outside a browser there is no `docx-preview` or `pptx-preview`; these
//! renderers read the OOXML parts directly and mount the text structure
//! (paragraphs, headings, tables, one section per slide) so the CLI and
//! native hosts run the same pipeline.

use std::cell::Cell;
use std::io::{Cursor, Read, Seek};

use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;
use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::{PanelError, Result};
use crate::mount::{el, Element, MountPoint, ViewNode};
use crate::pipeline::{SlideOptions, SlidePreviewer, SlideRenderer, WordRenderer};
use crate::xml_helpers::{attr_string, attr_string_local, text_of};

/// [`WordRenderer`] that mounts the paragraphs and tables of
/// `word/document.xml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxOutline;

impl<M: MountPoint> WordRenderer<M> for DocxOutline {
    fn render(&self, bytes: Vec<u8>, container: M) -> LocalBoxFuture<'static, Result<()>> {
        let result = parse_docx(&bytes).map(|blocks| {
            let page = el("section").class("docx").children(blocks);
            container.append(&el("div").class("docx-wrapper").child(page).into());
        });
        future::ready(result.map_err(into_render)).boxed_local()
    }
}

/// [`SlideRenderer`] whose previewers mount one section of text per slide.
#[derive(Debug, Clone, Copy, Default)]
pub struct PptxOutline;

impl<M: MountPoint> SlideRenderer<M> for PptxOutline {
    fn create(&self, container: &M, options: SlideOptions) -> Result<Box<dyn SlidePreviewer>> {
        Ok(Box::new(OutlinePreviewer {
            container: container.clone(),
            options,
            destroyed: Cell::new(false),
        }))
    }
}

struct OutlinePreviewer<M: MountPoint> {
    container: M,
    options: SlideOptions,
    destroyed: Cell<bool>,
}

impl<M: MountPoint> SlidePreviewer for OutlinePreviewer<M> {
    fn preview(&self, bytes: Vec<u8>) -> LocalBoxFuture<'static, Result<()>> {
        if self.destroyed.get() {
            return future::ready(Err(PanelError::Render("previewer destroyed".into())))
                .boxed_local();
        }
        let result = parse_pptx(&bytes).map(|slides| {
            let wrapper = slides.into_iter().enumerate().fold(
                el("div")
                    .class("pptx-preview-wrapper")
                    .attr("data-mode", self.options.mode.as_str()),
                |wrapper, (idx, paragraphs)| {
                    let slide = el("section")
                        .class("slide")
                        .child(el("h2").text(format!("Slide {}", idx + 1)))
                        .children(
                            paragraphs
                                .into_iter()
                                .map(|text| ViewNode::from(el("p").text(text))),
                        );
                    wrapper.child(slide)
                },
            );
            self.container.append(&wrapper.into());
        });
        future::ready(result.map_err(into_render)).boxed_local()
    }

    fn destroy(&self) {
        self.destroyed.set(true);
    }
}

fn into_render(error: PanelError) -> PanelError {
    match error {
        PanelError::Render(_) => error,
        other => PanelError::Render(other.to_string()),
    }
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let mut file = archive.by_name(name)?;
    let mut xml = String::new();
    file.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Heading level from a `w:pStyle` value like `Heading2` or `Title`.
fn heading_level(style: &str) -> Option<u8> {
    if style.eq_ignore_ascii_case("title") {
        return Some(1);
    }
    let digits = style
        .strip_prefix("Heading")
        .or_else(|| style.strip_prefix("heading"))?;
    digits.parse::<u8>().ok().filter(|level| (1..=6).contains(level))
}

fn heading_tag(level: u8) -> &'static str {
    match level {
        1 => "h1",
        2 => "h2",
        3 => "h3",
        4 => "h4",
        5 => "h5",
        _ => "h6",
    }
}

#[derive(Default)]
struct ParagraphBuilder {
    text: String,
    heading: Option<u8>,
}

impl ParagraphBuilder {
    fn finish(self) -> Element {
        let tag = self.heading.map_or("p", heading_tag);
        el(tag).text(self.text)
    }
}

/// Blocks of `word/document.xml` in document order.
fn parse_docx(bytes: &[u8]) -> Result<Vec<ViewNode>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let document = read_part(&mut archive, "word/document.xml")?;

    let mut xml = Reader::from_str(&document);
    xml.trim_text(false);
    let mut buf = Vec::new();

    let mut blocks: Vec<ViewNode> = Vec::new();
    // Open tables, innermost last. Each holds finished rows plus the row and
    // cell being built.
    let mut tables: Vec<(Element, Option<Element>, Option<String>)> = Vec::new();
    let mut paragraph: Option<ParagraphBuilder> = None;
    let mut in_text = false;
    let mut in_tab_stops = false;

    loop {
        let event = xml.read_event_into(&mut buf)?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"tbl" if !is_empty => tables.push((el("table"), None, None)),
                    b"tr" if !is_empty => {
                        if let Some(table) = tables.last_mut() {
                            table.1 = Some(el("tr"));
                        }
                    }
                    b"tc" if !is_empty => {
                        if let Some(table) = tables.last_mut() {
                            table.2 = Some(String::new());
                        }
                    }
                    b"p" if !is_empty => paragraph = Some(ParagraphBuilder::default()),
                    b"pStyle" => {
                        if let Some(p) = paragraph.as_mut() {
                            p.heading = attr_string_local(e, b"val")
                                .as_deref()
                                .and_then(heading_level);
                        }
                    }
                    b"t" if !is_empty => in_text = true,
                    b"tabs" if !is_empty => in_tab_stops = true,
                    b"tab" if !in_tab_stops => {
                        if let Some(p) = paragraph.as_mut() {
                            p.text.push('\t');
                        }
                    }
                    b"br" | b"cr" => {
                        if let Some(p) = paragraph.as_mut() {
                            p.text.push('\n');
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(ref t) if in_text => {
                if let Some(p) = paragraph.as_mut() {
                    p.text.push_str(&text_of(t));
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"tabs" => in_tab_stops = false,
                b"p" => {
                    if let Some(p) = paragraph.take() {
                        match tables.last_mut().and_then(|table| table.2.as_mut()) {
                            Some(cell) => {
                                if !cell.is_empty() && !p.text.is_empty() {
                                    cell.push(' ');
                                }
                                cell.push_str(&p.text);
                            }
                            None if !p.text.trim().is_empty() => blocks.push(p.finish().into()),
                            None => {}
                        }
                    }
                }
                b"tc" => {
                    if let Some((_, Some(row), cell)) = tables.last_mut() {
                        let text = cell.take().unwrap_or_default();
                        *row = std::mem::replace(row, el("tr")).child(el("td").text(text));
                    }
                }
                b"tr" => {
                    if let Some((table, row, _)) = tables.last_mut() {
                        if let Some(row) = row.take() {
                            *table = std::mem::replace(table, el("table")).child(row);
                        }
                    }
                }
                b"tbl" => {
                    if let Some((table, _, _)) = tables.pop() {
                        // Nested tables flatten into their parent cell's text
                        match tables.last_mut().and_then(|parent| parent.2.as_mut()) {
                            Some(cell) => {
                                let text = ViewNode::from(table).visible_text();
                                cell.push_str(&text.replace(['\n', '\t'], " "));
                            }
                            None => blocks.push(table.into()),
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(blocks)
}

/// Slide part names in presentation order.
fn slide_parts<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
    let mut targets = std::collections::HashMap::new();
    if let Ok(rels) = read_part(archive, "ppt/_rels/presentation.xml.rels") {
        let mut xml = Reader::from_str(&rels);
        let mut buf = Vec::new();
        loop {
            match xml.read_event_into(&mut buf)? {
                Event::Start(ref e) | Event::Empty(ref e)
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    if let (Some(id), Some(target)) =
                        (attr_string(e, b"Id"), attr_string(e, b"Target"))
                    {
                        let path = match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("ppt/{target}"),
                        };
                        targets.insert(id, path);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
    }

    let presentation = read_part(archive, "ppt/presentation.xml")?;
    let mut xml = Reader::from_str(&presentation);
    let mut buf = Vec::new();
    let mut parts = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"sldId" => {
                if let Some(path) =
                    attr_string_local(e, b"id").and_then(|id| targets.get(&id).cloned())
                {
                    parts.push(path);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if parts.is_empty() {
        // No usable slide list: fall back to slideN.xml in numeric order
        let mut numbered: Vec<(u32, String)> = archive
            .file_names()
            .filter_map(|name| {
                let n = name
                    .strip_prefix("ppt/slides/slide")?
                    .strip_suffix(".xml")?
                    .parse::<u32>()
                    .ok()?;
                Some((n, name.to_string()))
            })
            .collect();
        numbered.sort_unstable();
        parts = numbered.into_iter().map(|(_, name)| name).collect();
    }
    Ok(parts)
}

/// Non-empty paragraphs of each slide.
fn parse_pptx(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let parts = slide_parts(&mut archive)?;
    if parts.is_empty() {
        return Err(PanelError::Render("presentation has no slides".into()));
    }

    let mut slides = Vec::with_capacity(parts.len());
    for part in parts {
        let slide = read_part(&mut archive, &part)?;
        let mut xml = Reader::from_str(&slide);
        let mut buf = Vec::new();
        let mut paragraphs = Vec::new();
        let mut current = String::new();
        let mut in_text = false;
        loop {
            match xml.read_event_into(&mut buf)? {
                Event::Start(ref e) if e.local_name().as_ref() == b"t" => in_text = true,
                Event::Empty(ref e) if e.local_name().as_ref() == b"br" => current.push('\n'),
                Event::Text(ref t) if in_text => current.push_str(&text_of(t)),
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"t" => in_text = false,
                    b"p" => {
                        let text = std::mem::take(&mut current);
                        if !text.trim().is_empty() {
                            paragraphs.push(text);
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        slides.push(paragraphs);
    }
    tracing::debug!(slides = slides.len(), "outlined presentation");
    Ok(slides)
}
