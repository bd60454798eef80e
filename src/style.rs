//! Declarative, container-scoped styles.
//!
//! Each capability gets one [`StyleSheet`] chosen by [`Breakpoint`]; a single
//! style step applies it to the container that owns the content. Sheets are
//! rendered to CSS under the container's scope attribute, so two open panels
//! never see each other's rules and re-applying a sheet replaces it.

use crate::router::RenderCapability;

/// Attribute carrying the per-container scope id.
pub const SCOPE_ATTR: &str = "data-docpanel-scope";

/// Responsive layout flag derived from the viewing surface width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breakpoint {
    Wide,
    Narrow,
}

impl Breakpoint {
    #[must_use]
    pub fn for_width(width: f64, narrow_px: f64) -> Self {
        if width > 0.0 && width <= narrow_px {
            Self::Narrow
        } else {
            Self::Wide
        }
    }
}

/// One selector and its declarations. `&` stands for the scoped container.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    pub selector: String,
    pub declarations: Vec<(&'static str, String)>,
}

impl StyleRule {
    #[must_use]
    pub fn new(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            declarations: Vec::new(),
        }
    }

    #[must_use]
    pub fn set(mut self, property: &'static str, value: impl Into<String>) -> Self {
        self.declarations.push((property, value.into()));
        self
    }

    /// Value declared for `property`, if any.
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v.as_str())
    }
}

/// A keyed set of rules. Installing a sheet with a key the container already
/// holds replaces the old one.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    key: &'static str,
    rules: Vec<StyleRule>,
}

impl StyleSheet {
    #[must_use]
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            rules: Vec::new(),
        }
    }

    #[must_use]
    pub fn rule(mut self, rule: StyleRule) -> Self {
        self.rules.push(rule);
        self
    }

    #[must_use]
    pub fn key(&self) -> &'static str {
        self.key
    }

    #[must_use]
    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    /// First rule whose selector is exactly `selector`.
    pub fn find(&self, selector: &str) -> Option<&StyleRule> {
        self.rules.iter().find(|r| r.selector == selector)
    }

    /// Render as CSS with every selector nested under `scope`.
    #[must_use]
    pub fn to_css(&self, scope: &str) -> String {
        let root = format!("[{SCOPE_ATTR}=\"{scope}\"]");
        let mut css = String::new();
        for rule in &self.rules {
            let selector = rule
                .selector
                .split(',')
                .map(|part| {
                    let part = part.trim();
                    match part.strip_prefix('&') {
                        Some(rest) => format!("{root}{rest}"),
                        None => format!("{root} {part}"),
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");
            css.push_str(&selector);
            css.push_str(" {");
            for (property, value) in &rule.declarations {
                css.push_str(&format!(" {property}: {value};"));
            }
            css.push_str(" }\n");
        }
        css
    }
}

/// Rules for the panel chrome shared by every mode: placeholders, error
/// view, status banner, search frame.
#[must_use]
pub fn panel_styles() -> StyleSheet {
    StyleSheet::new("panel")
        .rule(
            StyleRule::new("&")
                .set("display", "flex")
                .set("flex-direction", "column")
                .set("height", "100%")
                .set("overflow", "auto")
                .set("position", "relative"),
        )
        .rule(
            StyleRule::new(".docpanel-notice")
                .set("text-align", "center")
                .set("padding", "20px")
                .set("color", "#888888"),
        )
        .rule(StyleRule::new(".docpanel-error").set("color", "#ff4444"))
        .rule(
            StyleRule::new(".docpanel-action")
                .set("margin-top", "12px")
                .set("padding", "6px 14px")
                .set("cursor", "pointer"),
        )
        .rule(
            StyleRule::new(".docpanel-frame")
                .set("flex-grow", "1")
                .set("width", "100%")
                .set("height", "100%")
                .set("border", "0"),
        )
        .rule(
            StyleRule::new(".docpanel-status")
                .set("position", "sticky")
                .set("bottom", "12px")
                .set("align-self", "center")
                .set("padding", "6px 12px")
                .set("border-radius", "4px")
                .set("background", "rgba(0, 0, 0, 0.75)")
                .set("color", "#ffffff")
                .set("font-size", "12px"),
        )
}

fn selectable(rule: StyleRule) -> StyleRule {
    rule.set("user-select", "text !important")
        .set("-webkit-user-select", "text !important")
}

/// Word documents: selectable text; on narrow screens pages shrink to the
/// container instead of keeping their print width.
#[must_use]
pub fn word_styles(breakpoint: Breakpoint) -> StyleSheet {
    let sheet = StyleSheet::new("word").rule(selectable(StyleRule::new("&, & *")));
    match breakpoint {
        Breakpoint::Wide => sheet,
        Breakpoint::Narrow => sheet
            .rule(
                StyleRule::new(".docx-wrapper")
                    .set("padding", "0 !important")
                    .set("background", "transparent !important"),
            )
            .rule(
                StyleRule::new(".docx-wrapper > section.docx")
                    .set("width", "100% !important")
                    .set("min-height", "auto !important")
                    .set("padding", "12px !important")
                    .set("box-shadow", "none !important"),
            )
            .rule(StyleRule::new("img").set("max-width", "100% !important")),
    }
}

/// Slide decks: renderers default to non-selectable overlays.
#[must_use]
pub fn slide_styles(breakpoint: Breakpoint) -> StyleSheet {
    let sheet = StyleSheet::new("slide").rule(
        selectable(StyleRule::new("&, & *")).set("pointer-events", "auto"),
    );
    match breakpoint {
        Breakpoint::Wide => sheet,
        Breakpoint::Narrow => sheet.rule(
            StyleRule::new(".pptx-preview-wrapper")
                .set("max-width", "100% !important")
                .set("overflow-x", "auto"),
        ),
    }
}

/// Spreadsheet tabs and grid.
#[must_use]
pub fn sheet_styles(breakpoint: Breakpoint) -> StyleSheet {
    let font_size = match breakpoint {
        Breakpoint::Wide => "13px",
        Breakpoint::Narrow => "11px",
    };
    StyleSheet::new("sheet")
        .rule(
            StyleRule::new(".docpanel-tabs")
                .set("display", "flex")
                .set("gap", "1px")
                .set("padding", "4px 8px")
                .set("background", "#F3F3F3")
                .set("border-bottom", "1px solid #E0E0E0")
                .set("overflow-x", "auto")
                .set("flex-shrink", "0"),
        )
        .rule(
            StyleRule::new(".docpanel-tab")
                .set("padding", "4px 12px")
                .set("border", "none")
                .set("border-radius", "4px 4px 0 0")
                .set("cursor", "pointer")
                .set("background", "#E8E8E8")
                .set("white-space", "nowrap"),
        )
        .rule(
            StyleRule::new(".docpanel-tab.active")
                .set("background", "#FFFFFF")
                .set("font-weight", "500")
                .set("border-bottom", "2px solid #217346"),
        )
        .rule(
            selectable(StyleRule::new(".docpanel-grid"))
                .set("border-collapse", "collapse")
                .set("font-size", font_size),
        )
        .rule(
            StyleRule::new(".docpanel-grid th, .docpanel-grid td")
                .set("border", "1px solid #E0E0E0")
                .set("padding", "2px 6px")
                .set("white-space", "nowrap"),
        )
        .rule(
            StyleRule::new(".docpanel-grid th, .docpanel-grid .row-number")
                .set("background", "#F3F3F3")
                .set("color", "#666666")
                .set("text-align", "center"),
        )
        .rule(
            StyleRule::new(".docpanel-summary")
                .set("padding", "6px 8px")
                .set("color", "#888888"),
        )
}

/// The single style step for a capability.
#[must_use]
pub fn for_capability(capability: RenderCapability, breakpoint: Breakpoint) -> Option<StyleSheet> {
    match capability {
        RenderCapability::WordPreview => Some(word_styles(breakpoint)),
        RenderCapability::SlidePreview => Some(slide_styles(breakpoint)),
        RenderCapability::SheetPreview => Some(sheet_styles(breakpoint)),
        RenderCapability::SearchOnly => None,
    }
}
