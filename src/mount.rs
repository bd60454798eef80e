//! Containers the panel renders into.
//!
//! Everything the crate builds itself (placeholders, error views, sheet
//! tables, search frame, status banner) is described as a [`ViewNode`] tree
//! and handed to a [`MountPoint`], which materializes it. On wasm32 the mount
//! point is a DOM element (`web::DomMount`); [`MemoryMount`] keeps the tree in
//! memory for native hosts, the CLI and tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::style::StyleSheet;

/// Measured size of a container in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// User intents wired to clickable nodes. The mount forwards them to the
/// controller, which is the only component allowed to act on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Abandon the preview and show the web search for the current file.
    SwitchToSearch,
    /// Show the sheet at this index without re-parsing the workbook.
    SelectSheet(usize),
    /// Copy the visible text of the rendered content.
    CopyText,
}

impl Action {
    /// Compact form stored on DOM nodes (`data-docpanel-action`).
    #[must_use]
    pub fn to_attr(self) -> String {
        match self {
            Self::SwitchToSearch => "search".to_string(),
            Self::SelectSheet(index) => format!("sheet:{index}"),
            Self::CopyText => "copy".to_string(),
        }
    }

    #[must_use]
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "search" => Some(Self::SwitchToSearch),
            "copy" => Some(Self::CopyText),
            other => other
                .strip_prefix("sheet:")
                .and_then(|index| index.parse().ok())
                .map(Self::SelectSheet),
        }
    }
}

/// Declarative description of a DOM subtree.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewNode {
    Text(String),
    Element(Element),
}

/// A single element with its attributes, children and optional click action.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: &'static str,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<ViewNode>,
    pub on_click: Option<Action>,
}

impl Element {
    #[must_use]
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            classes: Vec::new(),
            attrs: Vec::new(),
            children: Vec::new(),
            on_click: None,
        }
    }

    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    #[must_use]
    pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attrs.push((key.to_string(), value.into()));
        self
    }

    #[must_use]
    pub fn child(mut self, node: impl Into<ViewNode>) -> Self {
        self.children.push(node.into());
        self
    }

    #[must_use]
    pub fn children(mut self, nodes: impl IntoIterator<Item = ViewNode>) -> Self {
        self.children.extend(nodes);
        self
    }

    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(ViewNode::Text(text.into()))
    }

    #[must_use]
    pub fn on_click(mut self, action: Action) -> Self {
        self.on_click = Some(action);
        self
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

impl From<Element> for ViewNode {
    fn from(element: Element) -> Self {
        ViewNode::Element(element)
    }
}

/// Shorthand for `Element::new(tag)`.
#[must_use]
pub fn el(tag: &'static str) -> Element {
    Element::new(tag)
}

const BLOCK_TAGS: &[&str] = &[
    "div", "p", "section", "article", "header", "footer", "table", "thead", "tbody", "h1", "h2",
    "h3", "h4", "h5", "h6", "li", "ul", "ol", "nav",
];

/// Tags whose content is never part of the human-visible text.
const INVISIBLE_TAGS: &[&str] = &["style", "script", "iframe", "template"];

impl ViewNode {
    /// Human-visible text, laid out roughly the way `innerText` does:
    /// block elements end lines, table cells are tab separated.
    #[must_use]
    pub fn visible_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out);
        normalize_text(&out)
    }

    pub(crate) fn write_text(&self, out: &mut String) {
        match self {
            ViewNode::Text(text) => out.push_str(text),
            ViewNode::Element(element) => {
                if INVISIBLE_TAGS.contains(&element.tag) || element.get_attr("hidden").is_some() {
                    return;
                }
                match element.tag {
                    "br" => out.push('\n'),
                    "tr" => {
                        let cells: Vec<String> = element
                            .children
                            .iter()
                            .map(|cell| {
                                let mut text = String::new();
                                cell.write_text(&mut text);
                                text.replace('\n', " ").trim().to_string()
                            })
                            .collect();
                        end_line(out);
                        out.push_str(&cells.join("\t"));
                        out.push('\n');
                    }
                    tag => {
                        let block = BLOCK_TAGS.contains(&tag);
                        if block {
                            end_line(out);
                        }
                        for child in &element.children {
                            child.write_text(out);
                        }
                        if block {
                            end_line(out);
                        }
                    }
                }
            }
        }
    }

    /// Depth-first list of the click actions wired in this subtree.
    #[must_use]
    pub fn actions(&self) -> Vec<Action> {
        let mut found = Vec::new();
        self.collect_actions(&mut found);
        found
    }

    fn collect_actions(&self, found: &mut Vec<Action>) {
        if let ViewNode::Element(element) = self {
            if let Some(action) = element.on_click {
                found.push(action);
            }
            for child in &element.children {
                child.collect_actions(found);
            }
        }
    }

    /// Depth-first search for the first element carrying `class`.
    #[must_use]
    pub fn find_class(&self, class: &str) -> Option<&Element> {
        let ViewNode::Element(element) = self else {
            return None;
        };
        if element.has_class(class) {
            return Some(element);
        }
        element
            .children
            .iter()
            .find_map(|child| child.find_class(class))
    }
}

fn end_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Trim trailing spaces on each line, drop blank lines at both ends and
/// collapse runs of blank lines.
pub(crate) fn normalize_text(raw: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut blank_run = false;
    for line in raw.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            if !lines.is_empty() && !blank_run {
                lines.push("");
            }
            blank_run = true;
        } else {
            lines.push(line);
            blank_run = false;
        }
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// A container the controller and render procedures write into.
///
/// Clones are handles to the same container.
pub trait MountPoint: Clone + 'static {
    /// A detached container sized like this one. Render procedures fill a
    /// staged container; the controller attaches it when the render commits.
    fn stage(&self) -> Self;

    /// Measured size of the container (its size hint when detached).
    fn size(&self) -> Size;

    /// Width of the viewing surface, for the narrow-layout breakpoint.
    fn viewport_width(&self) -> f64;

    /// Remove every child.
    fn clear(&self);

    /// Materialize `node` as the last child.
    fn append(&self, node: &ViewNode);

    /// Create an empty child container and return a handle to it.
    fn append_container(&self, class: &str) -> Self;

    /// Make `content` the only child of this container.
    fn replace_children(&self, content: &Self);

    /// Remove this container from its parent, if attached.
    fn detach(&self);

    /// Human-visible text of the subtree.
    fn visible_text(&self) -> String;

    /// Install (or replace, by [`StyleSheet::key`]) a style sheet scoped to
    /// this container.
    fn apply_styles(&self, styles: &StyleSheet);

    /// Number of direct children.
    fn child_count(&self) -> usize;
}

#[derive(Debug, Clone)]
enum MemoryChild {
    Node(ViewNode),
    Container(Rc<RefCell<MemoryContainer>>),
}

#[derive(Debug)]
struct MemoryContainer {
    class: String,
    children: Vec<MemoryChild>,
    parent: Weak<RefCell<MemoryContainer>>,
    styles: BTreeMap<&'static str, StyleSheet>,
    size: Size,
    viewport_width: f64,
}

impl MemoryContainer {
    fn new(class: &str, size: Size, viewport_width: f64) -> Self {
        Self {
            class: class.to_string(),
            children: Vec::new(),
            parent: Weak::new(),
            styles: BTreeMap::new(),
            size,
            viewport_width,
        }
    }

    fn write_text(&self, out: &mut String) {
        end_line(out);
        for child in &self.children {
            match child {
                MemoryChild::Node(node) => node.write_text(out),
                MemoryChild::Container(inner) => inner.borrow().write_text(out),
            }
        }
        end_line(out);
    }

    fn snapshot(&self) -> ViewNode {
        let mut element = el("div").class(&self.class);
        for child in &self.children {
            element = element.child(match child {
                MemoryChild::Node(node) => node.clone(),
                MemoryChild::Container(inner) => inner.borrow().snapshot(),
            });
        }
        element.into()
    }
}

/// In-memory [`MountPoint`] used by native hosts, the CLI and tests.
#[derive(Debug, Clone)]
pub struct MemoryMount(Rc<RefCell<MemoryContainer>>);

impl MemoryMount {
    /// A root container of the given size on a surface `viewport_width` wide.
    #[must_use]
    pub fn new(size: Size, viewport_width: f64) -> Self {
        Self(Rc::new(RefCell::new(MemoryContainer::new(
            "docpanel-root",
            size,
            viewport_width,
        ))))
    }

    /// The whole subtree as a single `div` node, for assertions.
    #[must_use]
    pub fn snapshot(&self) -> ViewNode {
        self.0.borrow().snapshot()
    }

    /// Click actions currently reachable in the subtree.
    #[must_use]
    pub fn actions(&self) -> Vec<Action> {
        self.snapshot().actions()
    }

    /// Keys of the style sheets installed on this container.
    #[must_use]
    pub fn style_keys(&self) -> Vec<&'static str> {
        self.0.borrow().styles.keys().copied().collect()
    }

    /// The installed sheet for `key`, if any.
    #[must_use]
    pub fn styles(&self, key: &str) -> Option<StyleSheet> {
        self.0.borrow().styles.get(key).cloned()
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.0.borrow().parent.upgrade().is_some()
    }

    /// Whether both handles point at the same container.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl MountPoint for MemoryMount {
    fn stage(&self) -> Self {
        let (size, viewport_width) = {
            let inner = self.0.borrow();
            (inner.size, inner.viewport_width)
        };
        Self(Rc::new(RefCell::new(MemoryContainer::new(
            "docpanel-stage",
            size,
            viewport_width,
        ))))
    }

    fn size(&self) -> Size {
        self.0.borrow().size
    }

    fn viewport_width(&self) -> f64 {
        self.0.borrow().viewport_width
    }

    fn clear(&self) {
        let children = std::mem::take(&mut self.0.borrow_mut().children);
        for child in children {
            if let MemoryChild::Container(inner) = child {
                inner.borrow_mut().parent = Weak::new();
            }
        }
    }

    fn append(&self, node: &ViewNode) {
        self.0
            .borrow_mut()
            .children
            .push(MemoryChild::Node(node.clone()));
    }

    fn append_container(&self, class: &str) -> Self {
        let (size, viewport_width) = {
            let inner = self.0.borrow();
            (inner.size, inner.viewport_width)
        };
        let child = Rc::new(RefCell::new(MemoryContainer::new(
            class,
            size,
            viewport_width,
        )));
        child.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0
            .borrow_mut()
            .children
            .push(MemoryChild::Container(Rc::clone(&child)));
        Self(child)
    }

    fn replace_children(&self, content: &Self) {
        content.detach();
        self.clear();
        content.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0
            .borrow_mut()
            .children
            .push(MemoryChild::Container(Rc::clone(&content.0)));
    }

    fn detach(&self) {
        let parent = self.0.borrow().parent.upgrade();
        if let Some(parent) = parent {
            parent.borrow_mut().children.retain(|child| match child {
                MemoryChild::Container(inner) => !Rc::ptr_eq(inner, &self.0),
                MemoryChild::Node(_) => true,
            });
        }
        self.0.borrow_mut().parent = Weak::new();
    }

    fn visible_text(&self) -> String {
        let mut out = String::new();
        self.0.borrow().write_text(&mut out);
        normalize_text(&out)
    }

    fn apply_styles(&self, styles: &StyleSheet) {
        self.0
            .borrow_mut()
            .styles
            .insert(styles.key(), styles.clone());
    }

    fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }
}
