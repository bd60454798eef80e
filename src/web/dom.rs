//! DOM-backed [`MountPoint`].

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, Node};

use crate::mount::{Action, MountPoint, Size, ViewNode};
use crate::search::{SEARCH_FAILED_TEXT, SEARCH_STATUS_CLASS};
use crate::style::{StyleSheet, SCOPE_ATTR};

/// Attribute carrying an encoded [`Action`] on clickable nodes.
pub const ACTION_ATTR: &str = "data-docpanel-action";
/// Attribute naming the style sheet a `<style>` element holds.
pub const STYLE_KEY_ATTR: &str = "data-docpanel-style";

thread_local! {
    static NEXT_SCOPE: Cell<u32> = const { Cell::new(0) };
}

fn next_scope() -> String {
    NEXT_SCOPE.with(|next| {
        let id = next.get();
        next.set(id.wrapping_add(1));
        format!("s{id}")
    })
}

/// State shared by a panel root and every container derived from it.
#[derive(Default)]
struct MountHooks {
    dispatch: RefCell<Option<Rc<dyn Fn(Action)>>>,
    click: RefCell<Option<Closure<dyn FnMut(Event)>>>,
}

/// A container element. Clicks anywhere under the panel root are delegated
/// to a single listener that decodes [`ACTION_ATTR`] and forwards the action
/// to the dispatcher.
#[derive(Clone)]
pub struct DomMount {
    element: HtmlElement,
    document: Document,
    size_hint: Size,
    hooks: Rc<MountHooks>,
}

impl fmt::Debug for DomMount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomMount")
            .field("class", &self.element.class_name())
            .field("size_hint", &self.size_hint)
            .finish_non_exhaustive()
    }
}

impl DomMount {
    /// Take over `element` as the panel root.
    ///
    /// # Errors
    /// Fails when the element is not in a document or the click listener
    /// cannot be registered.
    pub fn new(element: HtmlElement) -> Result<Self, JsValue> {
        let document = element
            .owner_document()
            .ok_or_else(|| JsValue::from_str("container is not in a document"))?;
        let hooks = Rc::new(MountHooks::default());

        let weak: Weak<MountHooks> = Rc::downgrade(&hooks);
        let closure = Closure::wrap(Box::new(move |event: Event| {
            let Some(action) = action_for(&event) else {
                return;
            };
            let Some(hooks) = weak.upgrade() else {
                return;
            };
            let dispatch = hooks.dispatch.borrow().clone();
            if let Some(dispatch) = dispatch {
                event.prevent_default();
                dispatch(action);
            }
        }) as Box<dyn FnMut(Event)>);
        element.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        *hooks.click.borrow_mut() = Some(closure);

        let mount = Self {
            size_hint: Size::default(),
            element,
            document,
            hooks,
        };
        Ok(Self {
            size_hint: mount.size(),
            ..mount
        })
    }

    /// Route clicks on action nodes to `dispatch`.
    pub fn set_dispatcher(&self, dispatch: Rc<dyn Fn(Action)>) {
        *self.hooks.dispatch.borrow_mut() = Some(dispatch);
    }

    /// Drop the dispatcher and unregister the click listener.
    pub fn release(&self) {
        self.hooks.dispatch.borrow_mut().take();
        if let Some(closure) = self.hooks.click.borrow_mut().take() {
            let _ = self
                .element
                .remove_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        }
    }

    #[must_use]
    pub fn element(&self) -> &HtmlElement {
        &self.element
    }

    fn derived(&self, element: HtmlElement) -> Self {
        Self {
            element,
            document: self.document.clone(),
            size_hint: self.size(),
            hooks: Rc::clone(&self.hooks),
        }
    }

    fn create_div(&self, class: &str) -> Option<HtmlElement> {
        let div = self
            .document
            .create_element("div")
            .ok()?
            .dyn_into::<HtmlElement>()
            .ok()?;
        div.set_class_name(class);
        Some(div)
    }

    fn build(&self, node: &ViewNode) -> Result<Node, JsValue> {
        match node {
            ViewNode::Text(text) => Ok(self.document.create_text_node(text).into()),
            ViewNode::Element(desc) => {
                let element = self.document.create_element(desc.tag)?;
                if !desc.classes.is_empty() {
                    element.set_class_name(&desc.classes.join(" "));
                }
                for (key, value) in &desc.attrs {
                    element.set_attribute(key, value)?;
                }
                if let Some(action) = desc.on_click {
                    element.set_attribute(ACTION_ATTR, &action.to_attr())?;
                }
                for child in &desc.children {
                    element.append_child(&self.build(child)?)?;
                }
                if desc.tag == "iframe" {
                    watch_search_frame(&element)?;
                }
                Ok(element.into())
            }
        }
    }

    fn is_style_node(node: &Node) -> bool {
        node.dyn_ref::<Element>()
            .is_some_and(|element| element.has_attribute(STYLE_KEY_ATTR))
    }

    fn scope(&self) -> String {
        if let Some(scope) = self.element.get_attribute(SCOPE_ATTR) {
            return scope;
        }
        let scope = next_scope();
        let _ = self.element.set_attribute(SCOPE_ATTR, &scope);
        scope
    }
}

fn action_for(event: &Event) -> Option<Action> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let source = target.closest(&format!("[{ACTION_ATTR}]")).ok()??;
    Action::from_attr(&source.get_attribute(ACTION_ATTR)?)
}

/// Drop the loading notice once the frame loads; replace it with the
/// failure text if the frame errors.
fn watch_search_frame(frame: &Element) -> Result<(), JsValue> {
    let status_of = |frame: &Element| -> Option<Element> {
        frame
            .parent_element()?
            .query_selector(&format!(".{SEARCH_STATUS_CLASS}"))
            .ok()?
    };

    let loaded = frame.clone();
    let on_load = Closure::once_into_js(move || {
        if let Some(status) = status_of(&loaded) {
            status.remove();
        }
    });
    frame.add_event_listener_with_callback("load", on_load.unchecked_ref())?;

    let failed = frame.clone();
    let on_error = Closure::once_into_js(move || {
        if let Some(status) = status_of(&failed) {
            status.set_text_content(Some(SEARCH_FAILED_TEXT));
        }
        tracing::warn!("search frame failed to load");
    });
    frame.add_event_listener_with_callback("error", on_error.unchecked_ref())?;
    Ok(())
}

impl MountPoint for DomMount {
    fn stage(&self) -> Self {
        match self.create_div("docpanel-content") {
            Some(div) => self.derived(div),
            None => self.clone(),
        }
    }

    fn size(&self) -> Size {
        if self.element.is_connected() {
            Size::new(
                f64::from(self.element.client_width()),
                f64::from(self.element.client_height()),
            )
        } else {
            self.size_hint
        }
    }

    fn viewport_width(&self) -> f64 {
        web_sys::window()
            .and_then(|window| window.inner_width().ok())
            .and_then(|width| width.as_f64())
            .unwrap_or(0.0)
    }

    /// Removes content children; installed `<style>` elements stay.
    fn clear(&self) {
        let children = self.element.child_nodes();
        for idx in (0..children.length()).rev() {
            if let Some(child) = children.item(idx) {
                if !Self::is_style_node(&child) {
                    let _ = self.element.remove_child(&child);
                }
            }
        }
    }

    fn append(&self, node: &ViewNode) {
        match self.build(node) {
            Ok(built) => {
                let _ = self.element.append_child(&built);
            }
            Err(error) => tracing::error!(?error, "failed to build view node"),
        }
    }

    fn append_container(&self, class: &str) -> Self {
        let Some(div) = self.create_div(class) else {
            return self.clone();
        };
        let _ = self.element.append_child(&div);
        self.derived(div)
    }

    fn replace_children(&self, content: &Self) {
        content.detach();
        self.clear();
        let _ = self.element.append_child(&content.element);
    }

    fn detach(&self) {
        self.element.remove();
    }

    fn visible_text(&self) -> String {
        crate::mount::normalize_text(&self.element.inner_text())
    }

    fn apply_styles(&self, styles: &StyleSheet) {
        let css = styles.to_css(&self.scope());
        let selector = format!(":scope > style[{STYLE_KEY_ATTR}=\"{}\"]", styles.key());
        if let Ok(Some(existing)) = self.element.query_selector(&selector) {
            existing.set_text_content(Some(&css));
            return;
        }
        let Ok(style) = self.document.create_element("style") else {
            return;
        };
        let _ = style.set_attribute(STYLE_KEY_ATTR, styles.key());
        style.set_text_content(Some(&css));
        let _ = self.element.prepend_with_node_1(&style);
    }

    fn child_count(&self) -> usize {
        let children = self.element.child_nodes();
        (0..children.length())
            .filter_map(|idx| children.item(idx))
            .filter(|child| !Self::is_style_node(child))
            .count()
    }
}
