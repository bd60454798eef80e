//! Browser host: the [`DocPanel`] facade and the DOM-side collaborators.
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { DocPanel } from 'docpanel';
//! await init();
//! const panel = new DocPanel(container, { sheet_auto_fallback: false });
//! panel.open();
//! panel.retarget(file.name, file.path, () => file.arrayBuffer());
//! ```

mod bindings;
mod clipboard;
mod dom;
mod runtime;

use std::rc::Rc;

use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

pub use bindings::{DocxPreview, PptxPreview};
pub use clipboard::{LegacyClipboard, SecureClipboard};
pub use dom::{DomMount, ACTION_ATTR, STYLE_KEY_ATTR};
pub use runtime::{JsByteSource, WasmSpawner, WasmTimer};

use crate::clipboard::ClipboardStrategy;
use crate::config::PanelConfig;
use crate::controller::{PanelServices, ViewStateController};
use crate::mount::Action;
use crate::router::{self, RenderCapability};
use crate::sheet::OfficeWorkbookParser;
use crate::target::TargetFile;

/// A preview panel bound to a container element.
#[wasm_bindgen]
pub struct DocPanel {
    controller: ViewStateController<DomMount>,
    mount: DomMount,
}

#[wasm_bindgen]
impl DocPanel {
    /// Create a panel inside `container`. `config` is an optional object of
    /// [`PanelConfig`] overrides.
    ///
    /// # Errors
    /// Returns an error for an invalid config or a detached container.
    #[wasm_bindgen(constructor)]
    pub fn new(container: HtmlElement, config: JsValue) -> Result<DocPanel, JsValue> {
        console_error_panic_hook::set_once();

        let config: PanelConfig = if config.is_undefined() || config.is_null() {
            PanelConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        config.validate()?;

        let mount = DomMount::new(container)?;
        let clipboard: Vec<Rc<dyn ClipboardStrategy>> =
            vec![Rc::new(SecureClipboard), Rc::new(LegacyClipboard)];
        let services = PanelServices::new(
            config,
            Rc::new(WasmSpawner),
            Rc::new(WasmTimer),
            Rc::new(DocxPreview),
            Rc::new(PptxPreview),
            Rc::new(OfficeWorkbookParser),
            clipboard,
        );
        let controller = ViewStateController::new(mount.clone(), services);

        let dispatch_to = controller.clone();
        mount.set_dispatcher(Rc::new(move |action: Action| {
            if let Err(error) = dispatch_to.handle(action) {
                tracing::warn!(%error, ?action, "action ignored");
            }
        }));

        Ok(Self { controller, mount })
    }

    /// Install the panel and render any file handed over before opening.
    ///
    /// # Errors
    /// Fails after [`close`](Self::close).
    pub fn open(&self) -> Result<(), JsValue> {
        Ok(self.controller.open()?)
    }

    /// Show a file. `loader` returns the file's bytes (an `ArrayBuffer`,
    /// a typed array, or a promise of either).
    ///
    /// # Errors
    /// Fails after [`close`](Self::close).
    pub fn retarget(
        &self,
        name: String,
        path: Option<String>,
        loader: Function,
    ) -> Result<(), JsValue> {
        let file = TargetFile::new(name, path, Rc::new(JsByteSource::new(loader)));
        Ok(self.controller.retarget(file)?)
    }

    /// Show the web search for a file regardless of its type.
    ///
    /// # Errors
    /// Fails after [`close`](Self::close).
    #[wasm_bindgen(js_name = searchFor)]
    pub fn search_for(
        &self,
        name: String,
        path: Option<String>,
        loader: Function,
    ) -> Result<(), JsValue> {
        let file = TargetFile::new(name, path, Rc::new(JsByteSource::new(loader)));
        Ok(self
            .controller
            .retarget_forced(file, RenderCapability::SearchOnly)?)
    }

    /// Copy the visible text. Resolves to the status message shown.
    ///
    /// # Errors
    /// Fails after [`close`](Self::close).
    #[wasm_bindgen(js_name = copyVisibleText)]
    pub fn copy_visible_text(&self) -> Result<Promise, JsValue> {
        let copy = self.controller.copy_visible_text()?;
        Ok(wasm_bindgen_futures::future_to_promise(async move {
            Ok(JsValue::from_str(copy.await.status_text()))
        }))
    }

    /// Release the content and any live renderer.
    ///
    /// # Errors
    /// Fails when already closed.
    pub fn close(&self) -> Result<(), JsValue> {
        self.mount.release();
        Ok(self.controller.close()?)
    }

    #[must_use]
    pub fn title(&self) -> String {
        self.controller.title()
    }

    #[must_use]
    pub fn icon(&self) -> String {
        self.controller.icon().to_string()
    }

    /// `idle`, `loading`, `rendered`, `error`, or `closed` once closed.
    #[must_use]
    pub fn state(&self) -> String {
        self.controller.state().as_str().to_string()
    }

    /// Whether the panel should open for this extension. Some of these
    /// (`pdf`, `key`, `pages`, `numbers`) only get the web search.
    #[must_use]
    pub fn handles(extension: &str) -> bool {
        router::handles(extension)
    }
}

impl Drop for DocPanel {
    fn drop(&mut self) {
        self.mount.release();
        if !self.controller.is_closed() {
            let _ = self.controller.close();
        }
    }
}
