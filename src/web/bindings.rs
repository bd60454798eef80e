//! Bindings to the `docx-preview` and `pptx-preview` packages.

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use js_sys::{Promise, Uint8Array};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlElement;

use super::dom::DomMount;
use super::runtime::js_error_message;
use crate::error::{PanelError, Result};
use crate::pipeline::{SlideOptions, SlidePreviewer, SlideRenderer, WordRenderer};

#[wasm_bindgen(module = "docx-preview")]
extern "C" {
    #[wasm_bindgen(js_name = renderAsync, catch)]
    fn render_async(
        file: &Uint8Array,
        container: &HtmlElement,
        style_container: &JsValue,
        options: &JsValue,
    ) -> std::result::Result<Promise, JsValue>;
}

#[wasm_bindgen(module = "pptx-preview")]
extern "C" {
    type PptxPreviewer;

    #[wasm_bindgen(js_name = init, catch)]
    fn pptx_init(
        dom: &HtmlElement,
        options: &JsValue,
    ) -> std::result::Result<PptxPreviewer, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn preview(this: &PptxPreviewer, file: &js_sys::ArrayBuffer)
        -> std::result::Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn destroy(this: &PptxPreviewer) -> std::result::Result<(), JsValue>;
}

fn render_error(value: &JsValue) -> PanelError {
    PanelError::Render(js_error_message(value))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| PanelError::Render(e.to_string()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocxOptions {
    class_name: &'static str,
    in_wrapper: bool,
    ignore_width: bool,
    ignore_height: bool,
    break_pages: bool,
    experimental: bool,
}

impl Default for DocxOptions {
    fn default() -> Self {
        Self {
            class_name: "docx",
            in_wrapper: true,
            ignore_width: false,
            ignore_height: false,
            break_pages: true,
            experimental: false,
        }
    }
}

/// Word renderer backed by `docx-preview`'s `renderAsync`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxPreview;

impl WordRenderer<DomMount> for DocxPreview {
    fn render(&self, bytes: Vec<u8>, container: DomMount) -> LocalBoxFuture<'static, Result<()>> {
        async move {
            let options = to_js(&DocxOptions::default())?;
            let file = Uint8Array::from(bytes.as_slice());
            let promise = render_async(&file, container.element(), &JsValue::UNDEFINED, &options)
                .map_err(|e| render_error(&e))?;
            JsFuture::from(promise).await.map_err(|e| render_error(&e))?;
            Ok(())
        }
        .boxed_local()
    }
}

#[derive(Serialize)]
struct PptxOptions {
    width: f64,
    height: f64,
    mode: &'static str,
}

/// Slide renderer backed by `pptx-preview`'s `init`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PptxPreview;

impl SlideRenderer<DomMount> for PptxPreview {
    fn create(
        &self,
        container: &DomMount,
        options: SlideOptions,
    ) -> Result<Box<dyn SlidePreviewer>> {
        let options = to_js(&PptxOptions {
            width: options.width,
            height: options.height,
            mode: options.mode.as_str(),
        })?;
        let previewer = pptx_init(container.element(), &options).map_err(|e| render_error(&e))?;
        Ok(Box::new(PptxHandle(previewer)))
    }
}

struct PptxHandle(PptxPreviewer);

impl SlidePreviewer for PptxHandle {
    fn preview(&self, bytes: Vec<u8>) -> LocalBoxFuture<'static, Result<()>> {
        let buffer = Uint8Array::from(bytes.as_slice()).buffer();
        let started = self.0.preview(&buffer);
        async move {
            let promise = started.map_err(|e| render_error(&e))?;
            JsFuture::from(promise).await.map_err(|e| render_error(&e))?;
            Ok(())
        }
        .boxed_local()
    }

    fn destroy(&self) {
        if let Err(error) = self.0.destroy() {
            tracing::warn!(message = %js_error_message(&error), "slide previewer destroy failed");
        }
    }
}
