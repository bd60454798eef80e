//! Browser clipboard strategies: the async Clipboard API first, then the
//! hidden-textarea `execCommand("copy")` technique for insecure contexts.

use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlDocument, HtmlTextAreaElement};

use super::runtime::js_error_message;
use crate::clipboard::ClipboardStrategy;
use crate::error::{PanelError, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct SecureClipboard;

impl ClipboardStrategy for SecureClipboard {
    fn name(&self) -> &'static str {
        "clipboard-api"
    }

    fn write(&self, text: String) -> LocalBoxFuture<'static, Result<()>> {
        let Some(window) = web_sys::window() else {
            return future::ready(Err(PanelError::Clipboard("no window".into()))).boxed_local();
        };
        if !window.is_secure_context() {
            return future::ready(Err(PanelError::Clipboard("not a secure context".into())))
                .boxed_local();
        }
        let promise = window.navigator().clipboard().write_text(&text);
        async move {
            JsFuture::from(promise)
                .await
                .map(|_| ())
                .map_err(|e| PanelError::Clipboard(js_error_message(&e)))
        }
        .boxed_local()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyClipboard;

impl LegacyClipboard {
    fn copy(text: &str) -> Result<()> {
        let fail = |message: &str| PanelError::Clipboard(message.to_string());
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| fail("no document"))?;
        let body = document.body().ok_or_else(|| fail("no body"))?;
        let area = document
            .create_element("textarea")
            .map_err(|e| fail(&js_error_message(&e)))?
            .dyn_into::<HtmlTextAreaElement>()
            .map_err(|_| fail("textarea unavailable"))?;
        area.set_value(text);
        let _ = area.set_attribute("readonly", "");
        let _ = area.set_attribute(
            "style",
            "position:fixed;left:-9999px;top:0;opacity:0;pointer-events:none",
        );
        body.append_child(&area)
            .map_err(|e| fail(&js_error_message(&e)))?;
        area.select();

        let copied = document
            .dyn_into::<HtmlDocument>()
            .map_err(|_| fail("document does not support execCommand"))
            .and_then(|html| {
                html.exec_command("copy")
                    .map_err(|e| fail(&js_error_message(&e)))
            });
        area.remove();

        if copied? {
            Ok(())
        } else {
            Err(fail("execCommand(\"copy\") was refused"))
        }
    }
}

impl ClipboardStrategy for LegacyClipboard {
    fn name(&self) -> &'static str {
        "exec-command"
    }

    fn write(&self, text: String) -> LocalBoxFuture<'static, Result<()>> {
        future::ready(Self::copy(&text)).boxed_local()
    }
}
