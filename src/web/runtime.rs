//! Browser task scheduling, timers and byte loading.

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use js_sys::{Function, Promise, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::error::{PanelError, Result};
use crate::runtime::{Spawn, Timer};
use crate::target::ByteSource;

/// Best-effort message for a thrown JS value.
pub(crate) fn js_error_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WasmSpawner;

impl Spawn for WasmSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

/// `setTimeout` wrapped in a promise.
#[derive(Debug, Clone, Copy, Default)]
pub struct WasmTimer;

impl Timer for WasmTimer {
    fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()> {
        let delay = i32::try_from(ms).unwrap_or(i32::MAX);
        let promise = Promise::new(&mut |resolve, _reject| {
            let scheduled = web_sys::window().map(|window| {
                window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, delay)
            });
            if !matches!(scheduled, Some(Ok(_))) {
                // No window (worker or detached context): resolve at once.
                let _ = resolve.call0(&JsValue::NULL);
            }
        });
        async move {
            let _ = JsFuture::from(promise).await;
        }
        .boxed_local()
    }
}

/// Bytes supplied by a host callback returning an `ArrayBuffer`, a typed
/// array, or a promise of either.
#[derive(Debug, Clone)]
pub struct JsByteSource {
    loader: Function,
}

impl JsByteSource {
    #[must_use]
    pub fn new(loader: Function) -> Self {
        Self { loader }
    }
}

impl ByteSource for JsByteSource {
    fn read(&self) -> LocalBoxFuture<'static, Result<Vec<u8>>> {
        let called = self.loader.call0(&JsValue::NULL);
        async move {
            let value = called.map_err(|e| PanelError::Load(js_error_message(&e)))?;
            let resolved = JsFuture::from(Promise::resolve(&value))
                .await
                .map_err(|e| PanelError::Load(js_error_message(&e)))?;
            if !(resolved.is_instance_of::<js_sys::ArrayBuffer>()
                || resolved.is_instance_of::<Uint8Array>())
            {
                return Err(PanelError::Load("loader did not return bytes".into()));
            }
            Ok(Uint8Array::new(&resolved).to_vec())
        }
        .boxed_local()
    }
}
