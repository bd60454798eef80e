//! Copying the panel's visible text.
//!
//! Strategies are tried in order until one succeeds. On wasm32 the chain is
//! the async Clipboard API followed by the hidden-textarea `execCommand`
//! technique (see `web::clipboard`).

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;

use crate::error::Result;
use crate::mount::{MountPoint, ViewNode};
use crate::runtime::{Spawn, Timer};

pub const COPIED_TEXT: &str = "Copied to clipboard";
pub const NOTHING_TO_COPY_TEXT: &str = "Nothing to copy";
pub const COPY_FAILED_TEXT: &str = "Copy failed";

/// One way of putting text on the system clipboard.
pub trait ClipboardStrategy {
    fn name(&self) -> &'static str;

    /// # Errors
    /// Returns [`crate::PanelError::Clipboard`] when this strategy is
    /// unavailable or the write is refused.
    fn write(&self, text: String) -> LocalBoxFuture<'static, Result<()>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Success { strategy: &'static str },
    /// The content had no visible text. Not an error.
    Empty,
    /// Every strategy failed; carries the last failure.
    Error(String),
}

impl CopyOutcome {
    #[must_use]
    pub fn status_text(&self) -> &'static str {
        match self {
            Self::Success { .. } => COPIED_TEXT,
            Self::Empty => NOTHING_TO_COPY_TEXT,
            Self::Error(_) => COPY_FAILED_TEXT,
        }
    }
}

/// Extracts visible text and runs the strategy chain.
#[derive(Clone)]
pub struct ClipboardExporter {
    strategies: Vec<Rc<dyn ClipboardStrategy>>,
    spawner: Rc<dyn Spawn>,
    timer: Rc<dyn Timer>,
    status_timeout_ms: u32,
}

impl ClipboardExporter {
    pub fn new(
        strategies: Vec<Rc<dyn ClipboardStrategy>>,
        spawner: Rc<dyn Spawn>,
        timer: Rc<dyn Timer>,
        status_timeout_ms: u32,
    ) -> Self {
        Self {
            strategies,
            spawner,
            timer,
            status_timeout_ms,
        }
    }

    /// Copy the visible text of `source` and show the result in a banner
    /// mounted under `status_host`. The banner removes itself after the
    /// status timeout.
    pub fn copy_visible_text<M: MountPoint>(
        &self,
        source: &M,
        status_host: &M,
    ) -> LocalBoxFuture<'static, CopyOutcome> {
        let text = source.visible_text();
        let exporter = self.clone();
        let host = status_host.clone();

        async move {
            let outcome = if text.trim().is_empty() {
                CopyOutcome::Empty
            } else {
                exporter.write_with_fallbacks(text).await
            };
            match &outcome {
                CopyOutcome::Success { strategy } => tracing::info!(strategy, "copied text"),
                CopyOutcome::Empty => tracing::debug!("nothing to copy"),
                CopyOutcome::Error(message) => tracing::warn!(%message, "copy failed"),
            }
            exporter.show_status(&host, outcome.status_text());
            outcome
        }
        .boxed_local()
    }

    async fn write_with_fallbacks(&self, text: String) -> CopyOutcome {
        let mut last_error = String::from("no clipboard available");
        for strategy in &self.strategies {
            match strategy.write(text.clone()).await {
                Ok(()) => {
                    return CopyOutcome::Success {
                        strategy: strategy.name(),
                    }
                }
                Err(error) => {
                    tracing::debug!(strategy = strategy.name(), %error, "clipboard strategy failed");
                    last_error = error.to_string();
                }
            }
        }
        CopyOutcome::Error(last_error)
    }

    fn show_status<M: MountPoint>(&self, host: &M, message: &str) {
        let banner = host.append_container("docpanel-status");
        banner.append(&ViewNode::Text(message.to_string()));
        let sleep = self.timer.sleep(self.status_timeout_ms);
        self.spawner.spawn(
            async move {
                sleep.await;
                banner.detach();
            }
            .boxed_local(),
        );
    }
}

/// Clipboard held in memory, for native hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Rc<RefCell<Option<String>>>,
}

impl MemoryClipboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl ClipboardStrategy for MemoryClipboard {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn write(&self, text: String) -> LocalBoxFuture<'static, Result<()>> {
        *self.contents.borrow_mut() = Some(text);
        future::ready(Ok(())).boxed_local()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::cell::Cell;

    use futures::executor::LocalPool;

    use super::*;
    use crate::error::PanelError;
    use crate::mount::{el, MemoryMount, Size};
    use crate::runtime::ImmediateTimer;

    struct Refusing {
        calls: Rc<Cell<usize>>,
    }

    impl ClipboardStrategy for Refusing {
        fn name(&self) -> &'static str {
            "refusing"
        }

        fn write(&self, _text: String) -> LocalBoxFuture<'static, Result<()>> {
            self.calls.set(self.calls.get() + 1);
            future::ready(Err(PanelError::Clipboard("not a secure context".into()))).boxed_local()
        }
    }

    fn setup(
        strategies: Vec<Rc<dyn ClipboardStrategy>>,
    ) -> (LocalPool, ClipboardExporter, ImmediateTimer) {
        let pool = LocalPool::new();
        let timer = ImmediateTimer::new();
        let exporter = ClipboardExporter::new(
            strategies,
            Rc::new(pool.spawner()),
            Rc::new(timer.clone()),
            2000,
        );
        (pool, exporter, timer)
    }

    fn panel_with_content(text: &str) -> (MemoryMount, MemoryMount) {
        let panel = MemoryMount::new(Size::new(400.0, 300.0), 1024.0);
        let content = panel.stage();
        content.append(&el("p").text(text).into());
        panel.replace_children(&content);
        (panel, content)
    }

    #[test]
    fn falls_back_to_second_strategy() {
        let calls = Rc::new(Cell::new(0));
        let memory = MemoryClipboard::new();
        let (mut pool, exporter, _) = setup(vec![
            Rc::new(Refusing {
                calls: Rc::clone(&calls),
            }),
            Rc::new(memory.clone()),
        ]);
        let (panel, content) = panel_with_content("hello");

        let outcome = pool.run_until(exporter.copy_visible_text(&content, &panel));
        assert_eq!(outcome, CopyOutcome::Success { strategy: "memory" });
        assert_eq!(calls.get(), 1);
        assert_eq!(memory.contents().as_deref(), Some("hello"));
    }

    #[test]
    fn whitespace_only_is_empty_not_error() {
        let memory = MemoryClipboard::new();
        let (mut pool, exporter, _) = setup(vec![Rc::new(memory.clone())]);
        let (panel, content) = panel_with_content("   \n  ");

        let outcome = pool.run_until(exporter.copy_visible_text(&content, &panel));
        assert_eq!(outcome, CopyOutcome::Empty);
        assert!(memory.contents().is_none());
    }

    #[test]
    fn all_strategies_failing_is_an_error() {
        let calls = Rc::new(Cell::new(0));
        let (mut pool, exporter, _) = setup(vec![
            Rc::new(Refusing {
                calls: Rc::clone(&calls),
            }),
            Rc::new(Refusing {
                calls: Rc::clone(&calls),
            }),
        ]);
        let (panel, content) = panel_with_content("text");

        let outcome = pool.run_until(exporter.copy_visible_text(&content, &panel));
        assert!(matches!(outcome, CopyOutcome::Error(ref m) if m.contains("secure context")));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn status_banner_dismisses_itself() {
        let memory = MemoryClipboard::new();
        let (mut pool, exporter, timer) = setup(vec![Rc::new(memory)]);
        let (panel, content) = panel_with_content("hello");

        pool.run_until(exporter.copy_visible_text(&content, &panel));
        assert!(panel.visible_text().contains(COPIED_TEXT));
        pool.run_until_stalled();
        assert!(!panel.visible_text().contains(COPIED_TEXT));
        assert_eq!(timer.requested(), vec![2000]);
    }

    #[test]
    fn copying_twice_yields_identical_text() {
        let memory = MemoryClipboard::new();
        let (mut pool, exporter, _) = setup(vec![Rc::new(memory.clone())]);
        let (panel, content) = panel_with_content("same text");

        pool.run_until(exporter.copy_visible_text(&content, &panel));
        let first = memory.contents();
        pool.run_until(exporter.copy_visible_text(&content, &panel));
        assert_eq!(memory.contents(), first);
    }
}
