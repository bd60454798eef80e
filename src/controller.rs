//! The panel's state machine.
//!
//! [`ViewStateController`] owns the panel container and the session: current
//! target, [`RenderState`], generation token and whatever is mounted. It is
//! the only component that attaches or removes content under the panel.
//! Render procedures fill a staged container; a finished render commits only
//! if its captured generation is still current, so a superseded render can
//! never reach the panel.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use serde::Serialize;

use crate::clipboard::{ClipboardExporter, ClipboardStrategy, CopyOutcome};
use crate::config::PanelConfig;
use crate::error::{PanelError, Result};
use crate::mount::{el, Action, MountPoint, ViewNode};
use crate::pipeline::{
    Fallback, LiveInstance, RenderOutcome, RenderPipeline, SlideRenderer, WordRenderer,
};
use crate::router::{self, RenderCapability};
use crate::runtime::{Spawn, Timer};
use crate::search::{strip_extension, SearchFallback};
use crate::sheet::WorkbookParser;
use crate::style;
use crate::target::TargetFile;

pub const DEFAULT_TITLE: &str = "File preview";
pub const SELECT_FILE_TEXT: &str = "Select a file to preview";
pub const LOADING_TEXT: &str = "Loading preview…";
pub const SEARCH_INSTEAD_TEXT: &str = "Search instead";
pub const REDIRECT_TEXT: &str = "Switching to web search…";

/// Lifecycle of the panel's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderState {
    Idle,
    Loading,
    Rendered,
    Error,
    /// Terminal: the panel was closed.
    Closed,
}

impl RenderState {
    /// `Idle → Loading → {Rendered | Error} → Loading`; a retarget while
    /// loading supersedes the render in flight (`Loading → Loading`). Any
    /// live state may close; nothing leaves `Closed`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (
                Self::Idle | Self::Loading | Self::Rendered | Self::Error,
                Self::Loading | Self::Closed
            ) | (Self::Loading, Self::Rendered | Self::Error)
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Rendered => "rendered",
            Self::Error => "error",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for RenderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collaborators the controller drives.
pub struct PanelServices<M: MountPoint> {
    pub pipeline: RenderPipeline<M>,
    pub search: SearchFallback,
    pub clipboard: ClipboardExporter,
    pub spawner: Rc<dyn Spawn>,
    pub timer: Rc<dyn Timer>,
}

impl<M: MountPoint> PanelServices<M> {
    /// Wire the standard services from a config and the host's
    /// collaborators.
    pub fn new(
        config: PanelConfig,
        spawner: Rc<dyn Spawn>,
        timer: Rc<dyn Timer>,
        word: Rc<dyn WordRenderer<M>>,
        slide: Rc<dyn SlideRenderer<M>>,
        workbook: Rc<dyn WorkbookParser>,
        clipboard: Vec<Rc<dyn ClipboardStrategy>>,
    ) -> Self {
        let config = Rc::new(config);
        let search = SearchFallback::new(config.search_url_template.clone());
        let clipboard = ClipboardExporter::new(
            clipboard,
            Rc::clone(&spawner),
            Rc::clone(&timer),
            config.status_timeout_ms,
        );
        let pipeline = RenderPipeline::new(word, slide, workbook, Rc::clone(&timer), config);
        Self {
            pipeline,
            search,
            clipboard,
            spawner,
            timer,
        }
    }
}

struct Request {
    file: TargetFile,
    forced: Option<RenderCapability>,
}

/// State of one open panel.
struct PanelSession<M: MountPoint> {
    target: Option<TargetFile>,
    state: RenderState,
    /// Capability actually displayed; `SearchOnly` once the panel shows the
    /// search frame, even for a previewable file.
    mode: Option<RenderCapability>,
    content: Option<M>,
    instance: Option<LiveInstance<M>>,
}

impl<M: MountPoint> PanelSession<M> {
    fn idle() -> Self {
        Self {
            target: None,
            state: RenderState::Idle,
            mode: None,
            content: None,
            instance: None,
        }
    }

    fn transition(&mut self, next: RenderState) -> bool {
        if self.state.can_transition_to(next) {
            tracing::trace!(from = %self.state, to = %next, "state transition");
            self.state = next;
            true
        } else {
            tracing::error!(from = %self.state, to = %next, "rejected state transition");
            false
        }
    }
}

struct ControllerState<M: MountPoint> {
    session: Option<PanelSession<M>>,
    /// A target handed over before `open()`.
    pending: Option<Request>,
    generation: u64,
    closed: bool,
}

/// Orchestrates routing, rendering and fallbacks for one panel.
///
/// Clones are handles to the same panel.
pub struct ViewStateController<M: MountPoint> {
    panel: M,
    services: Rc<PanelServices<M>>,
    inner: Rc<RefCell<ControllerState<M>>>,
}

impl<M: MountPoint> Clone for ViewStateController<M> {
    fn clone(&self) -> Self {
        Self {
            panel: self.panel.clone(),
            services: Rc::clone(&self.services),
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<M: MountPoint> ViewStateController<M> {
    pub fn new(panel: M, services: PanelServices<M>) -> Self {
        Self {
            panel,
            services: Rc::new(services),
            inner: Rc::new(RefCell::new(ControllerState {
                session: None,
                pending: None,
                generation: 0,
                closed: false,
            })),
        }
    }

    /// Start the session: install the panel styles and the placeholder, then
    /// render any target handed over before the panel opened.
    ///
    /// # Errors
    /// [`PanelError::Closed`] after [`close`](Self::close).
    pub fn open(&self) -> Result<()> {
        let pending = {
            let mut inner = self.inner.borrow_mut();
            if inner.closed {
                return Err(PanelError::Closed);
            }
            if inner.session.is_some() {
                return Ok(());
            }
            inner.session = Some(PanelSession::idle());
            inner.pending.take()
        };

        self.panel.clear();
        self.panel.apply_styles(&style::panel_styles());
        self.panel.append(&notice(SELECT_FILE_TEXT));
        tracing::info!("panel opened");

        match pending {
            Some(request) => self.dispatch(request.file, request.forced),
            None => Ok(()),
        }
    }

    /// Show `file` with the capability its extension maps to.
    ///
    /// # Errors
    /// [`PanelError::Closed`] after [`close`](Self::close).
    pub fn retarget(&self, file: TargetFile) -> Result<()> {
        self.dispatch(file, None)
    }

    /// Show `file` with an explicit capability (the "search instead" path).
    ///
    /// # Errors
    /// [`PanelError::Closed`] after [`close`](Self::close).
    pub fn retarget_forced(&self, file: TargetFile, capability: RenderCapability) -> Result<()> {
        self.dispatch(file, Some(capability))
    }

    fn dispatch(&self, file: TargetFile, forced: Option<RenderCapability>) -> Result<()> {
        let capability = forced.unwrap_or_else(|| router::classify(file.extension()));

        let (generation, released) = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            if inner.closed {
                return Err(PanelError::Closed);
            }
            let Some(session) = inner.session.as_mut() else {
                tracing::debug!(name = file.name(), "panel not open yet, deferring target");
                inner.pending = Some(Request { file, forced });
                return Ok(());
            };
            session.transition(RenderState::Loading);
            session.target = Some(file.clone());
            session.mode = Some(capability);
            session.content = None;
            let released = session.instance.take();
            inner.generation += 1;
            (inner.generation, released)
        };

        if let Some(instance) = released {
            instance.destroy();
        }
        self.panel.clear();
        tracing::info!(generation, name = file.name(), ?capability, "retarget");

        if capability == RenderCapability::SearchOnly {
            let content = self.panel.stage();
            content.append(&self.services.search.view(&file));
            self.panel.replace_children(&content);
            self.with_session(|session| {
                session.transition(RenderState::Rendered);
                session.content = Some(content);
            });
            return Ok(());
        }

        self.panel.append(&notice(LOADING_TEXT));
        let render = self
            .services
            .pipeline
            .run(capability, &file, self.panel.stage());
        let controller = self.clone();
        self.services.spawner.spawn(
            async move {
                let outcome = render.await;
                controller.commit(generation, outcome);
            }
            .boxed_local(),
        );
        Ok(())
    }

    fn is_current(&self, generation: u64) -> bool {
        let inner = self.inner.borrow();
        !inner.closed && inner.session.is_some() && inner.generation == generation
    }

    fn with_session(&self, f: impl FnOnce(&mut PanelSession<M>)) {
        if let Some(session) = self.inner.borrow_mut().session.as_mut() {
            f(session);
        }
    }

    fn commit(&self, generation: u64, outcome: RenderOutcome<M>) {
        if !self.is_current(generation) {
            tracing::debug!(
                generation,
                current = self.generation(),
                "discarding superseded render"
            );
            if let RenderOutcome::Rendered {
                instance: Some(instance),
                ..
            } = outcome
            {
                instance.destroy();
            }
            return;
        }

        match outcome {
            RenderOutcome::Rendered { content, instance } => {
                self.panel.replace_children(&content);
                self.with_session(|session| {
                    session.transition(RenderState::Rendered);
                    session.content = Some(content);
                    session.instance = instance;
                });
                tracing::info!(generation, "render committed");
            }
            RenderOutcome::Error { message, fallback } => {
                let view = self.panel.stage();
                view.append(&error_view(&message, fallback));
                self.panel.replace_children(&view);
                self.with_session(|session| {
                    session.transition(RenderState::Error);
                    session.content = Some(view);
                });
                tracing::warn!(generation, %message, ?fallback, "render failed");

                if let Fallback::Automatic { delay_ms } = fallback {
                    let sleep = self.services.timer.sleep(delay_ms);
                    let controller = self.clone();
                    self.services.spawner.spawn(
                        async move {
                            sleep.await;
                            controller.auto_fallback(generation);
                        }
                        .boxed_local(),
                    );
                }
            }
        }
    }

    fn auto_fallback(&self, generation: u64) {
        if !self.is_current(generation) {
            return;
        }
        let target = {
            let inner = self.inner.borrow();
            inner
                .session
                .as_ref()
                .filter(|session| session.state == RenderState::Error)
                .and_then(|session| session.target.clone())
        };
        if let Some(file) = target {
            tracing::info!(name = file.name(), "falling back to web search");
            if let Err(error) = self.retarget_forced(file, RenderCapability::SearchOnly) {
                tracing::warn!(%error, "automatic search fallback failed");
            }
        }
    }

    /// React to a user action from the mounted content.
    ///
    /// # Errors
    /// [`PanelError::Closed`] after [`close`](Self::close).
    pub fn handle(&self, action: Action) -> Result<()> {
        if self.inner.borrow().closed {
            return Err(PanelError::Closed);
        }
        tracing::debug!(?action, "handling action");
        match action {
            Action::SwitchToSearch => match self.current_target() {
                Some(file) => self.retarget_forced(file, RenderCapability::SearchOnly),
                None => Ok(()),
            },
            Action::SelectSheet(index) => {
                let mut inner = self.inner.borrow_mut();
                let view = inner
                    .session
                    .as_mut()
                    .filter(|session| session.state == RenderState::Rendered)
                    .and_then(|session| session.instance.as_mut())
                    .and_then(LiveInstance::as_sheet_mut);
                if let Some(view) = view {
                    view.select(index);
                }
                Ok(())
            }
            Action::CopyText => {
                let copy = self.copy_visible_text()?;
                self.services.spawner.spawn(copy.map(drop).boxed_local());
                Ok(())
            }
        }
    }

    /// Copy the rendered content's visible text. Outside `Rendered` there is
    /// nothing to copy.
    ///
    /// # Errors
    /// [`PanelError::Closed`] after [`close`](Self::close).
    pub fn copy_visible_text(&self) -> Result<LocalBoxFuture<'static, CopyOutcome>> {
        let source = {
            let inner = self.inner.borrow();
            if inner.closed {
                return Err(PanelError::Closed);
            }
            inner
                .session
                .as_ref()
                .filter(|session| session.state == RenderState::Rendered)
                .and_then(|session| session.content.clone())
        };
        let source = source.unwrap_or_else(|| self.panel.stage());
        Ok(self
            .services
            .clipboard
            .copy_visible_text(&source, &self.panel))
    }

    /// Release mounted content and renderer instances. The controller
    /// accepts no further calls.
    ///
    /// # Errors
    /// [`PanelError::Closed`] when already closed.
    pub fn close(&self) -> Result<()> {
        let released = {
            let mut inner = self.inner.borrow_mut();
            if inner.closed {
                return Err(PanelError::Closed);
            }
            inner.closed = true;
            inner.generation += 1;
            inner.pending = None;
            inner.session.take().and_then(|session| session.instance)
        };
        if let Some(instance) = released {
            instance.destroy();
        }
        self.panel.clear();
        tracing::info!("panel closed");
        Ok(())
    }

    /// Tab title: the file name while previewing, `Search: <stem>` while
    /// showing the search frame.
    #[must_use]
    pub fn title(&self) -> String {
        let inner = self.inner.borrow();
        let shown = inner
            .session
            .as_ref()
            .and_then(|session| Some((session.target.as_ref()?, session.mode?)));
        match shown {
            Some((file, RenderCapability::SearchOnly)) => {
                format!("Search: {}", strip_extension(file.name()))
            }
            Some((file, _)) => file.name().to_string(),
            None => DEFAULT_TITLE.to_string(),
        }
    }

    #[must_use]
    pub fn icon(&self) -> &'static str {
        self.inner
            .borrow()
            .session
            .as_ref()
            .and_then(|session| session.mode)
            .unwrap_or(RenderCapability::SearchOnly)
            .icon()
    }

    /// `Idle` before the first render, `Closed` after [`close`](Self::close).
    #[must_use]
    pub fn state(&self) -> RenderState {
        let inner = self.inner.borrow();
        if inner.closed {
            return RenderState::Closed;
        }
        inner
            .session
            .as_ref()
            .map_or(RenderState::Idle, |session| session.state)
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.borrow().generation
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.borrow().closed
    }

    #[must_use]
    pub fn current_target(&self) -> Option<TargetFile> {
        self.inner
            .borrow()
            .session
            .as_ref()
            .and_then(|session| session.target.clone())
    }

    /// Capability currently on display.
    #[must_use]
    pub fn mode(&self) -> Option<RenderCapability> {
        self.inner
            .borrow()
            .session
            .as_ref()
            .and_then(|session| session.mode)
    }

    /// Run `f` against the live sheet view, if a workbook is displayed.
    pub fn with_sheet<R>(&self, f: impl FnOnce(&crate::pipeline::SheetView<M>) -> R) -> Option<R> {
        let inner = self.inner.borrow();
        inner
            .session
            .as_ref()
            .and_then(|session| session.instance.as_ref())
            .and_then(LiveInstance::as_sheet)
            .map(f)
    }

    #[must_use]
    pub fn panel(&self) -> &M {
        &self.panel
    }

    #[must_use]
    pub fn config(&self) -> &PanelConfig {
        self.services.pipeline.config()
    }
}

fn notice(text: &str) -> ViewNode {
    el("div").class("docpanel-notice").text(text).into()
}

fn error_view(message: &str, fallback: Fallback) -> ViewNode {
    let mut view = el("div").class("docpanel-error-view").child(
        el("div")
            .class("docpanel-notice")
            .class("docpanel-error")
            .text(message),
    );
    if let Fallback::Automatic { .. } = fallback {
        view = view.child(el("div").class("docpanel-notice").text(REDIRECT_TEXT));
    }
    view.child(
        el("button")
            .class("docpanel-action")
            .text(SEARCH_INSTEAD_TEXT)
            .on_click(Action::SwitchToSearch),
    )
    .into()
}
