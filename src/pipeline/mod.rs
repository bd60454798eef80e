//! Per-capability render procedures.
//!
//! Each procedure reads the target's bytes, renders into a staged container
//! it was handed and reports a [`RenderOutcome`]. Procedures never mount
//! anything under the panel and never let an error escape: the controller
//! decides what to attach.

mod sheet;
mod slide;
mod word;

use std::fmt;
use std::rc::Rc;

use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;

use crate::config::PanelConfig;
use crate::error::{PanelError, Result};
use crate::mount::MountPoint;
use crate::router::RenderCapability;
use crate::runtime::Timer;
use crate::sheet::WorkbookParser;
use crate::style::{self, Breakpoint};
use crate::target::TargetFile;

pub use sheet::SheetView;

/// Renders a word document into `container`.
pub trait WordRenderer<M> {
    /// # Errors
    /// Fails with [`PanelError::Render`] when the renderer throws or rejects.
    fn render(&self, bytes: Vec<u8>, container: M) -> LocalBoxFuture<'static, Result<()>>;
}

/// Slide layout requested from the slide renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideMode {
    /// Every slide stacked for continuous scrolling.
    List,
    /// One slide at a time.
    Slide,
}

impl SlideMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Slide => "slide",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideOptions {
    pub width: f64,
    pub height: f64,
    pub mode: SlideMode,
}

/// Creates slide previewers bound to a container.
pub trait SlideRenderer<M> {
    /// # Errors
    /// Fails with [`PanelError::Render`] when the previewer cannot be created.
    fn create(&self, container: &M, options: SlideOptions) -> Result<Box<dyn SlidePreviewer>>;
}

/// A live slide previewer. Owned by the panel session until destroyed.
pub trait SlidePreviewer {
    /// # Errors
    /// Fails with [`PanelError::Render`] when the deck cannot be rendered.
    fn preview(&self, bytes: Vec<u8>) -> LocalBoxFuture<'static, Result<()>>;
    fn destroy(&self);
}

/// How the panel leaves an error view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// The user clicks "Search instead".
    Manual,
    /// The controller switches to search after `delay_ms`.
    Automatic { delay_ms: u32 },
}

/// Renderer state that outlives the procedure and must be released on
/// retarget or close.
pub enum LiveInstance<M: MountPoint> {
    Slide(Box<dyn SlidePreviewer>),
    Sheet(SheetView<M>),
}

impl<M: MountPoint> LiveInstance<M> {
    pub fn destroy(self) {
        match self {
            Self::Slide(previewer) => previewer.destroy(),
            Self::Sheet(_) => {}
        }
    }

    pub fn as_sheet_mut(&mut self) -> Option<&mut SheetView<M>> {
        match self {
            Self::Sheet(view) => Some(view),
            Self::Slide(_) => None,
        }
    }

    #[must_use]
    pub fn as_sheet(&self) -> Option<&SheetView<M>> {
        match self {
            Self::Sheet(view) => Some(view),
            Self::Slide(_) => None,
        }
    }
}

impl<M: MountPoint> fmt::Debug for LiveInstance<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slide(_) => f.write_str("LiveInstance::Slide"),
            Self::Sheet(view) => f
                .debug_tuple("LiveInstance::Sheet")
                .field(&view.model().sheet_names())
                .finish(),
        }
    }
}

/// Result of a render procedure.
#[derive(Debug)]
pub enum RenderOutcome<M: MountPoint> {
    Rendered {
        content: M,
        instance: Option<LiveInstance<M>>,
    },
    Error {
        message: String,
        fallback: Fallback,
    },
}

impl<M: MountPoint> RenderOutcome<M> {
    fn failed(error: &PanelError, fallback: Fallback) -> Self {
        tracing::warn!(%error, "render procedure failed");
        Self::Error {
            message: error.to_string(),
            fallback,
        }
    }

    #[must_use]
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }
}

/// The renderer collaborators and settings the procedures run with.
pub struct RenderPipeline<M: MountPoint> {
    word: Rc<dyn WordRenderer<M>>,
    slide: Rc<dyn SlideRenderer<M>>,
    workbook: Rc<dyn WorkbookParser>,
    timer: Rc<dyn Timer>,
    config: Rc<PanelConfig>,
}

impl<M: MountPoint> Clone for RenderPipeline<M> {
    fn clone(&self) -> Self {
        Self {
            word: Rc::clone(&self.word),
            slide: Rc::clone(&self.slide),
            workbook: Rc::clone(&self.workbook),
            timer: Rc::clone(&self.timer),
            config: Rc::clone(&self.config),
        }
    }
}

impl<M: MountPoint> RenderPipeline<M> {
    pub fn new(
        word: Rc<dyn WordRenderer<M>>,
        slide: Rc<dyn SlideRenderer<M>>,
        workbook: Rc<dyn WorkbookParser>,
        timer: Rc<dyn Timer>,
        config: Rc<PanelConfig>,
    ) -> Self {
        Self {
            word,
            slide,
            workbook,
            timer,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Read `file` and render it into the staged `container`.
    ///
    /// `SearchOnly` has no procedure; the controller shows the search view
    /// without going through the pipeline.
    pub fn run(
        &self,
        capability: RenderCapability,
        file: &TargetFile,
        container: M,
    ) -> LocalBoxFuture<'static, RenderOutcome<M>> {
        if !capability.is_preview() {
            let error = PanelError::Render(format!("no preview for .{}", file.extension()));
            return future::ready(RenderOutcome::failed(&error, Fallback::Manual)).boxed_local();
        }

        let pipeline = self.clone();
        let read = file.read_bytes();
        async move {
            let bytes = match read.await {
                Ok(bytes) => bytes,
                Err(error) => {
                    let error = match error {
                        PanelError::Load(_) => error,
                        other => PanelError::Load(other.to_string()),
                    };
                    return RenderOutcome::failed(&error, pipeline.load_fallback(capability));
                }
            };
            tracing::debug!(bytes = bytes.len(), ?capability, "read target bytes");

            match capability {
                RenderCapability::WordPreview => word::render(&pipeline, bytes, container).await,
                RenderCapability::SlidePreview => slide::render(&pipeline, bytes, container).await,
                RenderCapability::SheetPreview | RenderCapability::SearchOnly => {
                    sheet::render(&pipeline, &bytes, container)
                }
            }
        }
        .boxed_local()
    }

    fn load_fallback(&self, capability: RenderCapability) -> Fallback {
        if capability == RenderCapability::SheetPreview {
            self.sheet_fallback()
        } else {
            Fallback::Manual
        }
    }

    fn sheet_fallback(&self) -> Fallback {
        if self.config.sheet_auto_fallback {
            Fallback::Automatic {
                delay_ms: self.config.sheet_fallback_delay_ms,
            }
        } else {
            Fallback::Manual
        }
    }

    /// The single style step: one declarative sheet per capability, chosen
    /// by the viewing surface's breakpoint.
    fn apply_styles(&self, container: &M, capability: RenderCapability) {
        let breakpoint =
            Breakpoint::for_width(container.viewport_width(), self.config.narrow_breakpoint_px);
        if let Some(sheet) = style::for_capability(capability, breakpoint) {
            container.apply_styles(&sheet);
        }
    }
}
