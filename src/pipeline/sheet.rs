//! Spreadsheets: parse once, then redraw the grid per selected sheet.

use super::{LiveInstance, RenderOutcome, RenderPipeline};
use crate::mount::MountPoint;
use crate::router::RenderCapability;
use crate::sheet::{tabs_view, GridView, RowLimits, SheetModel};

pub(super) fn render<M: MountPoint>(
    pipeline: &RenderPipeline<M>,
    bytes: &[u8],
    container: M,
) -> RenderOutcome<M> {
    let model = match pipeline.workbook.parse(bytes) {
        Ok(model) => model,
        Err(error) => {
            return RenderOutcome::failed(&error.into_parse(), pipeline.sheet_fallback());
        }
    };
    tracing::debug!(sheets = model.sheet_count(), "parsed workbook");

    let view = SheetView::mount(&container, model, RowLimits::from_config(&pipeline.config));
    pipeline.apply_styles(&container, RenderCapability::SheetPreview);

    RenderOutcome::Rendered {
        content: container,
        instance: Some(LiveInstance::Sheet(view)),
    }
}

/// A parsed workbook shown as a tab strip over a grid.
///
/// Selecting a sheet redraws both from the retained model; the bytes are
/// never parsed again.
#[derive(Debug)]
pub struct SheetView<M: MountPoint> {
    model: SheetModel,
    tabs: Option<M>,
    grid: M,
    limits: RowLimits,
}

impl<M: MountPoint> SheetView<M> {
    /// Build the tab strip (multi-sheet workbooks only) and the grid for the
    /// first sheet inside `container`.
    pub fn mount(container: &M, model: SheetModel, limits: RowLimits) -> Self {
        let tabs =
            (model.sheet_count() > 1).then(|| container.append_container("docpanel-tabs-host"));
        let grid = container.append_container("docpanel-grid-host");
        let view = Self {
            model,
            tabs,
            grid,
            limits,
        };
        view.redraw();
        view
    }

    #[must_use]
    pub fn model(&self) -> &SheetModel {
        &self.model
    }

    /// Layout of the active sheet's grid.
    #[must_use]
    pub fn grid(&self) -> GridView {
        GridView::for_active_sheet(&self.model, self.limits)
    }

    /// Show sheet `index`. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index == self.model.active_sheet_index() {
            return true;
        }
        if !self.model.select(index) {
            tracing::warn!(index, "ignoring selection of missing sheet");
            return false;
        }
        tracing::debug!(index, sheet = ?self.model.active_sheet_name(), "selected sheet");
        self.redraw();
        true
    }

    fn redraw(&self) {
        if let Some(tabs) = &self.tabs {
            tabs.clear();
            if let Some(strip) = tabs_view(&self.model) {
                tabs.append(&strip);
            }
        }
        self.grid.clear();
        self.grid.append(&self.grid().to_view());
    }
}
