//! Slide decks.

use super::{Fallback, LiveInstance, RenderOutcome, RenderPipeline, SlideMode, SlideOptions};
use crate::mount::MountPoint;
use crate::router::RenderCapability;

pub(super) async fn render<M: MountPoint>(
    pipeline: &RenderPipeline<M>,
    bytes: Vec<u8>,
    container: M,
) -> RenderOutcome<M> {
    let size = container.size();
    let options = if size.is_empty() {
        SlideOptions {
            width: pipeline.config.slide_default_width,
            height: pipeline.config.slide_default_height,
            mode: SlideMode::List,
        }
    } else {
        SlideOptions {
            width: size.width,
            height: size.height,
            mode: SlideMode::List,
        }
    };
    tracing::debug!(width = options.width, height = options.height, "creating slide previewer");

    let previewer = match pipeline.slide.create(&container, options) {
        Ok(previewer) => previewer,
        Err(error) => return RenderOutcome::failed(&error, Fallback::Manual),
    };

    if let Err(error) = previewer.preview(bytes).await {
        previewer.destroy();
        return RenderOutcome::failed(&error, Fallback::Manual);
    }

    pipeline.timer.sleep(pipeline.config.slide_settle_ms).await;
    pipeline.apply_styles(&container, RenderCapability::SlidePreview);

    RenderOutcome::Rendered {
        content: container,
        instance: Some(LiveInstance::Slide(previewer)),
    }
}
