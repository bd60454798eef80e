//! Word documents.

use super::{Fallback, RenderOutcome, RenderPipeline};
use crate::mount::MountPoint;
use crate::router::RenderCapability;

pub(super) async fn render<M: MountPoint>(
    pipeline: &RenderPipeline<M>,
    bytes: Vec<u8>,
    container: M,
) -> RenderOutcome<M> {
    if let Err(error) = pipeline.word.render(bytes, container.clone()).await {
        return RenderOutcome::failed(&error, Fallback::Manual);
    }

    // The renderer's promise resolves before late layout (fonts, images)
    // settles; styling earlier gets overwritten.
    pipeline.timer.sleep(pipeline.config.word_settle_ms).await;
    pipeline.apply_styles(&container, RenderCapability::WordPreview);

    RenderOutcome::Rendered {
        content: container,
        instance: None,
    }
}
