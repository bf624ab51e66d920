//! Pushing rendered content to the host texture.

use canvas_host::{BridgeError, BridgeResult, HostImage, HostTextureSlot, TextureFormat, TextureId};
use tracing::trace;

use crate::surface::{Backing, RenderSurface};

/// What a sync did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// GPU work was submitted; the host image already holds the content.
    Flushed,
    /// CPU pixels were uploaded to the texture.
    Uploaded { bytes: usize },
}

/// Make the surface's content visible through `texture`.
///
/// A GPU surface is flushed and nothing is copied. A CPU surface rasterizes
/// pending draws and replaces the texture content with the whole buffer.
/// Either way the dirty flag is cleared on success.
pub fn sync_to_host<S: HostTextureSlot + ?Sized>(
    surface: &mut RenderSurface,
    slot: &mut S,
    texture: TextureId,
) -> BridgeResult<SyncOutcome> {
    let (width, height) = (surface.width(), surface.height());
    let outcome = match surface.backing_mut() {
        Backing::Gpu(canvas) => {
            canvas.flush()?;
            SyncOutcome::Flushed
        }
        Backing::Cpu(canvas) => {
            canvas.rasterize();
            let image = HostImage::from_data(
                width,
                height,
                TextureFormat::Rgba8,
                canvas.pixels().to_vec(),
            )?;
            slot.update(texture, &image)?;
            SyncOutcome::Uploaded {
                bytes: image.data().len(),
            }
        }
        Backing::Disposed => return Err(BridgeError::UseAfterDispose),
    };
    surface.clear_dirty();
    trace!(?texture, ?outcome, "surface synced");
    Ok(outcome)
}
