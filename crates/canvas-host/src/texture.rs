//! Host texture slots.

use crate::device::NativeHandle;
use crate::error::BridgeResult;
use crate::format::{TextureFormat, TextureUsage};
use crate::image::HostImage;

/// Identifier of a host texture (an engine resource id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// The host's texture registry.
pub trait HostTextureSlot {
    /// Wrap an image allocated by the rendering device as a host texture.
    /// The texture aliases the image; drawing into the image is visible
    /// through the texture without any copy.
    fn create_from_external_image(
        &mut self,
        image: NativeHandle,
        format: TextureFormat,
        usage: TextureUsage,
    ) -> BridgeResult<TextureId>;

    /// Replace the texture content with `image`.
    fn update(&mut self, texture: TextureId, image: &HostImage) -> BridgeResult<()>;

    /// Release a texture. The underlying image is freed separately.
    fn free(&mut self, texture: TextureId);
}
