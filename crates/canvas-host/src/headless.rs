//! In-memory host for demos and tests.
//!
//! [`HeadlessHost`] allocates images and textures as plain bookkeeping
//! entries and stores uploaded pixels, so the CPU path can run end to end
//! without an engine. Driver resources are whatever the caller configures;
//! an unconfigured host exposes none, which makes the Vulkan path fail with
//! `UnsupportedBackend` and exercises the fallback.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::device::{DriverResource, ImageDesc, NativeHandle, RenderingDevice};
use crate::error::{BridgeError, BridgeResult};
use crate::format::{TextureFormat, TextureUsage};
use crate::image::HostImage;
use crate::texture::{HostTextureSlot, TextureId};

/// A texture registered with the headless host.
#[derive(Debug)]
pub struct HeadlessTexture {
    pub image: NativeHandle,
    pub format: TextureFormat,
    pub usage: TextureUsage,
    content: HostImage,
    updates: usize,
}

impl HeadlessTexture {
    /// Last content pushed with `update`, or the zeroed initial content.
    pub fn content(&self) -> &HostImage {
        &self.content
    }

    /// Number of `update` calls received.
    pub fn updates(&self) -> usize {
        self.updates
    }
}

pub struct HeadlessHost {
    backend_name: String,
    resources: HashMap<DriverResource, u64>,
    images: HashMap<NativeHandle, ImageDesc>,
    textures: HashMap<TextureId, HeadlessTexture>,
    next_id: u64,
}

impl HeadlessHost {
    pub fn new(backend_name: impl Into<String>) -> Self {
        Self {
            backend_name: backend_name.into(),
            resources: HashMap::new(),
            images: HashMap::new(),
            textures: HashMap::new(),
            next_id: 1,
        }
    }

    /// Expose a driver resource value through
    /// [`RenderingDevice::driver_resource`].
    pub fn with_driver_resource(mut self, kind: DriverResource, value: u64) -> Self {
        self.resources.insert(kind, value);
        self
    }

    pub fn texture(&self, id: TextureId) -> Option<&HeadlessTexture> {
        self.textures.get(&id)
    }

    pub fn live_images(&self) -> usize {
        self.images.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    fn next(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl RenderingDevice for HeadlessHost {
    fn current_backend_name(&self) -> String {
        self.backend_name.clone()
    }

    fn driver_resource(&self, kind: DriverResource, target: Option<NativeHandle>) -> Option<u64> {
        if kind == DriverResource::TextureDataFormat {
            let image = target?;
            if !self.images.contains_key(&image) {
                return None;
            }
        }
        let value = self.resources.get(&kind).copied();
        trace!(?kind, ?value, "headless driver resource query");
        value
    }

    fn allocate_image(&mut self, desc: &ImageDesc) -> BridgeResult<NativeHandle> {
        if desc.width == 0 || desc.height == 0 {
            return Err(BridgeError::host(format!(
                "cannot allocate {}x{} image",
                desc.width, desc.height
            )));
        }
        // Keep image handles away from small integers so they never look
        // like texture ids in logs.
        let handle = NativeHandle::from_raw(0x1000_0000 + self.next());
        self.images.insert(handle, *desc);
        debug!(?handle, width = desc.width, height = desc.height, "headless image allocated");
        Ok(handle)
    }

    fn free_image(&mut self, image: NativeHandle) {
        if self.images.remove(&image).is_none() {
            debug!(?image, "free of unknown headless image");
        }
    }
}

impl HostTextureSlot for HeadlessHost {
    fn create_from_external_image(
        &mut self,
        image: NativeHandle,
        format: TextureFormat,
        usage: TextureUsage,
    ) -> BridgeResult<TextureId> {
        let desc = *self
            .images
            .get(&image)
            .ok_or_else(|| BridgeError::host(format!("unknown image {image:?}")))?;
        if desc.format != format {
            return Err(BridgeError::host(format!(
                "texture format {format:?} does not match image format {:?}",
                desc.format
            )));
        }
        let id = TextureId(self.next());
        self.textures.insert(
            id,
            HeadlessTexture {
                image,
                format,
                usage,
                content: HostImage::empty(desc.width, desc.height, format),
                updates: 0,
            },
        );
        Ok(id)
    }

    fn update(&mut self, texture: TextureId, image: &HostImage) -> BridgeResult<()> {
        let entry = self
            .textures
            .get_mut(&texture)
            .ok_or_else(|| BridgeError::host(format!("unknown texture {texture:?}")))?;
        let current = &entry.content;
        if image.width() != current.width()
            || image.height() != current.height()
            || image.format() != entry.format
        {
            return Err(BridgeError::host(format!(
                "update {}x{} {:?} does not fit texture {}x{} {:?}",
                image.width(),
                image.height(),
                image.format(),
                current.width(),
                current.height(),
                entry.format
            )));
        }
        entry.content = image.clone();
        entry.updates += 1;
        Ok(())
    }

    fn free(&mut self, texture: TextureId) {
        if self.textures.remove(&texture).is_none() {
            debug!(?texture, "free of unknown headless texture");
        }
    }
}
