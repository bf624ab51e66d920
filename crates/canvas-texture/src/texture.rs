//! A host texture with a drawable surface behind it.

use canvas_host::{
    BridgeError, BridgeResult, Host, HostImage, HostTextureSlot, ImageDesc, NativeHandle,
    RenderingDevice, TextureFormat, TextureId, TextureUsage,
};
use tracing::{debug, info, warn};
use vk_interop::{VkImageDescription, VulkanDriver};

use crate::config::CanvasConfig;
use crate::gpu::{default_backend, GpuBackend, GpuSurfaceRequest};
use crate::paint::Painter;
use crate::surface::{checked_dimensions, RenderSurface, SurfaceState};
use crate::sync::SyncOutcome;
use crate::VULKAN_BACKEND;

/// Why a texture that could have rendered on the GPU ended up on the CPU.
#[derive(Debug)]
pub struct FallbackReport {
    /// Host backend name at creation time.
    pub backend: String,
    pub error: BridgeError,
}

/// A host texture you can draw into.
///
/// Create it with [`CanvasTexture::new`], draw with [`CanvasTexture::draw`],
/// push content with [`CanvasTexture::sync`] once per frame and release it
/// with [`CanvasTexture::dispose`].
pub struct CanvasTexture {
    surface: RenderSurface,
    texture: TextureId,
    image: NativeHandle,
    fallback: Option<FallbackReport>,
}

impl CanvasTexture {
    /// Create a texture using the best GPU backend this build offers.
    pub fn new<H: Host>(
        host: &mut H,
        driver: &VulkanDriver,
        config: &CanvasConfig,
    ) -> BridgeResult<Self> {
        let backend = default_backend();
        Self::with_backend(host, driver, backend.as_ref(), config)
    }

    pub fn with_backend<H: Host>(
        host: &mut H,
        driver: &VulkanDriver,
        backend: &dyn GpuBackend,
        config: &CanvasConfig,
    ) -> BridgeResult<Self> {
        let (width, height) = (config.width.max(1), config.height.max(1));
        checked_dimensions(width, height)?;

        let desc = ImageDesc {
            width,
            height,
            format: TextureFormat::Rgba8,
            usage: TextureUsage::CANVAS,
        };
        let image = host.allocate_image(&desc)?;
        let texture = match host.create_from_external_image(image, desc.format, desc.usage) {
            Ok(texture) => texture,
            Err(err) => {
                host.free_image(image);
                return Err(err);
            }
        };

        let backend_name = host.current_backend_name();
        let mut fallback = None;
        let gpu = if config.force_cpu() {
            debug!("GPU rendering disabled by configuration");
            None
        } else if backend_name != VULKAN_BACKEND {
            debug!(backend = %backend_name, "host is not rendering with Vulkan");
            None
        } else {
            match create_gpu_surface(&*host, driver, backend, image, width, height) {
                Ok(surface) => Some(surface),
                Err(err) if err.is_recoverable() => {
                    warn!(error = %err, "GPU canvas unavailable, falling back to CPU rendering");
                    fallback = Some(FallbackReport {
                        backend: backend_name,
                        error: err,
                    });
                    None
                }
                Err(err) => {
                    release_host_resources(host, texture, image);
                    return Err(err);
                }
            }
        };

        let surface = match gpu {
            Some(surface) => surface,
            None => match RenderSurface::cpu(width, height) {
                Ok(surface) => surface,
                Err(err) => {
                    release_host_resources(host, texture, image);
                    return Err(err);
                }
            },
        };

        info!(
            ?texture,
            width,
            height,
            mode = ?surface.state(),
            "canvas texture created"
        );
        Ok(Self {
            surface,
            texture,
            image,
            fallback,
        })
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    pub fn texture_id(&self) -> TextureId {
        self.texture
    }

    pub fn image_handle(&self) -> NativeHandle {
        self.image
    }

    pub fn mode(&self) -> SurfaceState {
        self.surface.state()
    }

    pub fn is_gpu_mode(&self) -> bool {
        self.surface.is_gpu()
    }

    pub fn is_dirty(&self) -> bool {
        self.surface.is_dirty()
    }

    /// Set when GPU setup was attempted and failed.
    pub fn fallback(&self) -> Option<&FallbackReport> {
        self.fallback.as_ref()
    }

    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    pub fn draw<R>(&mut self, f: impl FnOnce(&mut dyn Painter) -> R) -> BridgeResult<R> {
        self.surface.draw(f)
    }

    pub fn mark_dirty(&mut self) -> BridgeResult<()> {
        self.surface.mark_dirty()
    }

    /// Make drawn content visible through the host texture.
    pub fn sync<S: HostTextureSlot + ?Sized>(&mut self, slot: &mut S) -> BridgeResult<SyncOutcome> {
        self.surface.sync(slot, self.texture)
    }

    /// [`CanvasTexture::sync`] only when something was drawn since the last
    /// sync.
    pub fn sync_if_dirty<S: HostTextureSlot + ?Sized>(
        &mut self,
        slot: &mut S,
    ) -> BridgeResult<Option<SyncOutcome>> {
        if self.surface.state() == SurfaceState::Disposed {
            return Err(BridgeError::UseAfterDispose);
        }
        if !self.surface.is_dirty() {
            return Ok(None);
        }
        self.sync(slot).map(Some)
    }

    pub fn image(&mut self) -> BridgeResult<HostImage> {
        self.surface.image()
    }

    /// Release the surface, then the host texture, then the host image.
    pub fn dispose<H: Host>(&mut self, host: &mut H) -> BridgeResult<()> {
        self.surface.dispose()?;
        release_host_resources(host, self.texture, self.image);
        debug!(texture = ?self.texture, "canvas texture disposed");
        Ok(())
    }
}

impl Drop for CanvasTexture {
    fn drop(&mut self) {
        if self.surface.state() != SurfaceState::Disposed {
            warn!(
                texture = ?self.texture,
                "canvas texture dropped without dispose, host texture leaked"
            );
        }
    }
}

impl std::fmt::Debug for CanvasTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasTexture")
            .field("texture", &self.texture)
            .field("image", &self.image)
            .field("surface", &self.surface)
            .field("fallback", &self.fallback)
            .finish()
    }
}

fn create_gpu_surface<D: RenderingDevice>(
    device: &D,
    driver: &VulkanDriver,
    backend: &dyn GpuBackend,
    image: NativeHandle,
    width: u32,
    height: u32,
) -> BridgeResult<RenderSurface> {
    let handles = driver.handles(device)?;
    let format = driver.texture_format(device, image)?;
    let functions = driver.functions()?;
    debug!(
        format,
        queue_family = handles.queue_family_index,
        library = functions.library(),
        "binding GPU canvas to host image"
    );
    let request = GpuSurfaceRequest {
        handles,
        functions,
        image: VkImageDescription::color_target(
            image,
            format,
            handles.queue_family_index,
            width,
            height,
        ),
    };
    RenderSurface::gpu(backend, request)
}

fn release_host_resources<H: Host>(host: &mut H, texture: TextureId, image: NativeHandle) {
    host.free(texture);
    host.free_image(image);
}
