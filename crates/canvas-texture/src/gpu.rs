//! GPU surface construction over the host's Vulkan device.

use std::sync::Arc;

use canvas_host::{BridgeError, BridgeResult, HostImage};
use vk_interop::{DriverHandles, FunctionTable, VkImageDescription};

use crate::paint::Painter;

/// Everything needed to bind a GPU context to the host's device and wrap
/// one of its images as a render target.
#[derive(Debug, Clone)]
pub struct GpuSurfaceRequest {
    pub handles: DriverHandles,
    pub functions: Arc<FunctionTable>,
    pub image: VkImageDescription,
}

/// A render target living in a host-owned GPU image.
pub trait GpuCanvas {
    fn painter(&mut self) -> &mut dyn Painter;

    /// Submit recorded work. Content becomes visible to the host's next use
    /// of the image.
    fn flush(&mut self) -> BridgeResult<()>;

    /// Read back the current content as RGBA8, if the backend supports it.
    fn snapshot(&mut self) -> Option<HostImage>;

    /// Drop the render target and then the context. Must be idempotent.
    fn release(&mut self);
}

/// Builds GPU canvases from a [`GpuSurfaceRequest`].
pub trait GpuBackend {
    fn name(&self) -> &str;

    fn create_surface(&self, request: GpuSurfaceRequest) -> BridgeResult<Box<dyn GpuCanvas>>;
}

/// Backend used when no GPU backend is compiled in. Every attempt fails
/// with `ContextCreationFailed`, which callers treat as a reason to fall back.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableBackend;

impl GpuBackend for UnavailableBackend {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn create_surface(&self, _request: GpuSurfaceRequest) -> BridgeResult<Box<dyn GpuCanvas>> {
        Err(BridgeError::context_creation(
            "no GPU backend compiled in (enable the `vulkan` feature)",
        ))
    }
}

/// The best backend this build offers.
pub fn default_backend() -> Box<dyn GpuBackend> {
    #[cfg(feature = "vulkan")]
    {
        Box::new(crate::skia::SkiaVulkanBackend::default())
    }
    #[cfg(not(feature = "vulkan"))]
    {
        Box::new(UnavailableBackend)
    }
}
