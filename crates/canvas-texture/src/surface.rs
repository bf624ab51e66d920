//! Render surface owning exactly one GPU or CPU backing.

use canvas_host::{BridgeError, BridgeResult, HostImage, HostTextureSlot, TextureFormat, TextureId};
use tracing::{debug, warn};

use crate::cpu::CpuCanvas;
use crate::gpu::{GpuBackend, GpuCanvas, GpuSurfaceRequest};
use crate::paint::Painter;
use crate::sync::{sync_to_host, SyncOutcome};

/// Lifecycle state of a [`RenderSurface`].
///
/// A surface starts in `GpuBound` or `CpuBound` and only ever moves to
/// `Disposed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    GpuBound,
    CpuBound,
    Disposed,
}

pub(crate) enum Backing {
    Gpu(Box<dyn GpuCanvas>),
    Cpu(CpuCanvas),
    Disposed,
}

/// A drawable surface with its dirty flag.
///
/// The flag starts set so the first sync always pushes content, is set again
/// by every draw and cleared by every successful sync.
pub struct RenderSurface {
    backing: Backing,
    width: u32,
    height: u32,
    dirty: bool,
}

/// Check that `width` x `height` fits the CPU rasterizer.
pub(crate) fn checked_dimensions(width: u32, height: u32) -> BridgeResult<(u16, u16)> {
    let w = u16::try_from(width).ok().filter(|w| *w > 0);
    let h = u16::try_from(height).ok().filter(|h| *h > 0);
    match (w, h) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(BridgeError::InvalidDimensions { width, height }),
    }
}

impl RenderSurface {
    /// A transparent software surface.
    pub fn cpu(width: u32, height: u32) -> BridgeResult<Self> {
        let (w, h) = checked_dimensions(width, height)?;
        debug!(width, height, "CPU render surface created");
        Ok(Self {
            backing: Backing::Cpu(CpuCanvas::new(w, h)),
            width,
            height,
            dirty: true,
        })
    }

    /// A surface rendering directly into the requested host image.
    pub fn gpu(backend: &dyn GpuBackend, request: GpuSurfaceRequest) -> BridgeResult<Self> {
        let (width, height) = (request.image.width, request.image.height);
        checked_dimensions(width, height)?;
        let canvas = backend.create_surface(request)?;
        debug!(width, height, backend = backend.name(), "GPU render surface created");
        Ok(Self {
            backing: Backing::Gpu(canvas),
            width,
            height,
            dirty: true,
        })
    }

    pub fn state(&self) -> SurfaceState {
        match self.backing {
            Backing::Gpu(_) => SurfaceState::GpuBound,
            Backing::Cpu(_) => SurfaceState::CpuBound,
            Backing::Disposed => SurfaceState::Disposed,
        }
    }

    pub fn is_gpu(&self) -> bool {
        self.state() == SurfaceState::GpuBound
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) -> BridgeResult<()> {
        self.ensure_live()?;
        self.dirty = true;
        Ok(())
    }

    /// Run `f` against the surface's painter and mark the surface dirty.
    pub fn draw<R>(&mut self, f: impl FnOnce(&mut dyn Painter) -> R) -> BridgeResult<R> {
        let painter: &mut dyn Painter = match &mut self.backing {
            Backing::Gpu(canvas) => canvas.painter(),
            Backing::Cpu(canvas) => canvas,
            Backing::Disposed => return Err(BridgeError::UseAfterDispose),
        };
        let out = f(painter);
        self.dirty = true;
        Ok(out)
    }

    /// Premultiplied RGBA8 bytes of a CPU surface, including pending draws.
    /// `None` for GPU surfaces, whose pixels live in the host image.
    pub fn pixel_buffer(&mut self) -> BridgeResult<Option<&[u8]>> {
        match &mut self.backing {
            Backing::Gpu(_) => Ok(None),
            Backing::Cpu(canvas) => {
                canvas.rasterize();
                Ok(Some(canvas.pixels()))
            }
            Backing::Disposed => Err(BridgeError::UseAfterDispose),
        }
    }

    /// Snapshot of the current content as premultiplied RGBA8.
    ///
    /// GPU surfaces read back through the backend; if that is unsupported
    /// the snapshot is a blank image of the right size.
    pub fn image(&mut self) -> BridgeResult<HostImage> {
        let (width, height) = (self.width, self.height);
        match &mut self.backing {
            Backing::Gpu(canvas) => Ok(canvas
                .snapshot()
                .unwrap_or_else(|| HostImage::empty(width, height, TextureFormat::Rgba8))),
            Backing::Cpu(canvas) => {
                canvas.rasterize();
                HostImage::from_data(width, height, TextureFormat::Rgba8, canvas.pixels().to_vec())
            }
            Backing::Disposed => Err(BridgeError::UseAfterDispose),
        }
    }

    /// Push rendered content to `texture`. See [`sync_to_host`].
    pub fn sync<S: HostTextureSlot + ?Sized>(
        &mut self,
        slot: &mut S,
        texture: TextureId,
    ) -> BridgeResult<SyncOutcome> {
        sync_to_host(self, slot, texture)
    }

    /// Release the backing. GPU surfaces drop the render target before the
    /// context. A second call fails with `UseAfterDispose`.
    pub fn dispose(&mut self) -> BridgeResult<()> {
        match std::mem::replace(&mut self.backing, Backing::Disposed) {
            Backing::Gpu(mut canvas) => {
                canvas.release();
                debug!("GPU render surface disposed");
                Ok(())
            }
            Backing::Cpu(_) => {
                debug!("CPU render surface disposed");
                Ok(())
            }
            Backing::Disposed => Err(BridgeError::UseAfterDispose),
        }
    }

    pub(crate) fn backing_mut(&mut self) -> &mut Backing {
        &mut self.backing
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    fn ensure_live(&self) -> BridgeResult<()> {
        match self.backing {
            Backing::Disposed => Err(BridgeError::UseAfterDispose),
            _ => Ok(()),
        }
    }
}

impl Drop for RenderSurface {
    fn drop(&mut self) {
        if let Backing::Gpu(canvas) = &mut self.backing {
            warn!("GPU render surface dropped without dispose");
            canvas.release();
        }
    }
}

impl std::fmt::Debug for RenderSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSurface")
            .field("state", &self.state())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("dirty", &self.dirty)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vello_cpu::kurbo::Rect;
    use vello_cpu::peniko::Color;

    #[test]
    fn rejects_out_of_range_dimensions() {
        for (w, h) in [(0, 4), (4, 0), (70_000, 4)] {
            match RenderSurface::cpu(w, h) {
                Err(BridgeError::InvalidDimensions { width, height }) => {
                    assert_eq!((width, height), (w, h));
                }
                other => panic!("expected InvalidDimensions, got {other:?}"),
            }
        }
        assert!(RenderSurface::cpu(u16::MAX as u32, 1).is_ok());
    }

    #[test]
    fn starts_dirty_and_draws_keep_it_dirty() {
        let mut surface = RenderSurface::cpu(8, 8).unwrap();
        assert_eq!(surface.state(), SurfaceState::CpuBound);
        assert!(surface.is_dirty());
        surface.clear_dirty();
        assert!(!surface.is_dirty());

        surface
            .draw(|p| p.fill_rect(&Rect::new(0.0, 0.0, 2.0, 2.0), Color::from_rgba8(1, 2, 3, 255)))
            .unwrap();
        assert!(surface.is_dirty());
    }

    #[test]
    fn pixel_buffer_includes_pending_draws() {
        let mut surface = RenderSurface::cpu(4, 4).unwrap();
        surface
            .draw(|p| p.fill_rect(&Rect::new(0.0, 0.0, 4.0, 4.0), Color::from_rgba8(0, 0, 255, 255)))
            .unwrap();
        let pixels = surface.pixel_buffer().unwrap().unwrap();
        assert_eq!(&pixels[..4], &[0, 0, 255, 255]);
    }

    #[test]
    fn dispose_is_terminal() {
        let mut surface = RenderSurface::cpu(4, 4).unwrap();
        surface.dispose().unwrap();
        assert_eq!(surface.state(), SurfaceState::Disposed);
        assert!(matches!(surface.dispose(), Err(BridgeError::UseAfterDispose)));
        assert!(matches!(surface.mark_dirty(), Err(BridgeError::UseAfterDispose)));
        assert!(matches!(surface.image(), Err(BridgeError::UseAfterDispose)));
        assert!(matches!(surface.draw(|_| ()), Err(BridgeError::UseAfterDispose)));
    }
}
