//! Skia GPU backend bound to the host's Vulkan device.
//!
//! The Skia context is created from the host's instance, physical device,
//! device and graphics queue, with every Vulkan entry point resolved through
//! the driver's function table. The host image is then wrapped as a backend
//! render target, so drawing lands directly in the host's texture.

use std::ffi::{c_void, CStr};

use canvas_host::{BridgeError, BridgeResult, HostImage, NativeHandle, TextureFormat};
use skia_safe::gpu::{self, vk, DirectContext, SurfaceOrigin};
use skia_safe::paint::{Cap as SkCap, Join as SkJoin};
use skia_safe::{
    AlphaType, Color4f, ColorType, ImageInfo, Matrix, Paint, PaintStyle, Path, PathEffect,
    Surface,
};
use tracing::{debug, error, warn};
use vello_cpu::kurbo::{Affine, BezPath, Cap, Join, PathEl, Stroke};
use vello_cpu::peniko::Color;
use vk_interop::image::{VK_FORMAT_B8G8R8A8_UNORM, VK_FORMAT_R8G8B8A8_UNORM};

use crate::gpu::{GpuBackend, GpuCanvas, GpuSurfaceRequest};
use crate::paint::Painter;

#[derive(Debug, Default, Clone, Copy)]
pub struct SkiaVulkanBackend;

impl GpuBackend for SkiaVulkanBackend {
    fn name(&self) -> &str {
        "skia-vulkan"
    }

    fn create_surface(&self, request: GpuSurfaceRequest) -> BridgeResult<Box<dyn GpuCanvas>> {
        let GpuSurfaceRequest {
            handles,
            functions,
            image,
        } = request;

        let format = match image.format {
            VK_FORMAT_R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
            VK_FORMAT_B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
            other => {
                return Err(BridgeError::surface_creation(format!(
                    "unsupported image format {other}"
                )))
            }
        };

        let get_proc = |of: vk::GetProcOf| -> *const c_void {
            // SAFETY: Skia passes null or live handles of the context being
            // created, and NUL-terminated command names.
            unsafe {
                match of {
                    vk::GetProcOf::Instance(instance, name) => functions.proc_address_c(
                        CStr::from_ptr(name),
                        NativeHandle::from_ptr(instance as *const c_void),
                        NativeHandle::NULL,
                    ),
                    vk::GetProcOf::Device(device, name) => functions.proc_address_c(
                        CStr::from_ptr(name),
                        NativeHandle::NULL,
                        NativeHandle::from_ptr(device as *const c_void),
                    ),
                }
            }
        };

        // SAFETY: all handles were resolved from the host's live device.
        let backend = unsafe {
            vk::BackendContext::new(
                handles.instance.as_ptr() as _,
                handles.physical_device.as_ptr() as _,
                handles.device.as_ptr() as _,
                (
                    handles.queue.as_ptr() as _,
                    handles.queue_family_index as usize,
                ),
                &get_proc,
            )
        };

        let mut context = gpu::direct_contexts::make_vulkan(&backend, None).ok_or_else(|| {
            error!("Skia rejected the host Vulkan device");
            BridgeError::context_creation("Skia could not create a Vulkan context")
        })?;
        debug!(library = functions.library(), "Skia Vulkan context created");

        // SAFETY: the image is owned by the host and outlives this surface.
        let mut info = unsafe {
            vk::ImageInfo::new(
                image.image.as_raw() as vk::Image,
                vk::Alloc::default(),
                vk::ImageTiling::OPTIMAL,
                vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                format,
                image.level_count,
                image.current_queue_family,
                None,
                None,
                None,
            )
        };
        info.fImageUsageFlags = image.usage_flags;
        info.fSampleCount = image.sample_count;

        let target = gpu::backend_render_targets::make_vk(
            (image.width as i32, image.height as i32),
            &info,
        );
        let surface = gpu::surfaces::wrap_backend_render_target(
            &mut context,
            &target,
            SurfaceOrigin::TopLeft,
            ColorType::RGBA8888,
            None,
            None,
        )
        .ok_or_else(|| {
            BridgeError::surface_creation(format!(
                "Skia could not wrap {}x{} image {:?}",
                image.width, image.height, image.image
            ))
        })?;

        Ok(Box::new(SkiaCanvas {
            surface: Some(surface),
            context: Some(context),
            transform: Affine::IDENTITY,
            width: image.width,
            height: image.height,
        }))
    }
}

/// Skia surface over a host image. Field order matters only for `release`,
/// which drops the surface before the context.
struct SkiaCanvas {
    surface: Option<Surface>,
    context: Option<DirectContext>,
    transform: Affine,
    width: u32,
    height: u32,
}

impl SkiaCanvas {
    fn with_canvas(&mut self, f: impl FnOnce(&skia_safe::Canvas)) {
        match self.surface.as_mut() {
            Some(surface) => f(surface.canvas()),
            None => warn!("draw on released Skia surface ignored"),
        }
    }
}

impl GpuCanvas for SkiaCanvas {
    fn painter(&mut self) -> &mut dyn Painter {
        self
    }

    fn flush(&mut self) -> BridgeResult<()> {
        let context = self
            .context
            .as_mut()
            .ok_or(BridgeError::UseAfterDispose)?;
        context.flush_and_submit();
        Ok(())
    }

    fn snapshot(&mut self) -> Option<HostImage> {
        let surface = self.surface.as_mut()?;
        let info = ImageInfo::new(
            (self.width as i32, self.height as i32),
            ColorType::RGBA8888,
            AlphaType::Premul,
            None,
        );
        let row_bytes = self.width as usize * 4;
        let mut data = vec![0u8; row_bytes * self.height as usize];
        if !surface.read_pixels(&info, &mut data, row_bytes, (0, 0)) {
            warn!("Skia surface read-back failed");
            return None;
        }
        HostImage::from_data(self.width, self.height, TextureFormat::Rgba8, data).ok()
    }

    fn release(&mut self) {
        self.surface.take();
        if self.context.take().is_some() {
            debug!("Skia Vulkan context released");
        }
    }
}

impl Painter for SkiaCanvas {
    fn clear(&mut self, color: Color) {
        self.with_canvas(|canvas| {
            canvas.clear(color4f(color));
        });
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
        let matrix = to_matrix(transform);
        self.with_canvas(|canvas| {
            canvas.reset_matrix();
            canvas.concat(&matrix);
        });
    }

    fn transform(&self) -> Affine {
        self.transform
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        let mut paint = Paint::new(color4f(color), None);
        paint.set_anti_alias(true);
        paint.set_style(PaintStyle::Fill);
        let path = to_path(path);
        self.with_canvas(|canvas| {
            canvas.draw_path(&path, &paint);
        });
    }

    fn stroke_path(&mut self, path: &BezPath, stroke: &Stroke, color: Color) {
        let mut paint = Paint::new(color4f(color), None);
        paint.set_anti_alias(true);
        paint.set_style(PaintStyle::Stroke);
        apply_stroke(&mut paint, stroke);
        let path = to_path(path);
        self.with_canvas(|canvas| {
            canvas.draw_path(&path, &paint);
        });
    }
}

fn color4f(color: Color) -> Color4f {
    let [r, g, b, a] = color.components;
    Color4f::new(r, g, b, a)
}

/// Carry the whole kurbo stroke style over to a Skia paint. Skia has one cap
/// for both ends, so the start cap wins.
fn apply_stroke(paint: &mut Paint, stroke: &Stroke) {
    paint.set_stroke_width(stroke.width as f32);
    paint.set_stroke_miter(stroke.miter_limit as f32);
    paint.set_stroke_join(match stroke.join {
        Join::Bevel => SkJoin::Bevel,
        Join::Miter => SkJoin::Miter,
        Join::Round => SkJoin::Round,
    });
    paint.set_stroke_cap(match stroke.start_cap {
        Cap::Butt => SkCap::Butt,
        Cap::Square => SkCap::Square,
        Cap::Round => SkCap::Round,
    });

    if stroke.dash_pattern.is_empty() {
        paint.set_path_effect(None);
        return;
    }
    let mut intervals: Vec<f32> = stroke.dash_pattern.iter().map(|d| *d as f32).collect();
    // Skia wants on/off pairs.
    if intervals.len() % 2 == 1 {
        intervals.extend_from_within(..);
    }
    match PathEffect::dash(&intervals, stroke.dash_offset as f32) {
        Some(effect) => {
            paint.set_path_effect(effect);
        }
        None => warn!(?intervals, "Skia rejected dash pattern, stroking solid"),
    }
}

fn to_matrix(a: Affine) -> Matrix {
    let [sx, ky, kx, sy, tx, ty] = a.as_coeffs();
    Matrix::new_all(
        sx as f32, kx as f32, tx as f32, ky as f32, sy as f32, ty as f32, 0.0, 0.0, 1.0,
    )
}

fn to_path(path: &BezPath) -> Path {
    let mut out = Path::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                out.move_to((p.x as f32, p.y as f32));
            }
            PathEl::LineTo(p) => {
                out.line_to((p.x as f32, p.y as f32));
            }
            PathEl::QuadTo(p1, p2) => {
                out.quad_to((p1.x as f32, p1.y as f32), (p2.x as f32, p2.y as f32));
            }
            PathEl::CurveTo(p1, p2, p3) => {
                out.cubic_to(
                    (p1.x as f32, p1.y as f32),
                    (p2.x as f32, p2.y as f32),
                    (p3.x as f32, p3.y as f32),
                );
            }
            PathEl::ClosePath => {
                out.close();
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroked(stroke: &Stroke) -> Paint {
        let mut paint = Paint::default();
        paint.set_style(PaintStyle::Stroke);
        apply_stroke(&mut paint, stroke);
        paint
    }

    #[test]
    fn joins_caps_and_miter_carry_over() {
        let stroke = Stroke::new(3.0)
            .with_join(Join::Round)
            .with_caps(Cap::Square)
            .with_miter_limit(7.0);
        let paint = stroked(&stroke);
        assert_eq!(paint.stroke_width(), 3.0);
        assert_eq!(paint.stroke_join(), SkJoin::Round);
        assert_eq!(paint.stroke_cap(), SkCap::Square);
        assert_eq!(paint.stroke_miter(), 7.0);
        assert!(paint.path_effect().is_none());
    }

    #[test]
    fn bevel_butt_defaults_map_exactly() {
        let paint = stroked(&Stroke::new(1.0).with_join(Join::Bevel).with_caps(Cap::Butt));
        assert_eq!(paint.stroke_join(), SkJoin::Bevel);
        assert_eq!(paint.stroke_cap(), SkCap::Butt);
    }

    #[test]
    fn dashes_become_a_path_effect() {
        let paint = stroked(&Stroke::new(2.0).with_dashes(1.0, [4.0, 2.0]));
        assert!(paint.path_effect().is_some());

        // An odd pattern is repeated to form on/off pairs.
        let paint = stroked(&Stroke::new(2.0).with_dashes(0.0, [5.0]));
        assert!(paint.path_effect().is_some());
    }
}
