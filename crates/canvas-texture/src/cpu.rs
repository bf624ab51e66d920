//! Software canvas backed by `vello_cpu`.
//!
//! Draw calls are recorded into a `vello_cpu::RenderContext`. Nothing is
//! rasterized until [`CpuCanvas::rasterize`], which renders the pending
//! commands into a scratch pixmap and composites it (premultiplied source
//! over) onto the persistent buffer. The buffer therefore keeps whatever was
//! drawn in earlier frames until [`Painter::clear`] replaces it.

use vello_cpu::kurbo::{Affine, BezPath, Rect, Stroke};
use vello_cpu::peniko::Color;
use vello_cpu::{Pixmap, RenderContext};

use crate::paint::{mul_div255, premultiplied_rgba8, Painter};

pub struct CpuCanvas {
    ctx: RenderContext,
    buffer: Pixmap,
    scratch: Pixmap,
    transform: Affine,
    pending: bool,
}

impl CpuCanvas {
    /// A fully transparent canvas.
    pub fn new(width: u16, height: u16) -> Self {
        let mut buffer = Pixmap::new(width, height);
        clear_pixmap_to_transparent(&mut buffer);
        Self {
            ctx: RenderContext::new(width, height),
            buffer,
            scratch: Pixmap::new(width, height),
            transform: Affine::IDENTITY,
            pending: false,
        }
    }

    pub fn width(&self) -> u16 {
        self.buffer.width()
    }

    pub fn height(&self) -> u16 {
        self.buffer.height()
    }

    /// Whether draw commands are waiting to be rasterized.
    pub fn has_pending(&self) -> bool {
        self.pending
    }

    /// Premultiplied RGBA8 rows, top to bottom. Does not include pending
    /// commands; call [`CpuCanvas::rasterize`] first.
    pub fn pixels(&self) -> &[u8] {
        self.buffer.data_as_u8_slice()
    }

    /// Render pending commands and composite them onto the buffer.
    pub fn rasterize(&mut self) {
        if !self.pending {
            return;
        }
        self.ctx.flush();
        clear_pixmap_to_transparent(&mut self.scratch);
        self.ctx.render_to_pixmap(&mut self.scratch);
        premul_over_in_place(
            self.buffer.data_as_u8_slice_mut(),
            self.scratch.data_as_u8_slice(),
        );
        self.reset_context();
    }

    fn reset_context(&mut self) {
        self.ctx.reset();
        self.ctx.set_transform(self.transform);
        self.pending = false;
    }
}

impl Painter for CpuCanvas {
    fn clear(&mut self, color: Color) {
        let px = premultiplied_rgba8(color);
        for chunk in self.buffer.data_as_u8_slice_mut().chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
        self.reset_context();
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
        self.ctx.set_transform(transform);
    }

    fn transform(&self) -> Affine {
        self.transform
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.ctx.set_paint(color);
        self.ctx.fill_path(path);
        self.pending = true;
    }

    fn stroke_path(&mut self, path: &BezPath, stroke: &Stroke, color: Color) {
        self.ctx.set_stroke(stroke.clone());
        self.ctx.set_paint(color);
        self.ctx.stroke_path(path);
        self.pending = true;
    }

    fn fill_rect(&mut self, rect: &Rect, color: Color) {
        self.ctx.set_paint(color);
        self.ctx.fill_rect(rect);
        self.pending = true;
    }
}

impl std::fmt::Debug for CpuCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuCanvas")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("pending", &self.pending)
            .finish()
    }
}

fn clear_pixmap_to_transparent(pixmap: &mut Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

/// Premultiplied source-over of `src` onto `dst`. Both are RGBA8 buffers of
/// equal length.
pub(crate) fn premul_over_in_place(dst: &mut [u8], src: &[u8]) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let sa = u16::from(s[3]);
        if sa == 0 {
            continue;
        }
        let inv = 255 - sa;
        d[3] = (sa as u8).saturating_add(mul_div255(u16::from(d[3]), inv));
        for c in 0..3 {
            d[c] = s[c].saturating_add(mul_div255(u16::from(d[c]), inv));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vello_cpu::kurbo::Point;

    fn px(canvas: &CpuCanvas, x: usize, y: usize) -> [u8; 4] {
        let i = (y * canvas.width() as usize + x) * 4;
        let p = canvas.pixels();
        [p[i], p[i + 1], p[i + 2], p[i + 3]]
    }

    fn close(a: [u8; 4], b: [u8; 4]) -> bool {
        a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= 2)
    }

    #[test]
    fn new_canvas_is_transparent() {
        let canvas = CpuCanvas::new(16, 8);
        assert_eq!(canvas.pixels().len(), 16 * 8 * 4);
        assert!(canvas.pixels().iter().all(|b| *b == 0));
        assert!(!canvas.has_pending());
    }

    #[test]
    fn draws_are_deferred_until_rasterize() {
        let mut canvas = CpuCanvas::new(8, 8);
        canvas.fill_rect(&Rect::new(0.0, 0.0, 8.0, 8.0), Color::from_rgba8(255, 0, 0, 255));
        assert!(canvas.has_pending());
        assert_eq!(px(&canvas, 4, 4), [0, 0, 0, 0]);

        canvas.rasterize();
        assert!(!canvas.has_pending());
        assert_eq!(px(&canvas, 4, 4), [255, 0, 0, 255]);
    }

    #[test]
    fn content_persists_across_frames() {
        let mut canvas = CpuCanvas::new(16, 16);
        canvas.fill_rect(&Rect::new(0.0, 0.0, 8.0, 16.0), Color::from_rgba8(0, 0, 255, 255));
        canvas.rasterize();
        canvas.fill_rect(&Rect::new(8.0, 0.0, 16.0, 16.0), Color::from_rgba8(0, 255, 0, 255));
        canvas.rasterize();

        assert_eq!(px(&canvas, 2, 8), [0, 0, 255, 255]);
        assert_eq!(px(&canvas, 12, 8), [0, 255, 0, 255]);
    }

    #[test]
    fn translucent_draws_composite_over_existing_content() {
        let mut canvas = CpuCanvas::new(4, 4);
        canvas.clear(Color::from_rgba8(255, 255, 255, 255));
        canvas.fill_rect(&Rect::new(0.0, 0.0, 4.0, 4.0), Color::from_rgba8(0, 0, 0, 128));
        canvas.rasterize();
        assert!(close(px(&canvas, 1, 1), [127, 127, 127, 255]));
    }

    #[test]
    fn clear_replaces_buffer_and_drops_pending() {
        let mut canvas = CpuCanvas::new(4, 4);
        canvas.fill_rect(&Rect::new(0.0, 0.0, 4.0, 4.0), Color::from_rgba8(255, 0, 0, 255));
        canvas.clear(Color::from_rgba8(255, 255, 255, 128));
        assert!(!canvas.has_pending());
        canvas.rasterize();
        assert_eq!(px(&canvas, 0, 0), [128, 128, 128, 128]);
    }

    #[test]
    fn transform_applies_to_later_draws_and_survives_rasterize() {
        let mut canvas = CpuCanvas::new(16, 16);
        canvas.set_transform(Affine::translate((8.0, 8.0)));
        canvas.fill_rect(&Rect::new(0.0, 0.0, 4.0, 4.0), Color::from_rgba8(255, 0, 0, 255));
        canvas.rasterize();
        assert_eq!(px(&canvas, 1, 1), [0, 0, 0, 0]);
        assert_eq!(px(&canvas, 10, 10), [255, 0, 0, 255]);

        canvas.fill_circle(Point::new(0.0, 0.0), 2.0, Color::from_rgba8(0, 255, 0, 255));
        canvas.rasterize();
        assert_eq!(canvas.transform(), Affine::translate((8.0, 8.0)));
        assert_eq!(px(&canvas, 8, 8)[1], 255);
    }

    #[test]
    fn premul_over_skips_transparent_source() {
        let mut dst = [10, 20, 30, 40, 10, 20, 30, 40];
        premul_over_in_place(&mut dst, &[255, 255, 255, 0, 255, 0, 0, 255]);
        assert_eq!(dst, [10, 20, 30, 40, 255, 0, 0, 255]);
    }
}
