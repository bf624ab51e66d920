//! Drawing commands shared by the GPU and CPU canvases.

use vello_cpu::kurbo::{Affine, BezPath, Circle, Point, Rect, Shape, Stroke};

pub use vello_cpu::kurbo;
pub use vello_cpu::peniko::Color;

/// Tolerance used when flattening shapes into paths.
pub const SHAPE_TOLERANCE: f64 = 0.1;

/// 2D vector drawing target.
///
/// Coordinates are in pixels with the origin at the top-left of the texture.
/// Colors are straight (non-premultiplied) sRGB; each backend premultiplies
/// as it needs to.
pub trait Painter {
    /// Replace every pixel with `color`, discarding anything drawn so far.
    fn clear(&mut self, color: Color);

    fn set_transform(&mut self, transform: Affine);

    fn transform(&self) -> Affine;

    fn fill_path(&mut self, path: &BezPath, color: Color);

    fn stroke_path(&mut self, path: &BezPath, stroke: &Stroke, color: Color);

    fn fill_rect(&mut self, rect: &Rect, color: Color) {
        self.fill_path(&rect.to_path(SHAPE_TOLERANCE), color);
    }

    fn stroke_rect(&mut self, rect: &Rect, stroke: &Stroke, color: Color) {
        self.stroke_path(&rect.to_path(SHAPE_TOLERANCE), stroke, color);
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        let circle = Circle::new(center, radius);
        self.fill_path(&circle.to_path(SHAPE_TOLERANCE), color);
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, stroke: &Stroke, color: Color) {
        let circle = Circle::new(center, radius);
        self.stroke_path(&circle.to_path(SHAPE_TOLERANCE), stroke, color);
    }
}

/// Convenience methods for any [`kurbo::Shape`].
pub trait PainterExt: Painter {
    fn fill_shape(&mut self, shape: &impl Shape, color: Color) {
        self.fill_path(&shape.to_path(SHAPE_TOLERANCE), color);
    }

    fn stroke_shape(&mut self, shape: &impl Shape, stroke: &Stroke, color: Color) {
        self.stroke_path(&shape.to_path(SHAPE_TOLERANCE), stroke, color);
    }

    fn stroke_line(&mut self, from: Point, to: Point, stroke: &Stroke, color: Color) {
        let mut path = BezPath::new();
        path.move_to(from);
        path.line_to(to);
        self.stroke_path(&path, stroke, color);
    }
}

impl<P: Painter + ?Sized> PainterExt for P {}

/// Premultiplied RGBA8 bytes for `color`.
pub fn premultiplied_rgba8(color: Color) -> [u8; 4] {
    let c = color.to_rgba8();
    let a = u16::from(c.a);
    [
        mul_div255(u16::from(c.r), a),
        mul_div255(u16::from(c.g), a),
        mul_div255(u16::from(c.b), a),
        c.a,
    ]
}

pub(crate) fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}
