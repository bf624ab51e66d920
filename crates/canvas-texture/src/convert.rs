//! Conversions between host value types and drawing types.

use canvas_host::{BridgeResult, HostColor, HostImage, Rect2, Transform2D, Vec2};
use vello_cpu::kurbo::{Affine, Point, Rect, Size};
use vello_cpu::peniko::Color;

use crate::paint::mul_div255;

pub fn color(c: HostColor) -> Color {
    Color::new([c.r, c.g, c.b, c.a])
}

pub fn host_color(c: Color) -> HostColor {
    let [r, g, b, a] = c.components;
    HostColor::new(r, g, b, a)
}

pub fn point(v: Vec2) -> Point {
    Point::new(f64::from(v.x), f64::from(v.y))
}

pub fn vec2(p: Point) -> Vec2 {
    Vec2::new(p.x as f32, p.y as f32)
}

pub fn size(v: Vec2) -> Size {
    Size::new(f64::from(v.x), f64::from(v.y))
}

pub fn rect(r: Rect2) -> Rect {
    Rect::from_origin_size(point(r.position), size(r.size))
}

pub fn rect2(r: Rect) -> Rect2 {
    Rect2::new(r.x0 as f32, r.y0 as f32, r.width() as f32, r.height() as f32)
}

/// The host's column vectors `x`, `y` and `origin` map to the affine
/// coefficients `[a b c d e f]` in that order.
pub fn affine(t: Transform2D) -> Affine {
    Affine::new([
        f64::from(t.x.x),
        f64::from(t.x.y),
        f64::from(t.y.x),
        f64::from(t.y.y),
        f64::from(t.origin.x),
        f64::from(t.origin.y),
    ])
}

pub fn transform2d(a: Affine) -> Transform2D {
    let [xx, xy, yx, yy, ox, oy] = a.as_coeffs();
    Transform2D {
        x: Vec2::new(xx as f32, xy as f32),
        y: Vec2::new(yx as f32, yy as f32),
        origin: Vec2::new(ox as f32, oy as f32),
    }
}

/// Opaque color from hue in degrees (`0..=360`) and saturation / lightness
/// in percent (`0..=100`).
pub fn color_from_hsl(h: f32, s: f32, l: f32) -> Color {
    let h = h.rem_euclid(360.0) / 360.0;
    let s = (s / 100.0).clamp(0.0, 1.0);
    let l = (l / 100.0).clamp(0.0, 1.0);

    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_rgb(p, q, h + 1.0 / 3.0),
            hue_to_rgb(p, q, h),
            hue_to_rgb(p, q, h - 1.0 / 3.0),
        )
    };
    Color::from_rgba8(to_u8(r), to_u8(g), to_u8(b), 255)
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub fn premultiply_rgba8_in_place(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = mul_div255(u16::from(*c), a);
        }
    }
}

pub fn unpremultiply_rgba8_in_place(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

/// Straight-alpha copy of a premultiplied image, e.g. for encoding.
pub fn unpremultiplied(image: &HostImage) -> BridgeResult<HostImage> {
    let mut data = image.data().to_vec();
    unpremultiply_rgba8_in_place(&mut data);
    HostImage::from_data(image.width(), image.height(), image.format(), data)
}

/// Premultiplied copy of a straight-alpha host image.
pub fn premultiplied(image: &HostImage) -> BridgeResult<HostImage> {
    let mut data = image.data().to_vec();
    premultiply_rgba8_in_place(&mut data);
    HostImage::from_data(image.width(), image.height(), image.format(), data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_round_trips() {
        let r = Rect2::new(10.0, 20.0, 30.0, 40.0);
        let k = rect(r);
        assert_eq!(k, Rect::new(10.0, 20.0, 40.0, 60.0));
        assert_eq!(rect2(k), r);
        assert_eq!(vec2(point(Vec2::new(1.5, -2.0))), Vec2::new(1.5, -2.0));
    }

    #[test]
    fn transform_maps_columns_to_coefficients() {
        let t = Transform2D {
            x: Vec2::new(2.0, 0.0),
            y: Vec2::new(0.0, 3.0),
            origin: Vec2::new(5.0, 7.0),
        };
        let a = affine(t);
        assert_eq!(a * Point::new(1.0, 1.0), Point::new(7.0, 10.0));
        assert_eq!(transform2d(a), t);
        assert_eq!(affine(Transform2D::IDENTITY), Affine::IDENTITY);
    }

    #[test]
    fn host_colors_convert() {
        let c = HostColor::new(1.0, 0.5, 0.0, 0.25);
        assert_eq!(host_color(color(c)), c);
        assert_eq!(color(HostColor::WHITE).to_rgba8().a, 255);
    }

    #[test]
    fn hsl_primaries() {
        let rgba = |c: Color| {
            let c = c.to_rgba8();
            [c.r, c.g, c.b, c.a]
        };
        assert_eq!(rgba(color_from_hsl(0.0, 100.0, 50.0)), [255, 0, 0, 255]);
        assert_eq!(rgba(color_from_hsl(120.0, 100.0, 50.0)), [0, 255, 0, 255]);
        assert_eq!(rgba(color_from_hsl(240.0, 100.0, 50.0)), [0, 0, 255, 255]);
        assert_eq!(rgba(color_from_hsl(360.0, 100.0, 50.0)), [255, 0, 0, 255]);
        assert_eq!(rgba(color_from_hsl(90.0, 0.0, 100.0)), [255, 255, 255, 255]);
        assert_eq!(rgba(color_from_hsl(200.0, 50.0, 0.0)), [0, 0, 0, 255]);
    }

    #[test]
    fn premultiply_and_back() {
        let mut px = [255, 128, 0, 128, 10, 20, 30, 0];
        premultiply_rgba8_in_place(&mut px);
        assert_eq!(px, [128, 64, 0, 128, 0, 0, 0, 0]);
        unpremultiply_rgba8_in_place(&mut px);
        assert_eq!(px, [255, 128, 0, 128, 0, 0, 0, 0]);
    }
}
