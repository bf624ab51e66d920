//! Draws a demo scene into a canvas texture on a headless host and writes
//! the texture content as a PNG.
//!
//! ```text
//! CANVAS_LOG=debug cargo run -p canvas-shapes -- --mode animated --frames 90 --out spin.png
//! ```

use std::f64::consts::PI;
use std::path::PathBuf;

use anyhow::Context as _;
use canvas_host::headless::HeadlessHost;
use canvas_host::logging;
use canvas_texture::convert::{color_from_hsl, unpremultiplied};
use canvas_texture::kurbo::{BezPath, Ellipse, Point, Rect, RoundedRect, Stroke};
use canvas_texture::{BackendPreference, CanvasConfig, CanvasTexture, Color, Painter, PainterExt};
use clap::{Parser, ValueEnum};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "canvas-shapes", version)]
struct Cli {
    /// Scene to draw.
    #[arg(long, value_enum, default_value_t = Scene::Shapes)]
    mode: Scene,

    #[arg(long, default_value_t = 512)]
    width: u32,

    #[arg(long, default_value_t = 512)]
    height: u32,

    /// Hue in degrees.
    #[arg(long, default_value_t = 200.0)]
    hue: f32,

    /// Saturation in percent.
    #[arg(long, default_value_t = 80.0)]
    saturation: f32,

    /// Lightness in percent.
    #[arg(long, default_value_t = 50.0)]
    lightness: f32,

    #[arg(long, default_value_t = 2.0)]
    line_width: f64,

    /// Frames to simulate at 60 fps (animated scene only).
    #[arg(long, default_value_t = 1)]
    frames: u32,

    /// Backend name the headless host reports. `vulkan` exercises the GPU
    /// setup path, which falls back to the CPU without a real device.
    #[arg(long, default_value = "opengl3")]
    backend: String,

    /// Skip GPU setup even on a Vulkan host.
    #[arg(long, default_value_t = false)]
    force_cpu: bool,

    /// Output PNG path.
    #[arg(long, default_value = "canvas.png")]
    out: PathBuf,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Scene {
    Shapes,
    Animated,
}

struct Style {
    color: Color,
    stroke: Stroke,
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    let mut host = HeadlessHost::new(cli.backend.clone());
    let mut config = CanvasConfig::from_env(cli.width, cli.height);
    if cli.force_cpu {
        config = config.with_backend(BackendPreference::ForceCpu);
    }
    let driver = config.build_driver();

    let mut canvas =
        CanvasTexture::new(&mut host, &driver, &config).context("create canvas texture")?;
    if let Some(report) = canvas.fallback() {
        info!(backend = %report.backend, error = %report.error, "rendering on the CPU");
    }

    let style = Style {
        color: color_from_hsl(cli.hue, cli.saturation, cli.lightness),
        stroke: Stroke::new(cli.line_width),
    };

    let frames = match cli.mode {
        Scene::Shapes => 1,
        Scene::Animated => cli.frames.max(1),
    };
    let mut time = 0.0f64;
    for _ in 0..frames {
        canvas.draw(|p| {
            p.clear(Color::from_rgba8(255, 255, 255, 255));
            match cli.mode {
                Scene::Shapes => draw_shapes(p, &style),
                Scene::Animated => draw_animated(p, &style, time),
            }
        })?;
        canvas.sync_if_dirty(&mut host)?;
        // One degree per frame at 60 fps.
        time += 1.0;
    }

    let image = unpremultiplied(&canvas.image()?)?;
    canvas.dispose(&mut host)?;

    if let Some(parent) = cli.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &cli.out,
        image.data(),
        image.width(),
        image.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", cli.out.display()))?;

    eprintln!("wrote {}", cli.out.display());
    Ok(())
}

fn draw_shapes(p: &mut dyn Painter, style: &Style) {
    let (color, stroke) = (style.color, &style.stroke);

    p.stroke_rect(&Rect::new(50.0, 50.0, 150.0, 130.0), stroke, color);
    p.fill_rect(&Rect::new(60.0, 60.0, 140.0, 120.0), color);

    p.stroke_circle(Point::new(250.0, 100.0), 50.0, stroke, color);
    p.fill_circle(Point::new(250.0, 100.0), 30.0, color);

    let mut triangle = BezPath::new();
    triangle.move_to((400.0, 150.0));
    triangle.line_to((350.0, 50.0));
    triangle.line_to((450.0, 50.0));
    triangle.close_path();
    p.stroke_path(&triangle, stroke, color);

    p.fill_shape(&RoundedRect::new(50.0, 100.0, 150.0, 200.0, 20.0), color);
    p.stroke_line(Point::new(250.0, 200.0), Point::new(400.0, 300.0), stroke, color);
    p.stroke_shape(
        &Ellipse::from_rect(Rect::new(300.0, 350.0, 450.0, 450.0)),
        stroke,
        color,
    );
}

fn draw_animated(p: &mut dyn Painter, style: &Style, time: f64) {
    let (color, stroke) = (style.color, &style.stroke);
    let center = Point::new(256.0, 256.0);
    let radius = 100.0;

    for i in 0..8 {
        let angle = (time + f64::from(i) * 45.0) * PI / 180.0;
        let at = Point::new(center.x + angle.cos() * radius, center.y + angle.sin() * radius);
        p.fill_circle(at, 20.0, color);
    }

    let pulse = 30.0 + (time * 0.1).sin() * 10.0;
    p.stroke_circle(center, pulse, stroke, color);

    let mut spiral = BezPath::new();
    for step in 0..72 {
        let t = f64::from(step) * 5.0;
        let angle = (t + time * 2.0) * PI / 180.0;
        let r = t * 0.3;
        let at = Point::new(center.x + angle.cos() * r, center.y + angle.sin() * r);
        if step == 0 {
            spiral.move_to(at);
        } else {
            spiral.line_to(at);
        }
    }
    p.stroke_path(&spiral, stroke, color);
}
