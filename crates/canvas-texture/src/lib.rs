//! Vector-graphics canvas textures for host engines.
//!
//! A [`CanvasTexture`] is a host texture you can draw into with 2D vector
//! commands. When the host renders with Vulkan, drawing goes straight into
//! the host's image through a GPU backend bound to the host's own device and
//! queue. Otherwise (or if anything in that setup fails) it falls back to a
//! CPU-rasterized RGBA8 buffer that is uploaded on [`CanvasTexture::sync`].
//!
//! # Overview
//!
//! - [`Painter`] is the drawing vocabulary shared by both modes.
//! - [`RenderSurface`] owns exactly one GPU or CPU backing and tracks the
//!   `GpuBound | CpuBound -> Disposed` lifecycle.
//! - [`gpu::GpuBackend`] builds GPU surfaces; the Skia/Vulkan backend is
//!   behind the `vulkan` feature.
//! - [`sync::sync_to_host`] pushes rendered content to the host texture.
//! - [`CanvasTexture`] runs the whole setup and fallback sequence.
//!
//! # Example
//!
//! ```rust,ignore
//! let driver = VulkanDriver::new();
//! let mut canvas = CanvasTexture::new(&mut host, &driver, &CanvasConfig::new(256, 256))?;
//! canvas.draw(|p| p.fill_rect(&Rect::new(0.0, 0.0, 64.0, 64.0), Color::from_rgba8(255, 0, 0, 255)))?;
//! canvas.sync(&mut host)?;
//! canvas.dispose(&mut host)?;
//! ```

pub mod config;
pub mod convert;
pub mod cpu;
pub mod gpu;
pub mod paint;
pub mod surface;
pub mod sync;
pub mod texture;

#[cfg(feature = "vulkan")]
pub mod skia;

pub use config::{BackendPreference, CanvasConfig};
pub use cpu::CpuCanvas;
pub use gpu::{GpuBackend, GpuCanvas, GpuSurfaceRequest};
pub use paint::{kurbo, Color, Painter, PainterExt};
pub use surface::{RenderSurface, SurfaceState};
pub use sync::SyncOutcome;
pub use texture::{CanvasTexture, FallbackReport};

/// Backend name reported by hosts rendering through Vulkan.
pub const VULKAN_BACKEND: &str = "vulkan";
