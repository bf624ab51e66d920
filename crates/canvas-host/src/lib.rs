//! Host-side boundary for canvas textures.
//!
//! Everything the bridge needs from the host engine is expressed here as
//! plain traits and value types, so the bridge never depends on a concrete
//! engine binding:
//!
//! - [`RenderingDevice`] exposes native driver resources and allocates images.
//! - [`HostTextureSlot`] wraps host images as textures and receives pixel
//!   uploads.
//! - [`HostImage`] is the byte buffer pushed into a texture on CPU sync.
//! - [`BridgeError`] is the error taxonomy shared by all bridge crates.
//!
//! [`headless::HeadlessHost`] implements both host traits in memory for
//! demos and tests.

pub mod device;
pub mod error;
pub mod format;
pub mod headless;
pub mod image;
pub mod logging;
pub mod texture;
pub mod values;

pub use device::{DriverResource, ImageDesc, NativeHandle, RenderingDevice};
pub use error::{BridgeError, BridgeResult};
pub use format::{TextureFormat, TextureUsage};
pub use image::HostImage;
pub use texture::{HostTextureSlot, TextureId};
pub use values::{HostColor, Rect2, Transform2D, Vec2};

/// A host that provides both a rendering device and texture slots.
///
/// Engines usually expose these through one object; the bridge only needs
/// the two capabilities together when creating or tearing down a texture.
pub trait Host: RenderingDevice + HostTextureSlot {}

impl<T: RenderingDevice + HostTextureSlot> Host for T {}
