//! Vulkan driver interop for canvas textures.
//!
//! This crate resolves what a GPU backend needs to render into a host-owned
//! Vulkan image:
//!
//! - [`DriverHandleCache`] queries the host's rendering device for native
//!   handles (device, physical device, instance, queue, queue family) once
//!   and keeps them.
//! - [`loader`] opens the Vulkan loader library from a platform-ordered list
//!   of candidates and looks up exported symbols.
//! - [`FunctionTable`] binds `vkGetInstanceProcAddr` / `vkGetDeviceProcAddr`
//!   and answers proc-address queries from a backend.
//! - [`VulkanDriver`] ties the three together behind lazy, process-lifetime
//!   state owned by the caller.
//! - [`image::VkImageDescription`] describes the host image as a color
//!   render target.

pub mod driver;
pub mod functions;
pub mod handles;
pub mod image;
pub mod loader;

pub use driver::VulkanDriver;
pub use functions::FunctionTable;
pub use handles::{DriverHandleCache, DriverHandles};
pub use image::VkImageDescription;
pub use loader::{DriverLibrary, LibraryCandidate, LibraryLoader, SystemLoader};
