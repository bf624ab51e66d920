//! The host's rendering device as seen by the bridge.

use std::ffi::c_void;
use std::fmt;

use crate::error::BridgeResult;
use crate::format::{TextureFormat, TextureUsage};

/// Native driver resources a rendering device can expose.
///
/// Mirrors the host's driver resource enumeration. All kinds except
/// [`DriverResource::TextureDataFormat`] are device-global; the format query
/// takes the image it is asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverResource {
    /// `VkDevice`.
    LogicalDevice,
    /// `VkPhysicalDevice`.
    PhysicalDevice,
    /// `VkInstance`.
    TopmostObject,
    /// `VkQueue` used for graphics submission.
    CommandQueue,
    /// Queue family index of [`DriverResource::CommandQueue`].
    QueueFamily,
    /// `VkFormat` of a specific image.
    TextureDataFormat,
}

impl DriverResource {
    /// Device-global kinds, in the order they are resolved.
    pub const GLOBAL: [DriverResource; 5] = [
        DriverResource::LogicalDevice,
        DriverResource::PhysicalDevice,
        DriverResource::TopmostObject,
        DriverResource::CommandQueue,
        DriverResource::QueueFamily,
    ];

    /// Whether a zero value means "not exposed". Queue family indices and
    /// formats are plain integers where zero is valid.
    pub const fn is_object(self) -> bool {
        !matches!(
            self,
            DriverResource::QueueFamily | DriverResource::TextureDataFormat
        )
    }
}

/// An opaque native handle or integer value obtained from the host.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NativeHandle(u64);

impl NativeHandle {
    pub const NULL: NativeHandle = NativeHandle(0);

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn from_ptr(ptr: *const c_void) -> Self {
        Self(ptr as usize as u64)
    }

    pub const fn as_raw(self) -> u64 {
        self.0
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0 as usize as *mut c_void
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeHandle({:#x})", self.0)
    }
}

/// Description of an image the host allocates on behalf of a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDesc {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
}

/// The host's rendering device.
///
/// Implementations are engine bindings. Calls come from the thread that owns
/// the device.
pub trait RenderingDevice {
    /// Name of the active rendering backend, e.g. `"vulkan"` or `"opengl3"`.
    fn current_backend_name(&self) -> String;

    /// Query a native driver resource. `target` names the image for
    /// per-image kinds and is ignored otherwise.
    ///
    /// Returns `None` when the active backend does not expose the resource.
    fn driver_resource(&self, kind: DriverResource, target: Option<NativeHandle>) -> Option<u64>;

    /// Allocate a host-owned image. The returned handle is the native image
    /// (a `VkImage` under Vulkan).
    fn allocate_image(&mut self, desc: &ImageDesc) -> BridgeResult<NativeHandle>;

    /// Release an image previously returned by [`RenderingDevice::allocate_image`].
    fn free_image(&mut self, image: NativeHandle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_family_zero_is_a_value() {
        assert!(!DriverResource::QueueFamily.is_object());
        assert!(!DriverResource::TextureDataFormat.is_object());
        assert!(DriverResource::LogicalDevice.is_object());
    }

    #[test]
    fn handle_pointer_round_trip() {
        let handle = NativeHandle::from_raw(0xdead_b000);
        assert_eq!(NativeHandle::from_ptr(handle.as_ptr()), handle);
        assert!(NativeHandle::NULL.is_null());
        assert_eq!(format!("{handle:?}"), "NativeHandle(0xdeadb000)");
    }
}
