//! Memoized native driver handles.

use canvas_host::{BridgeError, BridgeResult, DriverResource, NativeHandle, RenderingDevice};
use once_cell::sync::OnceCell;
use tracing::debug;

/// The native handles a Vulkan backend context is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverHandles {
    pub device: NativeHandle,
    pub physical_device: NativeHandle,
    pub instance: NativeHandle,
    pub queue: NativeHandle,
    pub queue_family_index: u32,
}

/// Per-kind cache of device-global driver handles.
///
/// Each kind is queried from the rendering device at most once; a successful
/// answer is kept for the lifetime of the cache and never re-queried. Failed
/// queries are not cached. Once populated the cache is read-only and may be
/// shared across threads.
#[derive(Debug, Default)]
pub struct DriverHandleCache {
    device: OnceCell<NativeHandle>,
    physical_device: OnceCell<NativeHandle>,
    instance: OnceCell<NativeHandle>,
    queue: OnceCell<NativeHandle>,
    queue_family: OnceCell<NativeHandle>,
}

impl DriverHandleCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, kind: DriverResource) -> Option<&OnceCell<NativeHandle>> {
        match kind {
            DriverResource::LogicalDevice => Some(&self.device),
            DriverResource::PhysicalDevice => Some(&self.physical_device),
            DriverResource::TopmostObject => Some(&self.instance),
            DriverResource::CommandQueue => Some(&self.queue),
            DriverResource::QueueFamily => Some(&self.queue_family),
            DriverResource::TextureDataFormat => None,
        }
    }

    /// Resolve a device-global driver resource, querying the device only the
    /// first time.
    ///
    /// [`DriverResource::TextureDataFormat`] is per image and goes through
    /// [`DriverHandleCache::texture_format`] instead.
    pub fn resolve(
        &self,
        device: &dyn RenderingDevice,
        kind: DriverResource,
    ) -> BridgeResult<NativeHandle> {
        let cell = self.cell(kind).ok_or_else(|| {
            BridgeError::unsupported_backend(format!("{kind:?} is per image and is not cached"))
        })?;
        cell.get_or_try_init(|| query(device, kind, None)).copied()
    }

    /// The cached value for `kind`, without querying.
    pub fn cached(&self, kind: DriverResource) -> Option<NativeHandle> {
        self.cell(kind).and_then(|cell| cell.get().copied())
    }

    /// Resolve all device-global handles.
    pub fn handles(&self, device: &dyn RenderingDevice) -> BridgeResult<DriverHandles> {
        let queue_family = self.resolve(device, DriverResource::QueueFamily)?;
        let queue_family_index = u32::try_from(queue_family.as_raw()).map_err(|_| {
            BridgeError::unsupported_backend(format!(
                "queue family index {:#x} out of range",
                queue_family.as_raw()
            ))
        })?;
        Ok(DriverHandles {
            device: self.resolve(device, DriverResource::LogicalDevice)?,
            physical_device: self.resolve(device, DriverResource::PhysicalDevice)?,
            instance: self.resolve(device, DriverResource::TopmostObject)?,
            queue: self.resolve(device, DriverResource::CommandQueue)?,
            queue_family_index,
        })
    }

    /// The driver format of a specific image. Never cached.
    pub fn texture_format(
        &self,
        device: &dyn RenderingDevice,
        image: NativeHandle,
    ) -> BridgeResult<u32> {
        let raw = query(device, DriverResource::TextureDataFormat, Some(image))?.as_raw();
        u32::try_from(raw).map_err(|_| {
            BridgeError::unsupported_backend(format!("texture format {raw:#x} out of range"))
        })
    }
}

fn query(
    device: &dyn RenderingDevice,
    kind: DriverResource,
    target: Option<NativeHandle>,
) -> BridgeResult<NativeHandle> {
    match device.driver_resource(kind, target) {
        None => Err(BridgeError::unsupported_backend(format!(
            "backend '{}' does not expose {kind:?}",
            device.current_backend_name()
        ))),
        Some(0) if kind.is_object() => Err(BridgeError::unsupported_backend(format!(
            "backend '{}' returned a null {kind:?}",
            device.current_backend_name()
        ))),
        Some(raw) => {
            debug!(?kind, raw = %format_args!("{raw:#x}"), "resolved driver resource");
            Ok(NativeHandle::from_raw(raw))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvas_host::ImageDesc;
    use std::cell::Cell;

    /// Device that answers each kind once and fails every later query.
    struct OneShotDevice {
        queries: Cell<usize>,
        seen: Cell<u32>,
    }

    impl OneShotDevice {
        fn new() -> Self {
            Self {
                queries: Cell::new(0),
                seen: Cell::new(0),
            }
        }
    }

    fn bit(kind: DriverResource) -> u32 {
        1 << (kind as u32)
    }

    impl RenderingDevice for OneShotDevice {
        fn current_backend_name(&self) -> String {
            "vulkan".into()
        }

        fn driver_resource(&self, kind: DriverResource, _: Option<NativeHandle>) -> Option<u64> {
            self.queries.set(self.queries.get() + 1);
            if self.seen.get() & bit(kind) != 0 {
                return None;
            }
            self.seen.set(self.seen.get() | bit(kind));
            Some(match kind {
                DriverResource::QueueFamily => 0,
                other => 0x100 + other as u64,
            })
        }

        fn allocate_image(&mut self, _: &ImageDesc) -> BridgeResult<NativeHandle> {
            unreachable!()
        }

        fn free_image(&mut self, _: NativeHandle) {}
    }

    #[test]
    fn second_resolve_uses_cache() {
        let device = OneShotDevice::new();
        let cache = DriverHandleCache::new();
        let first = cache.resolve(&device, DriverResource::LogicalDevice).unwrap();
        let second = cache.resolve(&device, DriverResource::LogicalDevice).unwrap();
        assert_eq!(first, second);
        assert_eq!(device.queries.get(), 1);
    }

    #[test]
    fn handles_accept_queue_family_zero() {
        let device = OneShotDevice::new();
        let cache = DriverHandleCache::new();
        let handles = cache.handles(&device).unwrap();
        assert_eq!(handles.queue_family_index, 0);
        assert_eq!(handles.device, NativeHandle::from_raw(0x100));
        // Everything is cached now; a second full resolve must not fail.
        assert_eq!(cache.handles(&device).unwrap(), handles);
        assert_eq!(device.queries.get(), 5);
    }

    #[test]
    fn cached_does_not_query() {
        let device = OneShotDevice::new();
        let cache = DriverHandleCache::new();
        assert_eq!(cache.cached(DriverResource::CommandQueue), None);
        cache.resolve(&device, DriverResource::CommandQueue).unwrap();
        assert!(cache.cached(DriverResource::CommandQueue).is_some());
        assert_eq!(device.queries.get(), 1);
    }

    #[test]
    fn texture_format_is_not_resolvable_through_cache() {
        let device = OneShotDevice::new();
        let cache = DriverHandleCache::new();
        let err = cache
            .resolve(&device, DriverResource::TextureDataFormat)
            .unwrap_err();
        assert!(matches!(err, BridgeError::UnsupportedBackend(_)));
        assert_eq!(device.queries.get(), 0);
    }
}
