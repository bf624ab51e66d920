//! Process-lifetime Vulkan driver state owned by the caller.

use std::sync::Arc;

use canvas_host::{BridgeResult, NativeHandle, RenderingDevice};
use once_cell::sync::OnceCell;

use crate::functions::FunctionTable;
use crate::handles::{DriverHandleCache, DriverHandles};
use crate::loader::{
    load_driver_library, platform_candidates, LibraryCandidate, LibraryLoader, SystemLoader,
};

/// Driver handles plus the loader function table, each populated once on
/// first use.
///
/// Create one per process (or per host rendering device) at startup and pass
/// it by reference to every canvas texture. Nothing here is global.
pub struct VulkanDriver {
    handles: DriverHandleCache,
    loader: Box<dyn LibraryLoader>,
    candidates: Vec<LibraryCandidate>,
    functions: OnceCell<Arc<FunctionTable>>,
}

impl VulkanDriver {
    /// System dynamic loader with this platform's candidate libraries.
    pub fn new() -> Self {
        Self::with_loader(Box::new(SystemLoader), platform_candidates())
    }

    pub fn with_loader(loader: Box<dyn LibraryLoader>, candidates: Vec<LibraryCandidate>) -> Self {
        Self {
            handles: DriverHandleCache::new(),
            loader,
            candidates,
            functions: OnceCell::new(),
        }
    }

    pub fn handle_cache(&self) -> &DriverHandleCache {
        &self.handles
    }

    pub fn candidates(&self) -> &[LibraryCandidate] {
        &self.candidates
    }

    /// Resolve (or return the cached) device-global handles.
    pub fn handles(&self, device: &dyn RenderingDevice) -> BridgeResult<DriverHandles> {
        self.handles.handles(device)
    }

    /// Driver format of `image`, queried each time.
    pub fn texture_format(
        &self,
        device: &dyn RenderingDevice,
        image: NativeHandle,
    ) -> BridgeResult<u32> {
        self.handles.texture_format(device, image)
    }

    /// Load the driver library and bind the function table on first call.
    /// A failed load is retried on the next call.
    pub fn functions(&self) -> BridgeResult<Arc<FunctionTable>> {
        self.functions
            .get_or_try_init(|| {
                let library = load_driver_library(self.loader.as_ref(), &self.candidates)?;
                FunctionTable::load(library).map(Arc::new)
            })
            .cloned()
    }

    /// Whether the function table has been bound.
    pub fn functions_loaded(&self) -> bool {
        self.functions.get().is_some()
    }
}

impl Default for VulkanDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VulkanDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VulkanDriver")
            .field("handles", &self.handles)
            .field("candidates", &self.candidates)
            .field("functions", &self.functions.get())
            .finish()
    }
}
