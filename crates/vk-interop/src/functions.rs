//! Vulkan entry points bound from the loader library.

use std::ffi::{c_char, c_void, CStr, CString};
use std::fmt;

use canvas_host::{BridgeError, BridgeResult, NativeHandle};
use tracing::debug;

use crate::loader::{get_proc_address, DriverLibrary};

// ---------------------------------------------------------------------------
// Vulkan function pointer types
// ---------------------------------------------------------------------------

type VkGetInstanceProcAddr =
    unsafe extern "system" fn(instance: *mut c_void, name: *const c_char) -> *const c_void;
type VkGetDeviceProcAddr =
    unsafe extern "system" fn(device: *mut c_void, name: *const c_char) -> *const c_void;

/// The two proc-address entry points every Vulkan backend bootstraps from.
///
/// Holds the library open for as long as the table lives, so the function
/// pointers stay valid.
pub struct FunctionTable {
    get_instance_proc_addr: VkGetInstanceProcAddr,
    get_device_proc_addr: VkGetDeviceProcAddr,
    library: Box<dyn DriverLibrary>,
}

impl FunctionTable {
    /// Bind the entry points exported by an opened loader library.
    pub fn load(library: Box<dyn DriverLibrary>) -> BridgeResult<Self> {
        let instance_fn = get_proc_address(library.as_ref(), "vkGetInstanceProcAddr")?;
        let device_fn = get_proc_address(library.as_ref(), "vkGetDeviceProcAddr")?;
        debug!(library = library.description(), "bound Vulkan proc-address entry points");

        // SAFETY: both symbols are non-null exports of a Vulkan loader, whose
        // ABI matches the declared signatures.
        unsafe {
            Ok(Self {
                get_instance_proc_addr: std::mem::transmute::<*const c_void, VkGetInstanceProcAddr>(
                    instance_fn,
                ),
                get_device_proc_addr: std::mem::transmute::<*const c_void, VkGetDeviceProcAddr>(
                    device_fn,
                ),
                library,
            })
        }
    }

    /// Description of the library the table was bound from.
    pub fn library(&self) -> &str {
        self.library.description()
    }

    /// Resolve a Vulkan command by name.
    ///
    /// Uses the device-level lookup when `device` is non-null, the
    /// instance-level lookup otherwise. A null result means the driver does
    /// not provide the command.
    pub fn proc_address(
        &self,
        name: &str,
        instance: NativeHandle,
        device: NativeHandle,
    ) -> BridgeResult<*const c_void> {
        let c_name = CString::new(name).map_err(|_| BridgeError::symbol_not_found(name))?;
        // SAFETY: handles come from the host's live rendering device.
        Ok(unsafe { self.proc_address_c(&c_name, instance, device) })
    }

    /// [`FunctionTable::proc_address`] for names that are already C strings,
    /// as handed over by backend libraries.
    ///
    /// # Safety
    ///
    /// `instance` / `device` must be null or valid handles of the driver this
    /// table was loaded from.
    pub unsafe fn proc_address_c(
        &self,
        name: &CStr,
        instance: NativeHandle,
        device: NativeHandle,
    ) -> *const c_void {
        if !device.is_null() {
            (self.get_device_proc_addr)(device.as_ptr(), name.as_ptr())
        } else {
            (self.get_instance_proc_addr)(instance.as_ptr(), name.as_ptr())
        }
    }
}

impl fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTable")
            .field("library", &self.library.description())
            .finish_non_exhaustive()
    }
}
