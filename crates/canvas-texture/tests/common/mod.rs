#![allow(dead_code)]

use std::cell::RefCell;
use std::ffi::{c_char, c_void, CString};
use std::rc::Rc;

use canvas_host::headless::HeadlessHost;
use canvas_host::{BridgeError, BridgeResult, DriverResource, HostImage};
use canvas_texture::{CpuCanvas, GpuBackend, GpuCanvas, GpuSurfaceRequest, Painter};
use vk_interop::image::VK_FORMAT_R8G8B8A8_UNORM;
use vk_interop::{DriverLibrary, LibraryCandidate, LibraryLoader, VkImageDescription, VulkanDriver};

pub const QUEUE_FAMILY: u64 = 2;

unsafe extern "system" fn null_proc_addr(_handle: *mut c_void, _name: *const c_char) -> *const c_void {
    std::ptr::null()
}

struct FakeLibrary;

impl DriverLibrary for FakeLibrary {
    fn description(&self) -> &str {
        "fake-vulkan"
    }

    fn symbol(&self, name: &CString) -> Option<*const c_void> {
        match name.to_bytes() {
            b"vkGetInstanceProcAddr" | b"vkGetDeviceProcAddr" => {
                Some(null_proc_addr as *const c_void)
            }
            _ => None,
        }
    }
}

/// Loader that opens any candidate, or none.
pub struct FakeLoader {
    pub available: bool,
}

impl LibraryLoader for FakeLoader {
    fn open(&self, candidate: &LibraryCandidate) -> Result<Box<dyn DriverLibrary>, String> {
        if self.available {
            Ok(Box::new(FakeLibrary))
        } else {
            Err(format!("{candidate}: not found"))
        }
    }
}

pub fn driver(available: bool) -> VulkanDriver {
    VulkanDriver::with_loader(
        Box::new(FakeLoader { available }),
        vec![LibraryCandidate::name("libvulkan.so.1")],
    )
}

/// A host that claims Vulkan and exposes every driver resource.
pub fn vulkan_host() -> HeadlessHost {
    HeadlessHost::new("vulkan")
        .with_driver_resource(DriverResource::LogicalDevice, 0xd0)
        .with_driver_resource(DriverResource::PhysicalDevice, 0xd1)
        .with_driver_resource(DriverResource::TopmostObject, 0xd2)
        .with_driver_resource(DriverResource::CommandQueue, 0xd3)
        .with_driver_resource(DriverResource::QueueFamily, QUEUE_FAMILY)
        .with_driver_resource(
            DriverResource::TextureDataFormat,
            u64::from(VK_FORMAT_R8G8B8A8_UNORM),
        )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeed,
    ContextFails,
    HostFails,
}

#[derive(Debug, Default)]
pub struct Calls {
    pub created: usize,
    pub flushes: usize,
    pub releases: usize,
    pub images: Vec<VkImageDescription>,
}

/// GPU backend stand-in that draws into a CPU canvas and counts calls.
pub struct FakeGpuBackend {
    pub outcome: Outcome,
    pub calls: Rc<RefCell<Calls>>,
}

impl FakeGpuBackend {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            calls: Rc::default(),
        }
    }
}

impl GpuBackend for FakeGpuBackend {
    fn name(&self) -> &str {
        "fake-gpu"
    }

    fn create_surface(&self, request: GpuSurfaceRequest) -> BridgeResult<Box<dyn GpuCanvas>> {
        let mut calls = self.calls.borrow_mut();
        calls.images.push(request.image);
        match self.outcome {
            Outcome::ContextFails => Err(BridgeError::context_creation("null context")),
            Outcome::HostFails => Err(BridgeError::host("device lost")),
            Outcome::Succeed => {
                calls.created += 1;
                Ok(Box::new(FakeGpuCanvas {
                    canvas: CpuCanvas::new(request.image.width as u16, request.image.height as u16),
                    calls: self.calls.clone(),
                    released: false,
                }))
            }
        }
    }
}

struct FakeGpuCanvas {
    canvas: CpuCanvas,
    calls: Rc<RefCell<Calls>>,
    released: bool,
}

impl GpuCanvas for FakeGpuCanvas {
    fn painter(&mut self) -> &mut dyn Painter {
        &mut self.canvas
    }

    fn flush(&mut self) -> BridgeResult<()> {
        self.canvas.rasterize();
        self.calls.borrow_mut().flushes += 1;
        Ok(())
    }

    fn snapshot(&mut self) -> Option<HostImage> {
        None
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.calls.borrow_mut().releases += 1;
        }
    }
}

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}
