//! Locating and opening the Vulkan loader library.
//!
//! Platforms ship the loader under different names (and macOS often only has
//! MoltenVK), so [`platform_candidates`] lists every known name in priority
//! order and [`load_driver_library`] takes the first one that opens.

use std::ffi::{c_void, CString};
use std::fmt;
use std::path::PathBuf;

use canvas_host::{BridgeError, BridgeResult};
use tracing::{debug, info};

/// One place to look for the driver library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryCandidate {
    /// Bare library name resolved through the platform's search path.
    Name(String),
    /// Explicit relative or absolute path.
    Path(PathBuf),
}

impl LibraryCandidate {
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }
}

impl fmt::Display for LibraryCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryCandidate::Name(name) => f.write_str(name),
            LibraryCandidate::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Target platform families with distinct loader naming conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Apple,
    Unix,
}

impl Platform {
    pub const fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(any(target_os = "macos", target_os = "ios")) {
            Platform::Apple
        } else {
            Platform::Unix
        }
    }
}

/// Candidate loader libraries for `platform`, most preferred first.
///
/// On Apple platforms the Homebrew-style absolute path is only tried when
/// `DYLD_FALLBACK_LIBRARY_PATH` is unset, since that variable already adds
/// `/usr/local/lib` to the search path.
pub fn candidates_for(platform: Platform, dyld_fallback_set: bool) -> Vec<LibraryCandidate> {
    match platform {
        Platform::Windows => vec![LibraryCandidate::name("vulkan-1.dll")],
        Platform::Apple => {
            let mut list = vec![
                LibraryCandidate::name("libvulkan.dylib"),
                LibraryCandidate::name("libvulkan.1.dylib"),
                LibraryCandidate::name("libMoltenVK.dylib"),
                LibraryCandidate::path("vulkan.framework/vulkan"),
                LibraryCandidate::path("MoltenVK.framework/MoltenVK"),
            ];
            if !dyld_fallback_set {
                list.push(LibraryCandidate::path("/usr/local/lib/libvulkan.dylib"));
            }
            list
        }
        Platform::Unix => vec![
            LibraryCandidate::name("libvulkan.so.1"),
            LibraryCandidate::name("libvulkan.so"),
        ],
    }
}

/// Candidates for the platform this binary runs on.
pub fn platform_candidates() -> Vec<LibraryCandidate> {
    candidates_for(
        Platform::current(),
        std::env::var_os("DYLD_FALLBACK_LIBRARY_PATH").is_some(),
    )
}

/// An opened driver library.
pub trait DriverLibrary: Send + Sync {
    /// What the library was opened from, for logs and errors.
    fn description(&self) -> &str;

    /// Address of an exported symbol, or `None` if it is not exported.
    fn symbol(&self, name: &CString) -> Option<*const c_void>;
}

/// Opens driver libraries. Injected so tests and embedders can substitute
/// their own lookup.
pub trait LibraryLoader: Send + Sync {
    fn open(&self, candidate: &LibraryCandidate) -> Result<Box<dyn DriverLibrary>, String>;
}

/// [`LibraryLoader`] backed by the platform dynamic loader.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLoader;

struct SystemLibrary {
    library: libloading::Library,
    description: String,
}

impl DriverLibrary for SystemLibrary {
    fn description(&self) -> &str {
        &self.description
    }

    fn symbol(&self, name: &CString) -> Option<*const c_void> {
        // SAFETY: the symbol is only read as an address here; callers
        // transmute it to the matching signature before calling it.
        let symbol: libloading::Symbol<'_, unsafe extern "system" fn()> =
            unsafe { self.library.get(name.as_bytes_with_nul()) }.ok()?;
        Some(*symbol as *const c_void)
    }
}

impl LibraryLoader for SystemLoader {
    fn open(&self, candidate: &LibraryCandidate) -> Result<Box<dyn DriverLibrary>, String> {
        // SAFETY: loading the Vulkan loader runs its initialisers, which have
        // no preconditions beyond a sane process environment.
        let library = match candidate {
            LibraryCandidate::Name(name) => unsafe { libloading::Library::new(name) },
            LibraryCandidate::Path(path) => unsafe { libloading::Library::new(path) },
        }
        .map_err(|e| e.to_string())?;
        Ok(Box::new(SystemLibrary {
            library,
            description: candidate.to_string(),
        }))
    }
}

/// Open the first candidate that loads.
pub fn load_driver_library(
    loader: &dyn LibraryLoader,
    candidates: &[LibraryCandidate],
) -> BridgeResult<Box<dyn DriverLibrary>> {
    let mut tried = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match loader.open(candidate) {
            Ok(library) => {
                info!(library = %candidate, "loaded graphics driver library");
                return Ok(library);
            }
            Err(reason) => {
                debug!(library = %candidate, %reason, "driver library candidate failed");
                tried.push(candidate.to_string());
            }
        }
    }
    Err(BridgeError::DriverNotFound { tried })
}

/// Look up `name` in `library`. Missing and null symbols both fail.
pub fn get_proc_address(library: &dyn DriverLibrary, name: &str) -> BridgeResult<*const c_void> {
    let c_name = CString::new(name).map_err(|_| BridgeError::symbol_not_found(name))?;
    match library.symbol(&c_name) {
        Some(ptr) if !ptr.is_null() => Ok(ptr),
        _ => Err(BridgeError::symbol_not_found(format!(
            "{name} in {}",
            library.description()
        ))),
    }
}
