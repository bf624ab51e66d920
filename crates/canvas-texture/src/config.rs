//! Canvas texture configuration.

use std::path::PathBuf;

use vk_interop::loader::platform_candidates;
use vk_interop::{LibraryCandidate, SystemLoader, VulkanDriver};

/// Forces the CPU path when set to `1`, `true` or `yes`.
pub const FORCE_CPU_ENV: &str = "CANVAS_FORCE_CPU";
/// Extra Vulkan loader paths, separated like `PATH`, tried before the
/// platform defaults.
pub const VULKAN_LIBRARY_ENV: &str = "CANVAS_VULKAN_LIBRARY";

pub const DEFAULT_SIZE: u32 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendPreference {
    /// Render on the GPU when the host uses Vulkan, otherwise on the CPU.
    #[default]
    Auto,
    ForceCpu,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub backend: BackendPreference,
    pub extra_library_candidates: Vec<PathBuf>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE, DEFAULT_SIZE)
    }
}

impl CanvasConfig {
    /// Sizes below one pixel are raised to one.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            backend: BackendPreference::Auto,
            extra_library_candidates: Vec::new(),
        }
    }

    pub fn with_backend(mut self, backend: BackendPreference) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.extra_library_candidates.push(path.into());
        self
    }

    pub fn force_cpu(&self) -> bool {
        self.backend == BackendPreference::ForceCpu
    }

    /// Default configuration of the given size, adjusted from the process
    /// environment.
    pub fn from_env(width: u32, height: u32) -> Self {
        Self::from_env_with(width, height, |key| std::env::var(key).ok())
    }

    pub fn from_env_with(width: u32, height: u32, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new(width, height);
        if lookup(FORCE_CPU_ENV).is_some_and(|v| is_truthy(&v)) {
            config.backend = BackendPreference::ForceCpu;
        }
        if let Some(paths) = lookup(VULKAN_LIBRARY_ENV) {
            config
                .extra_library_candidates
                .extend(std::env::split_paths(&paths).filter(|p| !p.as_os_str().is_empty()));
        }
        config
    }

    /// Loader candidates: configured paths first, then the platform list.
    pub fn library_candidates(&self) -> Vec<LibraryCandidate> {
        self.extra_library_candidates
            .iter()
            .cloned()
            .map(LibraryCandidate::Path)
            .chain(platform_candidates())
            .collect()
    }

    /// A driver using the system loader over [`CanvasConfig::library_candidates`].
    pub fn build_driver(&self) -> VulkanDriver {
        VulkanDriver::with_loader(Box::new(SystemLoader), self.library_candidates())
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_512_square_auto() {
        let config = CanvasConfig::default();
        assert_eq!((config.width, config.height), (512, 512));
        assert_eq!(config.backend, BackendPreference::Auto);
        assert!(config.extra_library_candidates.is_empty());
    }

    #[test]
    fn clamps_zero_sizes() {
        let config = CanvasConfig::new(0, 7);
        assert_eq!((config.width, config.height), (1, 7));
    }

    #[test]
    fn reads_environment_overrides() {
        let config = CanvasConfig::from_env_with(64, 32, |key| match key {
            FORCE_CPU_ENV => Some("True".into()),
            VULKAN_LIBRARY_ENV => Some("/opt/vk/libvulkan.so".into()),
            _ => None,
        });
        assert!(config.force_cpu());
        assert_eq!(config.extra_library_candidates, [PathBuf::from("/opt/vk/libvulkan.so")]);

        let candidates = config.library_candidates();
        assert_eq!(candidates[0].to_string(), "/opt/vk/libvulkan.so");
        assert_eq!(candidates.len(), 1 + platform_candidates().len());
    }

    #[test]
    fn ignores_falsy_force_cpu() {
        let config = CanvasConfig::from_env_with(8, 8, |key| {
            (key == FORCE_CPU_ENV).then(|| "0".to_string())
        });
        assert!(!config.force_cpu());
    }
}
