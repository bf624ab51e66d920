//! Description of a host-owned Vulkan image as a color render target.
//!
//! Constants are taken from the Vulkan headers (vulkan_core.h).

use canvas_host::NativeHandle;

// VkFormat
pub const VK_FORMAT_R8G8B8A8_UNORM: u32 = 37;
pub const VK_FORMAT_B8G8R8A8_UNORM: u32 = 44;

// VkImageLayout
pub const VK_IMAGE_LAYOUT_COLOR_ATTACHMENT_OPTIMAL: u32 = 2;

// VkImageTiling
pub const VK_IMAGE_TILING_OPTIMAL: u32 = 0;

// VkImageUsageFlagBits
pub const VK_IMAGE_USAGE_TRANSFER_SRC_BIT: u32 = 0x0000_0001;
pub const VK_IMAGE_USAGE_TRANSFER_DST_BIT: u32 = 0x0000_0002;
pub const VK_IMAGE_USAGE_SAMPLED_BIT: u32 = 0x0000_0004;
pub const VK_IMAGE_USAGE_COLOR_ATTACHMENT_BIT: u32 = 0x0000_0010;

// VkSharingMode
pub const VK_SHARING_MODE_EXCLUSIVE: u32 = 0;

/// Everything a backend needs to wrap an external `VkImage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VkImageDescription {
    pub image: NativeHandle,
    pub width: u32,
    pub height: u32,
    pub format: u32,
    pub layout: u32,
    pub tiling: u32,
    pub usage_flags: u32,
    pub level_count: u32,
    pub sample_count: u32,
    pub current_queue_family: u32,
    pub protected: bool,
    pub sharing_mode: u32,
}

impl VkImageDescription {
    /// A single-level, single-sample, optimally tiled image in
    /// `COLOR_ATTACHMENT_OPTIMAL` layout, owned by `queue_family`.
    pub fn color_target(
        image: NativeHandle,
        format: u32,
        queue_family: u32,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            image,
            width,
            height,
            format,
            layout: VK_IMAGE_LAYOUT_COLOR_ATTACHMENT_OPTIMAL,
            tiling: VK_IMAGE_TILING_OPTIMAL,
            usage_flags: VK_IMAGE_USAGE_SAMPLED_BIT
                | VK_IMAGE_USAGE_TRANSFER_SRC_BIT
                | VK_IMAGE_USAGE_TRANSFER_DST_BIT
                | VK_IMAGE_USAGE_COLOR_ATTACHMENT_BIT,
            level_count: 1,
            sample_count: 1,
            current_queue_family: queue_family,
            protected: false,
            sharing_mode: VK_SHARING_MODE_EXCLUSIVE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_target_defaults() {
        let desc = VkImageDescription::color_target(
            NativeHandle::from_raw(0xabc),
            VK_FORMAT_R8G8B8A8_UNORM,
            2,
            64,
            32,
        );
        assert_eq!(desc.layout, VK_IMAGE_LAYOUT_COLOR_ATTACHMENT_OPTIMAL);
        assert_eq!(desc.tiling, VK_IMAGE_TILING_OPTIMAL);
        assert_eq!(desc.usage_flags, 0x17);
        assert_eq!((desc.level_count, desc.sample_count), (1, 1));
        assert_eq!(desc.current_queue_family, 2);
        assert_eq!(desc.sharing_mode, VK_SHARING_MODE_EXCLUSIVE);
        assert!(!desc.protected);
    }
}
