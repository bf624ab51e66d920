//! Texture formats and usage bits understood by the host rendering device.
//!
//! Usage bit values follow the host's texture usage enumeration so they can
//! be passed through to an engine binding unchanged.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Pixel format of a host texture or image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    /// 8-bit RGBA, unsigned normalized.
    #[default]
    Rgba8,
}

impl TextureFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            TextureFormat::Rgba8 => 4,
        }
    }

    /// Byte length of a tightly packed image in this format.
    pub fn byte_len(self, width: u32, height: u32) -> usize {
        (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(self.bytes_per_pixel())
    }
}

/// Bit set of texture usages requested from the host.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureUsage(u32);

impl TextureUsage {
    pub const SAMPLING: Self = Self(1 << 0);
    pub const COLOR_ATTACHMENT: Self = Self(1 << 1);
    pub const DEPTH_STENCIL_ATTACHMENT: Self = Self(1 << 2);
    pub const STORAGE: Self = Self(1 << 3);
    pub const STORAGE_ATOMIC: Self = Self(1 << 4);
    pub const CPU_READ: Self = Self(1 << 5);
    pub const CAN_UPDATE: Self = Self(1 << 6);
    pub const CAN_COPY_FROM: Self = Self(1 << 7);
    pub const CAN_COPY_TO: Self = Self(1 << 8);

    /// Usage of a canvas texture: drawable by a GPU backend, sampled by the
    /// host, and updatable from CPU uploads.
    pub const CANVAS: Self = Self(
        Self::CAN_UPDATE.0
            | Self::SAMPLING.0
            | Self::CAN_COPY_FROM.0
            | Self::CAN_COPY_TO.0
            | Self::COLOR_ATTACHMENT.0,
    );

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for TextureUsage {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TextureUsage {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for TextureUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(TextureUsage, &str); 9] = [
            (TextureUsage::SAMPLING, "SAMPLING"),
            (TextureUsage::COLOR_ATTACHMENT, "COLOR_ATTACHMENT"),
            (TextureUsage::DEPTH_STENCIL_ATTACHMENT, "DEPTH_STENCIL_ATTACHMENT"),
            (TextureUsage::STORAGE, "STORAGE"),
            (TextureUsage::STORAGE_ATOMIC, "STORAGE_ATOMIC"),
            (TextureUsage::CPU_READ, "CPU_READ"),
            (TextureUsage::CAN_UPDATE, "CAN_UPDATE"),
            (TextureUsage::CAN_COPY_FROM, "CAN_COPY_FROM"),
            (TextureUsage::CAN_COPY_TO, "CAN_COPY_TO"),
        ];
        let set: Vec<&str> = NAMES
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "TextureUsage({})", set.join(" | "))
    }
}
