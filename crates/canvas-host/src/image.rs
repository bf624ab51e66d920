//! Host-side image objects.

use crate::error::{BridgeError, BridgeResult};
use crate::format::TextureFormat;

/// A tightly packed pixel buffer with its dimensions and format.
///
/// This is what the CPU sync path builds and hands to
/// [`HostTextureSlot::update`](crate::HostTextureSlot::update).
#[derive(Clone, PartialEq, Eq)]
pub struct HostImage {
    width: u32,
    height: u32,
    format: TextureFormat,
    data: Vec<u8>,
}

impl HostImage {
    /// A zero-filled image.
    pub fn empty(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            width,
            height,
            format,
            data: vec![0; format.byte_len(width, height)],
        }
    }

    /// Wrap existing bytes. Fails if the length does not match the
    /// dimensions and format.
    pub fn from_data(
        width: u32,
        height: u32,
        format: TextureFormat,
        data: Vec<u8>,
    ) -> BridgeResult<Self> {
        let expected = format.byte_len(width, height);
        if data.len() != expected {
            return Err(BridgeError::host(format!(
                "image data is {} bytes, expected {expected} for {width}x{height} {format:?}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// RGBA of the pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * self.format.bytes_per_pixel();
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

impl std::fmt::Debug for HostImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("bytes", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_data_rejects_wrong_length() {
        let err = HostImage::from_data(2, 2, TextureFormat::Rgba8, vec![0; 15]).unwrap_err();
        assert!(err.to_string().contains("expected 16"));
    }

    #[test]
    fn pixel_lookup() {
        let mut data = vec![0u8; 2 * 2 * 4];
        data[12..16].copy_from_slice(&[1, 2, 3, 4]);
        let img = HostImage::from_data(2, 2, TextureFormat::Rgba8, data).unwrap();
        assert_eq!(img.pixel(1, 1), Some([1, 2, 3, 4]));
        assert_eq!(img.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(img.pixel(2, 0), None);
    }
}
