//! Decoded sprite images (RGBA8 pixel buffers).
//!
//! **Why**: The playback core draws from memory, never from encoded bytes.
//! A [`SpriteImage`] is decoded once and shared via `Arc` between every
//! frame that samples it (spritesheet reuse).
//!
//! **Used by**: Frame store (decode + placeholder fallback), compositor and
//! surface (sampling).

use std::io::Cursor;
use std::sync::Arc;

use log::debug;

use super::frame::SpriteFrame;

/// Image decode errors
#[derive(Debug)]
pub enum ImageError {
    Decode(String),
    EmptyData,
}

impl std::fmt::Display for ImageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageError::Decode(e) => write!(f, "Decode error: {}", e),
            ImageError::EmptyData => write!(f, "No image data"),
        }
    }
}

impl std::error::Error for ImageError {}

/// Decoded image: straight-alpha RGBA8, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl SpriteImage {
    /// Decode PNG/JPEG bytes into an RGBA8 buffer.
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::EmptyData);
        }

        let img = image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;
        let width = img.width() as usize;
        let height = img.height() as usize;
        let rgba = img.to_rgba8();

        debug!("Decoded image: {}x{}", width, height);

        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    /// Wrap an existing straight-alpha RGBA8 buffer.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self, ImageError> {
        if pixels.len() != width * height * 4 {
            return Err(ImageError::Decode(format!(
                "Buffer length {} does not match {}x{} RGBA",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Fully-transparent image of the given dimensions.
    ///
    /// Stands in for a missing or undecodable asset so one bad frame never
    /// blocks the rest of the sequence.
    pub fn transparent(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width * height * 4],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resolution(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// RGBA at (x, y), or None outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Read dimensions from encoded bytes without a full decode.
///
/// Used when building descriptors from files: the source rect needs the
/// image extent before resolution runs.
pub fn probe_dimensions(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageError::Decode(e.to_string()))?
        .into_dimensions()
        .map_err(|e| ImageError::Decode(e.to_string()))
}

/// A frame descriptor paired with its decoded, drawable image.
///
/// Created in a batch by [`crate::entities::store::resolve`] before playback
/// starts; replaced wholesale on re-init or stop, never mutated per-frame
/// during playback.
#[derive(Debug, Clone)]
pub struct ResolvedFrame {
    pub frame: SpriteFrame,
    pub image: Arc<SpriteImage>,
}

/// Encode a solid-color PNG for tests.
#[cfg(test)]
pub(crate) fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    let img = RgbaImage::from_pixel(width, height, Rgba(rgba));
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: decode round trip
    /// Validates: PNG bytes decode to the expected size and pixel values
    #[test]
    fn test_decode_png() {
        let bytes = png_bytes(4, 3, [255, 0, 0, 255]);
        let img = SpriteImage::decode(&bytes).unwrap();

        assert_eq!(img.resolution(), (4, 3));
        assert_eq!(img.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(img.pixel(3, 2), Some([255, 0, 0, 255]));
        assert_eq!(img.pixel(4, 0), None);
    }

    /// Test: transparent placeholder
    /// Validates: placeholder has requested size and zero alpha everywhere
    #[test]
    fn test_transparent_placeholder() {
        let img = SpriteImage::transparent(8, 8);
        assert_eq!(img.resolution(), (8, 8));
        assert!(img.pixels().iter().all(|&b| b == 0));
    }

    /// Test: decode failures
    /// Validates: empty and garbage data report errors, never panic
    #[test]
    fn test_decode_errors() {
        assert!(matches!(SpriteImage::decode(&[]), Err(ImageError::EmptyData)));
        assert!(matches!(
            SpriteImage::decode(&[1, 2, 3, 4]),
            Err(ImageError::Decode(_))
        ));
        assert!(SpriteImage::from_pixels(2, 2, vec![0; 15]).is_err());
    }

    /// Test: dimension probe
    /// Validates: probe reports size without caring about pixel content
    #[test]
    fn test_probe_dimensions() {
        let bytes = png_bytes(17, 9, [0, 0, 0, 0]);
        assert_eq!(probe_dimensions(&bytes).unwrap(), (17, 9));
        assert!(probe_dimensions(&[]).is_err());
    }
}
