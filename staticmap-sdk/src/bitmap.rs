// ABOUTME: Decoded bitmap type handed to callers for display
// ABOUTME: Fixed 32bpp BGRX layout, top-down rows, word-aligned stride

use crate::constants::codec::OPAQUE;
use image::{Rgba, RgbaImage};
use std::fmt;

/// Pixel layouts a `DecodedImage` can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Blue, green, red, then an unused byte set to 0xFF
    Bgrx32,
}

impl PixelFormat {
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Bgrx32 => 32,
        }
    }

    pub const fn bytes_per_pixel(self) -> usize {
        (self.bits_per_pixel() / 8) as usize
    }
}

/// Bytes in one scanline of `width` pixels, padded up to a 32-bit boundary.
///
/// Returns `None` when the row cannot be addressed on this platform.
pub fn stride_for(width: u32, bits_per_pixel: u32) -> Option<usize> {
    let bits = u64::from(width).checked_mul(u64::from(bits_per_pixel))?;
    let bytes = ((bits + 31) >> 5) << 2;
    usize::try_from(bytes).ok()
}

/// A fully decoded map, ready to be blitted by a presentation layer.
///
/// Row 0 is the topmost scanline. The caller owns the pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
    pixels: Vec<u8>,
}

impl DecodedImage {
    pub(crate) fn from_parts(
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
        pixels: Vec<u8>,
    ) -> Self {
        debug_assert_eq!(pixels.len(), stride * height as usize);
        Self {
            width,
            height,
            stride,
            format,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per scanline
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }

    /// Height as a device-independent bitmap header expects it.
    /// Negative because rows are stored top-down.
    pub fn dib_height(&self) -> i32 {
        -i32::try_from(self.height).unwrap_or(i32::MAX)
    }

    /// Scanline `y`, including any stride padding
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.stride;
        self.pixels.get(start..start + self.stride)
    }

    /// Raw BGRX bytes of the pixel at (`x`, `y`)
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let offset = x as usize * bpp;
        let bytes = self.row(y)?.get(offset..offset + bpp)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Give up the image, keeping only its pixel buffer
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Copy into an RGBA buffer, for callers that present through the `image` crate
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.width, self.height);
        for (y, row) in out.rows_mut().enumerate() {
            let start = y * self.stride;
            let src = &self.pixels[start..start + self.width as usize * 4];
            for (dst, bgrx) in row.zip(src.chunks_exact(4)) {
                *dst = Rgba([bgrx[2], bgrx[1], bgrx[0], OPAQUE]);
            }
        }
        out
    }
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("format", &self.format)
            .field("pixels", &format_args!("{} bytes", self.pixels.len()))
            .finish()
    }
}
