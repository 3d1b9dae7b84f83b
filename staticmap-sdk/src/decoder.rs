// ABOUTME: Decodes a downloaded payload into a 32bpp BGRX top-down bitmap
// ABOUTME: Owns codec limits through ImageCodecContext and picks the first frame only

use crate::bitmap::{stride_for, DecodedImage, PixelFormat};
use crate::constants::codec::{MAX_ALLOC_BYTES, MAX_IMAGE_HEIGHT, MAX_IMAGE_WIDTH, OPAQUE};
use crate::error::DecodeError;
use image::codecs::gif::GifDecoder;
use image::{
    AnimationDecoder, DynamicImage, ImageDecoder, ImageFormat, ImageReader, ImageResult, Limits,
    RgbImage,
};
use std::io::Cursor;

/// Turns a complete payload into a displayable image
pub trait MapDecoder: Send + Sync {
    fn decode(&self, payload: &[u8]) -> Result<DecodedImage, DecodeError>;
}

/// Bounds applied to every decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecLimits {
    pub max_width: u32,
    pub max_height: u32,
    pub max_alloc: u64,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_width: MAX_IMAGE_WIDTH,
            max_height: MAX_IMAGE_HEIGHT,
            max_alloc: MAX_ALLOC_BYTES,
        }
    }
}

/// Codec settings shared by every decode in the process.
///
/// Create one at startup and pass it by reference.
#[derive(Debug, Clone, Default)]
pub struct ImageCodecContext {
    limits: CodecLimits,
}

impl ImageCodecContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: CodecLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> CodecLimits {
        self.limits
    }

    fn image_limits(&self) -> Limits {
        let mut limits = Limits::default();
        limits.max_image_width = Some(self.limits.max_width);
        limits.max_image_height = Some(self.limits.max_height);
        limits.max_alloc = Some(self.limits.max_alloc);
        limits
    }
}

impl MapDecoder for ImageCodecContext {
    fn decode(&self, payload: &[u8]) -> Result<DecodedImage, DecodeError> {
        decode(self, payload)
    }
}

/// Decode `payload`, auto-detecting its format, into a `Bgrx32` bitmap.
///
/// The frame's own dimensions are used as-is.
pub fn decode(ctx: &ImageCodecContext, payload: &[u8]) -> Result<DecodedImage, DecodeError> {
    if payload.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }

    let reader = ImageReader::new(Cursor::new(payload))
        .with_guessed_format()
        .map_err(|e| DecodeError::UnsupportedOrCorrupt(e.to_string()))?;
    let format = reader.format().ok_or_else(|| {
        DecodeError::UnsupportedOrCorrupt("unrecognized image format".to_string())
    })?;
    log::debug!("Decoding {} byte {:?} payload", payload.len(), format);

    let frame = match format {
        ImageFormat::Gif if gif_has_no_frames(payload) => return Err(DecodeError::NoFrames),
        ImageFormat::Jpeg if !jpeg_is_complete(payload) => {
            return Err(DecodeError::UnsupportedOrCorrupt(
                "JPEG stream ends before its EOI marker".to_string(),
            ))
        }
        ImageFormat::Gif => {
            let mut decoder = GifDecoder::new(Cursor::new(payload))?;
            decoder.set_limits(ctx.image_limits())?;
            let frames = decoder
                .into_frames()
                .map(|frame| frame.map(|frame| DynamicImage::ImageRgba8(frame.into_buffer())));
            first_frame(frames)?
        }
        _ => {
            let mut reader = reader;
            reader.limits(ctx.image_limits());
            first_frame(std::iter::once(reader.decode()))?
        }
    };

    let image = convert_frame(frame)?;
    log::debug!(
        "Decoded {}x{} bitmap ({} bytes)",
        image.width(),
        image.height(),
        image.byte_len()
    );
    Ok(image)
}

/// Frame 0 of a container. Later frames are never decoded.
fn first_frame<I>(frames: I) -> Result<DynamicImage, DecodeError>
where
    I: IntoIterator<Item = ImageResult<DynamicImage>>,
{
    match frames.into_iter().next() {
        Some(frame) => Ok(frame?),
        None => Err(DecodeError::NoFrames),
    }
}

/// True when a GIF reaches its trailer without an image descriptor.
///
/// Truncated or malformed block streams return false and are left to the codec.
fn gif_has_no_frames(payload: &[u8]) -> bool {
    const HEADER_LEN: usize = 13;
    let Some(&packed) = payload.get(10) else {
        return false;
    };
    let mut pos = HEADER_LEN;
    if packed & 0x80 != 0 {
        pos += 3 << ((packed & 0x07) + 1);
    }

    loop {
        match payload.get(pos) {
            Some(0x3B) => return true,
            Some(0x21) => {
                // Extension: introducer, label, then sub-blocks up to a zero length
                pos += 2;
                loop {
                    match payload.get(pos) {
                        Some(0) => {
                            pos += 1;
                            break;
                        }
                        Some(&len) => pos += 1 + len as usize,
                        None => return false,
                    }
                }
            }
            _ => return false,
        }
    }
}

/// True when the stream ends with an EOI marker, ignoring trailing zero padding
fn jpeg_is_complete(payload: &[u8]) -> bool {
    let end = payload
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |last| last + 1);
    payload[..end].ends_with(&[0xFF, 0xD9])
}

fn convert_frame(frame: DynamicImage) -> Result<DecodedImage, DecodeError> {
    let (width, height) = (frame.width(), frame.height());
    if width == 0 || height == 0 {
        return Err(DecodeError::SurfaceCreationFailed(format!(
            "frame has no pixels ({}x{})",
            width, height
        )));
    }

    let format = PixelFormat::Bgrx32;
    let stride = stride_for(width, format.bits_per_pixel())
        .ok_or_else(|| surface_too_large(width, height))?;
    let len = stride
        .checked_mul(height as usize)
        .ok_or_else(|| surface_too_large(width, height))?;

    // Alpha is dropped: every pixel is treated as opaque
    let rgb = frame.into_rgb8();
    let expected = width as usize * height as usize * 3;
    if rgb.as_raw().len() != expected {
        return Err(DecodeError::ConversionFailed(format!(
            "converted frame holds {} bytes, expected {}",
            rgb.as_raw().len(),
            expected
        )));
    }

    let mut pixels = Vec::new();
    pixels
        .try_reserve_exact(len)
        .map_err(|e| DecodeError::SurfaceCreationFailed(e.to_string()))?;
    pixels.resize(len, 0);

    copy_rows(&rgb, &mut pixels, stride)?;
    Ok(DecodedImage::from_parts(width, height, stride, format, pixels))
}

fn surface_too_large(width: u32, height: u32) -> DecodeError {
    DecodeError::SurfaceCreationFailed(format!("{}x{} bitmap is too large", width, height))
}

/// Copy RGB rows into `dst` as BGRX, top row first
fn copy_rows(src: &RgbImage, dst: &mut [u8], stride: usize) -> Result<(), DecodeError> {
    let row_bytes = src.width() as usize * 3;
    let rows = src.height() as usize;
    if stride < src.width() as usize * 4 || dst.len() < stride * rows {
        return Err(DecodeError::CopyFailed(format!(
            "destination of {} bytes with stride {} cannot hold {} rows",
            dst.len(),
            stride,
            rows
        )));
    }

    for (src_row, dst_row) in src
        .as_raw()
        .chunks_exact(row_bytes)
        .zip(dst.chunks_exact_mut(stride))
    {
        for (rgb, bgrx) in src_row.chunks_exact(3).zip(dst_row.chunks_exact_mut(4)) {
            bgrx[0] = rgb[2];
            bgrx[1] = rgb[1];
            bgrx[2] = rgb[0];
            bgrx[3] = OPAQUE;
        }
    }
    Ok(())
}
