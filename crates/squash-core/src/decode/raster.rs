//! Decoding for formats the `image` crate reads directly (PNG, WebP).

use image::ImageFormat;

use super::{DecodeError, PixelBuffer};
use crate::format::FormatTag;

/// Decode PNG bytes into RGBA8.
pub fn decode_png(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    decode_as(bytes, FormatTag::Png, ImageFormat::Png)
}

/// Decode WebP bytes (lossy or lossless) into RGBA8.
pub fn decode_webp(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    decode_as(bytes, FormatTag::Webp, ImageFormat::WebP)
}

fn decode_as(bytes: &[u8], tag: FormatTag, format: ImageFormat) -> Result<PixelBuffer, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::CorruptedFile("empty input".to_string()));
    }

    let img = image::load_from_memory_with_format(bytes, format).map_err(|e| {
        DecodeError::Malformed {
            format: tag,
            reason: e.to_string(),
        }
    })?;

    Ok(PixelBuffer::from_rgba_image(img.into_rgba8()))
}
