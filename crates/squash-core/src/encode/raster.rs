//! Lossless encoders: PNG and WebP (VP8L).

use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{validate_image, EncodeError};
use crate::decode::PixelBuffer;
use crate::format::FormatTag;

/// Encode an image to PNG bytes.
pub fn encode_png(image: &PixelBuffer) -> Result<Vec<u8>, EncodeError> {
    validate_image(image)?;

    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(&image.pixels, image.width, image.height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: FormatTag::Png,
            reason: e.to_string(),
        })?;
    Ok(out)
}

/// Encode an image to lossless WebP bytes.
pub fn encode_webp(image: &PixelBuffer) -> Result<Vec<u8>, EncodeError> {
    validate_image(image)?;

    let mut out = Vec::new();
    WebPEncoder::new_lossless(&mut out)
        .write_image(&image.pixels, image.width, image.height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: FormatTag::Webp,
            reason: e.to_string(),
        })?;
    Ok(out)
}
