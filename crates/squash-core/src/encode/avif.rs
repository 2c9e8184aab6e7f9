//! AVIF encoding via the `image` crate's rav1e-backed encoder.

use image::codecs::avif::AvifEncoder;
use image::{ExtendedColorType, ImageEncoder};

use super::{validate_image, EncodeError, Quality};
use crate::decode::PixelBuffer;
use crate::format::FormatTag;

/// Encoder speed, 1 (slowest) to 10 (fastest). Medium effort.
const AVIF_SPEED: u8 = 7;

/// Encode an image to AVIF bytes.
pub fn encode_avif(image: &PixelBuffer, quality: Quality) -> Result<Vec<u8>, EncodeError> {
    validate_image(image)?;

    let mut out = Vec::new();
    AvifEncoder::new_with_speed_quality(&mut out, AVIF_SPEED, quality.get())
        .write_image(&image.pixels, image.width, image.height, ExtendedColorType::Rgba8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: FormatTag::Avif,
            reason: e.to_string(),
        })?;
    Ok(out)
}
