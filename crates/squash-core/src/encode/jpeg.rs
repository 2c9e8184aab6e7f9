//! JPEG encoding.
//!
//! JPEG has no alpha channel; the alpha byte of every pixel is discarded
//! before encoding.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

use super::{validate_image, EncodeError, Quality};
use crate::decode::PixelBuffer;
use crate::format::FormatTag;

/// Encode an image to JPEG bytes.
///
/// # Quality Guidelines
///
/// * 90-100: High quality, suitable for archival or further editing
/// * 75-90: Good quality, recommended for most uses (default: 75)
/// * 60-75: Medium quality, acceptable for web/social media
/// * Below 60: Low quality, visible artifacts
pub fn encode_jpeg(image: &PixelBuffer, quality: Quality) -> Result<Vec<u8>, EncodeError> {
    validate_image(image)?;

    let rgb: Vec<u8> = image
        .pixels
        .chunks_exact(PixelBuffer::CHANNELS)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.get());

    encoder
        .write_image(&rgb, image.width, image.height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: FormatTag::Jpeg,
            reason: e.to_string(),
        })?;

    Ok(buffer.into_inner())
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for generating image dimensions (keep small for speed).
    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=50, 1u32..=50)
    }

    /// Strategy for generating quality values.
    fn quality_strategy() -> impl Strategy<Value = Quality> {
        (1u8..=100).prop_map(|v| Quality::new(v).unwrap())
    }

    proptest! {
        /// Property: Encoding always produces valid JPEG when given valid input.
        #[test]
        fn prop_valid_input_produces_valid_jpeg(
            (width, height) in dimensions_strategy(),
            quality in quality_strategy(),
        ) {
            let image = PixelBuffer::new(width, height, vec![128u8; (width * height * 4) as usize]);

            let result = encode_jpeg(&image, quality);
            prop_assert!(result.is_ok(), "Valid input should produce valid output");

            let jpeg_bytes = result.unwrap();
            prop_assert_eq!(&jpeg_bytes[0..2], &[0xFF, 0xD8], "Should have SOI marker");

            let len = jpeg_bytes.len();
            prop_assert!(len >= 4, "JPEG should have at least 4 bytes");
            prop_assert_eq!(&jpeg_bytes[len - 2..], &[0xFF, 0xD9], "Should have EOI marker");
        }

        /// Property: Same input always produces same output (deterministic).
        #[test]
        fn prop_deterministic_output(
            (width, height) in (1u32..=20, 1u32..=20),
            quality in quality_strategy(),
        ) {
            let image = PixelBuffer::new(width, height, vec![100u8; (width * height * 4) as usize]);

            let result1 = encode_jpeg(&image, quality);
            let result2 = encode_jpeg(&image, quality);

            prop_assert!(result1.is_ok() && result2.is_ok());
            prop_assert_eq!(result1.unwrap(), result2.unwrap(), "Same input should produce same output");
        }

        /// Property: Invalid pixel data length always returns error.
        #[test]
        fn prop_invalid_pixel_length_returns_error(
            (width, height) in dimensions_strategy(),
            quality in quality_strategy(),
            extra_or_missing in -10i32..=10,
        ) {
            prop_assume!(extra_or_missing != 0);

            let expected_size = (width as usize) * (height as usize) * 4;
            let actual_size = if extra_or_missing > 0 {
                expected_size + extra_or_missing as usize
            } else {
                expected_size.saturating_sub((-extra_or_missing) as usize)
            };
            prop_assume!(actual_size != expected_size);

            let image = PixelBuffer { width, height, pixels: vec![128u8; actual_size] };
            let result = encode_jpeg(&image, quality);

            prop_assert!(
                matches!(result, Err(EncodeError::InvalidPixelData { .. })),
                "Mismatched pixel data should return InvalidPixelData error"
            );
        }
    }
}
