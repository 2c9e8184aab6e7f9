//! JPEG image decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageFormat};

use super::{DecodeError, Orientation, PixelBuffer};
use crate::format::FormatTag;

/// Decode a JPEG image from bytes, applying EXIF orientation correction.
///
/// # Errors
///
/// Returns `DecodeError::Malformed` if the bytes are not a valid JPEG.
pub fn decode_jpeg(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    // Orientation lives in the APP1 segment, read it before decoding
    let orientation = extract_orientation(bytes);

    let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg).map_err(|e| {
        DecodeError::Malformed {
            format: FormatTag::Jpeg,
            reason: e.to_string(),
        }
    })?;

    let oriented = apply_orientation(img, orientation);
    Ok(PixelBuffer::from_rgba_image(oriented.into_rgba8()))
}

/// Read the EXIF orientation from JPEG bytes.
///
/// Falls back to `Orientation::Normal` when there is no EXIF block or no
/// orientation tag.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
