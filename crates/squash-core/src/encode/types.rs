//! Core types for image encoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::PixelBuffer;
use crate::format::FormatTag;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The target format tag is not one the pipeline knows.
    #[error("Unsupported output type: {0}")]
    UnknownFormat(String),

    /// The format is known but this build cannot encode it.
    #[error("Encoding to {0} is not supported")]
    Unsupported(FormatTag),

    /// Quality outside 1..=100.
    #[error("Invalid quality {0}: expected a value between 1 and 100")]
    InvalidQuality(u8),

    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed.
    #[error("Failed to encode to {format}: {reason}")]
    EncodingFailed { format: FormatTag, reason: String },
}

/// Encoder quality, validated to lie in 1..=100.
///
/// Deserializes from a bare integer and rejects out-of-range values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    /// Lowest accepted quality.
    pub const MIN: u8 = 1;
    /// Highest accepted quality.
    pub const MAX: u8 = 100;

    /// Validate a raw quality value.
    pub fn new(value: u8) -> Result<Self, EncodeError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(EncodeError::InvalidQuality(value))
        }
    }

    /// The raw value.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(crate::format::DEFAULT_QUALITY)
    }
}

impl TryFrom<u8> for Quality {
    type Error = EncodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> u8 {
        quality.0
    }
}

/// Check that an image is encodable: non-zero dimensions and a buffer length
/// matching them.
pub(crate) fn validate_image(image: &PixelBuffer) -> Result<(), EncodeError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = width as usize * height as usize * PixelBuffer::CHANNELS;
    if image.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: image.pixels.len(),
        });
    }
    Ok(())
}
