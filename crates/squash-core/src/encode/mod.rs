//! Image encoding for Squash.
//!
//! Encoders take an RGBA8 [`PixelBuffer`](crate::decode::PixelBuffer) and a
//! validated [`Quality`] and produce the encoded bytes of the target format.
//!
//! - JPEG: lossy, alpha is dropped.
//! - PNG: lossless, quality has no effect.
//! - WebP: lossless (VP8L), quality has no effect.
//! - AVIF: lossy, alpha preserved.

mod avif;
mod jpeg;
mod raster;
mod types;

pub use avif::encode_avif;
pub use jpeg::encode_jpeg;
pub use raster::{encode_png, encode_webp};
pub use types::{EncodeError, Quality};

pub(crate) use types::validate_image;
