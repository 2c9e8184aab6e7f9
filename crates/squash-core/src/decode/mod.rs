//! Image decoding for Squash.
//!
//! Every decoder turns an encoded byte buffer into a straight-alpha RGBA8
//! [`PixelBuffer`]. Decoders are reached through the codec registry; the free
//! functions here are the per-format implementations behind it.
//!
//! | Format | Decoder |
//! |--------|---------|
//! | JPEG   | [`decode_jpeg`] (applies EXIF orientation) |
//! | PNG    | [`decode_png`] |
//! | WebP   | [`decode_webp`] |
//! | AVIF   | not available |
//! | JPEG XL| not available |

mod jpeg;
mod raster;
mod types;

pub use jpeg::decode_jpeg;
pub use raster::{decode_png, decode_webp};
pub use types::{DecodeError, Orientation, PixelBuffer};
