//! Resampling.
//!
//! With neither `premultiply_alpha` nor `linear_rgb` set, the RGBA8 buffer is
//! filtered directly. Otherwise the pixels are lifted into an `Rgba32F`
//! working buffer, converted (sRGB to linear, straight to premultiplied alpha),
//! filtered, and converted back.

use image::imageops;
use image::{ImageBuffer, Rgba};
use thiserror::Error;

use super::{Dimensions, ResizeConfig};
use crate::decode::PixelBuffer;

/// Errors raised by the resize stage.
#[derive(Debug, Error)]
pub enum ResizeError {
    /// Width or height is zero.
    #[error("Invalid resize target: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel data length doesn't match the source dimensions.
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// The resampling buffers for the target would exceed [`MAX_RESIZE_ALLOC`].
    #[error("Resize target too large: {width}x{height}")]
    TooLarge { width: u32, height: u32 },
}

/// Upper bound on the working buffer for one resize, in bytes.
///
/// Matches the default `max_alloc` of `image::Limits`, so decode and resize
/// refuse inputs at the same scale.
pub const MAX_RESIZE_ALLOC: u64 = 512 * 1024 * 1024;

/// Bytes per pixel of the `Rgba32F` buffers the filter allocates.
const WORKING_BYTES_PER_PIXEL: u64 = 16;

type LinearImage = ImageBuffer<Rgba<f32>, Vec<f32>>;

/// Resample `image` to `target`.
///
/// Consumes the source buffer. If the source already has the target size it
/// is returned untouched.
pub fn resize(
    image: PixelBuffer,
    target: Dimensions,
    config: &ResizeConfig,
) -> Result<PixelBuffer, ResizeError> {
    if target.width == 0 || target.height == 0 {
        return Err(ResizeError::InvalidDimensions {
            width: target.width,
            height: target.height,
        });
    }

    if image.dimensions() == (target.width, target.height) {
        return Ok(image);
    }

    let needed = target.width as u64 * target.height as u64 * WORKING_BYTES_PER_PIXEL;
    if needed > MAX_RESIZE_ALLOC {
        return Err(ResizeError::TooLarge {
            width: target.width,
            height: target.height,
        });
    }

    let filter = config.method.to_image_filter();
    let expected = image.width as usize * image.height as usize * PixelBuffer::CHANNELS;
    let actual = image.pixels.len();
    let source = image
        .into_rgba_image()
        .ok_or(ResizeError::InvalidPixelData { expected, actual })?;

    if !config.premultiply_alpha && !config.linear_rgb {
        let resized = imageops::resize(&source, target.width, target.height, filter);
        return Ok(PixelBuffer::from_rgba_image(resized));
    }

    let working = to_working(&source, config);
    let resized = imageops::resize(&working, target.width, target.height, filter);
    Ok(from_working(&resized, config))
}

fn to_working(source: &image::RgbaImage, config: &ResizeConfig) -> LinearImage {
    let lut = config.linear_rgb.then(srgb_to_linear_table);

    let mut out = LinearImage::new(source.width(), source.height());
    for (dst, src) in out.pixels_mut().zip(source.pixels()) {
        let alpha = src[3] as f32 / 255.0;
        for c in 0..3 {
            let mut v = match &lut {
                Some(table) => table[src[c] as usize],
                None => src[c] as f32 / 255.0,
            };
            if config.premultiply_alpha {
                v *= alpha;
            }
            dst[c] = v;
        }
        dst[3] = alpha;
    }
    out
}

fn from_working(working: &LinearImage, config: &ResizeConfig) -> PixelBuffer {
    let mut pixels = Vec::with_capacity(working.len());
    for px in working.pixels() {
        let alpha = px[3].clamp(0.0, 1.0);
        for c in 0..3 {
            let mut v = px[c];
            if config.premultiply_alpha {
                v = if alpha > 0.0 { v / alpha } else { 0.0 };
            }
            let v = v.clamp(0.0, 1.0);
            let v = if config.linear_rgb { linear_to_srgb(v) } else { v };
            pixels.push(to_byte(v));
        }
        pixels.push(to_byte(alpha));
    }
    PixelBuffer::new(working.width(), working.height(), pixels)
}

fn srgb_to_linear_table() -> [f32; 256] {
    let mut table = [0.0f32; 256];
    for (i, slot) in table.iter_mut().enumerate() {
        *slot = srgb_to_linear(i as f32 / 255.0);
    }
    table
}

#[inline]
fn srgb_to_linear(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
fn linear_to_srgb(v: f32) -> f32 {
    if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

#[inline]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
