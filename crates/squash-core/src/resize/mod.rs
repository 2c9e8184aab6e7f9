//! Resize engine: target dimension calculation and high-quality resampling.
//!
//! [`calculate_dimensions`] is a pure function of the original size and the
//! requested targets. [`resize`] resamples an RGBA8 buffer to those dimensions
//! with a Lanczos3 (default) or Catmull-Rom kernel, optionally in linear light
//! and with premultiplied alpha.

mod dimensions;
mod sample;
mod types;

pub use dimensions::{calculate_dimensions, target_dimensions};
pub use sample::{resize, ResizeError, MAX_RESIZE_ALLOC};
pub use types::{Dimensions, ResizeConfig, ResizeMethod, ResizePreset};
