//! Codec abstraction and the per-format codec registry.
//!
//! A [`Codec`] bundles the decoder and encoder of one format. Codecs are never
//! constructed directly by the pipeline; they are obtained through
//! [`CodecRegistry::ensure_loaded`], which initializes each format at most once
//! and shares that initialization between concurrent callers.

mod builtin;
mod registry;

pub use builtin::{load_builtin, AvifCodec, JpegCodec, PngCodec, WebpCodec};
pub use registry::{CodecLoader, CodecRegistry, LoadError};

use crate::decode::{DecodeError, PixelBuffer};
use crate::encode::{EncodeError, Quality};
use crate::format::FormatTag;

/// Decoder and encoder for a single format.
pub trait Codec: Send + Sync {
    /// The format this codec handles.
    fn format(&self) -> FormatTag;

    /// Decode encoded bytes into RGBA8 pixels.
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, DecodeError>;

    /// Encode RGBA8 pixels.
    fn encode(&self, image: &PixelBuffer, quality: Quality) -> Result<Vec<u8>, EncodeError>;
}
