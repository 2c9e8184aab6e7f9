//! Codecs backed by the `image` crate.

use std::sync::Arc;

use super::{Codec, LoadError};
use crate::decode::{self, DecodeError, PixelBuffer};
use crate::encode::{self, EncodeError, Quality};
use crate::format::FormatTag;

/// JPEG: decode (with EXIF orientation) and lossy encode.
#[derive(Debug, Default)]
pub struct JpegCodec;

impl Codec for JpegCodec {
    fn format(&self) -> FormatTag {
        FormatTag::Jpeg
    }

    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
        decode::decode_jpeg(bytes)
    }

    fn encode(&self, image: &PixelBuffer, quality: Quality) -> Result<Vec<u8>, EncodeError> {
        encode::encode_jpeg(image, quality)
    }
}

/// PNG: lossless both ways, quality is ignored.
#[derive(Debug, Default)]
pub struct PngCodec;

impl Codec for PngCodec {
    fn format(&self) -> FormatTag {
        FormatTag::Png
    }

    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
        decode::decode_png(bytes)
    }

    fn encode(&self, image: &PixelBuffer, _quality: Quality) -> Result<Vec<u8>, EncodeError> {
        encode::encode_png(image)
    }
}

/// WebP: decodes lossy and lossless, encodes lossless only.
#[derive(Debug, Default)]
pub struct WebpCodec;

impl Codec for WebpCodec {
    fn format(&self) -> FormatTag {
        FormatTag::Webp
    }

    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
        decode::decode_webp(bytes)
    }

    fn encode(&self, image: &PixelBuffer, _quality: Quality) -> Result<Vec<u8>, EncodeError> {
        encode::encode_webp(image)
    }
}

/// AVIF: encode only. Decoding needs the native dav1d library.
#[derive(Debug, Default)]
pub struct AvifCodec;

impl Codec for AvifCodec {
    fn format(&self) -> FormatTag {
        FormatTag::Avif
    }

    fn decode(&self, _bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
        Err(DecodeError::Unsupported(FormatTag::Avif))
    }

    fn encode(&self, image: &PixelBuffer, quality: Quality) -> Result<Vec<u8>, EncodeError> {
        encode::encode_avif(image, quality)
    }
}

/// Default loader used by [`CodecRegistry::new`](super::CodecRegistry::new).
///
/// JPEG XL has no backend in this build, so loading it always fails.
pub fn load_builtin(format: FormatTag) -> Result<Arc<dyn Codec>, LoadError> {
    match format {
        FormatTag::Avif => Ok(Arc::new(AvifCodec)),
        FormatTag::Jpeg => Ok(Arc::new(JpegCodec)),
        FormatTag::Png => Ok(Arc::new(PngCodec)),
        FormatTag::Webp => Ok(Arc::new(WebpCodec)),
        FormatTag::Jxl => Err(LoadError::Unavailable(format)),
    }
}
