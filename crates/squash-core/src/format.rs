//! Image format tags.
//!
//! A [`FormatTag`] names a raster format on both sides of the pipeline: the
//! source format a task is decoded from and the target format it is encoded to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default quality applied to every format when no quality is configured.
pub const DEFAULT_QUALITY: u8 = 75;

/// Error returned when a string does not name a known format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized format tag: {0}")]
pub struct UnknownFormat(pub String);

/// Raster formats understood by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatTag {
    /// AV1 Image File Format.
    Avif,
    /// JPEG (also accepted as `jpg`).
    #[serde(alias = "jpg")]
    Jpeg,
    /// JPEG XL.
    Jxl,
    /// Portable Network Graphics.
    Png,
    /// WebP.
    Webp,
}

impl FormatTag {
    /// All tags, in a stable order.
    pub const ALL: [FormatTag; 5] = [
        FormatTag::Avif,
        FormatTag::Jpeg,
        FormatTag::Jxl,
        FormatTag::Png,
        FormatTag::Webp,
    ];

    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            FormatTag::Avif => "avif",
            FormatTag::Jpeg => "jpeg",
            FormatTag::Jxl => "jxl",
            FormatTag::Png => "png",
            FormatTag::Webp => "webp",
        }
    }

    /// File extension used when writing a result.
    pub fn extension(self) -> &'static str {
        match self {
            FormatTag::Jpeg => "jpg",
            other => other.as_str(),
        }
    }

    /// MIME type of the encoded output.
    pub fn mime_type(self) -> &'static str {
        match self {
            FormatTag::Avif => "image/avif",
            FormatTag::Jpeg => "image/jpeg",
            FormatTag::Jxl => "image/jxl",
            FormatTag::Png => "image/png",
            FormatTag::Webp => "image/webp",
        }
    }

    /// Whether encoding to this format reproduces pixels exactly.
    ///
    /// WebP is lossless here because the encoder only writes VP8L.
    pub fn is_lossless(self) -> bool {
        matches!(self, FormatTag::Png | FormatTag::Webp)
    }

    /// Index into fixed-size per-format tables.
    pub(crate) fn index(self) -> usize {
        match self {
            FormatTag::Avif => 0,
            FormatTag::Jpeg => 1,
            FormatTag::Jxl => 2,
            FormatTag::Png => 3,
            FormatTag::Webp => 4,
        }
    }

    /// Parse a MIME type such as `image/png`.
    pub fn from_mime(mime: &str) -> Option<FormatTag> {
        let (kind, subtype) = mime.split_once('/')?;
        if !kind.trim().eq_ignore_ascii_case("image") {
            return None;
        }
        subtype.parse().ok()
    }

    /// Detect the format of a file from its name.
    ///
    /// A `.jxl` suffix always wins (browsers report no MIME type for it);
    /// otherwise the extension is matched against the known tags.
    pub fn from_file_name(name: &str) -> Option<FormatTag> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with("jxl") {
            return Some(FormatTag::Jxl);
        }
        let (_, ext) = lower.rsplit_once('.')?;
        ext.parse().ok()
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatTag {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "avif" => Ok(FormatTag::Avif),
            "jpeg" | "jpg" => Ok(FormatTag::Jpeg),
            "jxl" => Ok(FormatTag::Jxl),
            "png" => Ok(FormatTag::Png),
            "webp" => Ok(FormatTag::Webp),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Format a byte count for display ("0 B", "1.5 KB", "2.25 MB").
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut exponent = 0;
    while value >= 1024.0 && exponent < UNITS.len() - 1 {
        value /= 1024.0;
        exponent += 1;
    }

    // Two decimals at most, trailing zeros trimmed
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[exponent])
}
