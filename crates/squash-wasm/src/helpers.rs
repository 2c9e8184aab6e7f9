//! Pure helpers the page needs before any task exists: pool sizing, target
//! dimensions, format detection and size formatting.

use squash_core::{FormatTag, PoolConfig};
use wasm_bindgen::prelude::*;

use crate::types::JsDimensions;

/// Number of workers to spawn for `intensity`, given
/// `navigator.hardwareConcurrency` (which may be undefined or 0).
#[wasm_bindgen]
pub fn pool_size(intensity: u8, hardware_concurrency: Option<u32>) -> u32 {
    let hint = hardware_concurrency.map(|n| n as usize);
    squash_core::pool_size(&PoolConfig::default(), intensity, hint) as u32
}

/// Dimensions a resize would produce. Zero targets mean "not specified".
#[wasm_bindgen]
pub fn calculate_dimensions(
    original_width: u32,
    original_height: u32,
    target_width: u32,
    target_height: u32,
    maintain_aspect_ratio: bool,
) -> JsDimensions {
    squash_core::calculate_dimensions(
        original_width,
        original_height,
        target_width,
        target_height,
        maintain_aspect_ratio,
    )
    .into()
}

/// Format tag for a dropped file, from its MIME type or, failing that, its
/// name. Returns `undefined` for unsupported files.
#[wasm_bindgen]
pub fn detect_format(file_name: &str, mime_type: &str) -> Option<String> {
    let by_name = FormatTag::from_file_name(file_name);
    // Browsers report no MIME type for .jxl
    let tag = match by_name {
        Some(FormatTag::Jxl) => by_name,
        _ => FormatTag::from_mime(mime_type).or(by_name),
    };
    tag.map(|t| t.as_str().to_string())
}

/// Human-readable byte count ("1.5 KB").
#[wasm_bindgen]
pub fn format_file_size(bytes: f64) -> String {
    squash_core::format_file_size(bytes.max(0.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_size() {
        assert_eq!(pool_size(1, Some(8)), 1);
        assert_eq!(pool_size(5, Some(8)), 4);
        assert_eq!(pool_size(5, Some(2)), 2);
        assert_eq!(pool_size(5, Some(0)), 1);
        assert!((1..=4).contains(&pool_size(5, None)));
    }

    #[test]
    fn test_calculate_dimensions() {
        let dims = calculate_dimensions(6960, 4640, 1392, 0, true);
        assert_eq!((dims.width, dims.height), (1392, 928));
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format("a.png", "image/png").as_deref(), Some("png"));
        assert_eq!(detect_format("photo.jpg", "image/jpeg").as_deref(), Some("jpeg"));
        assert_eq!(detect_format("scan.jxl", "").as_deref(), Some("jxl"));
        assert_eq!(detect_format("noext", "image/webp").as_deref(), Some("webp"));
        assert_eq!(detect_format("clip.mp4", "video/mp4"), None);
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(1536.0), "1.5 KB");
        assert_eq!(format_file_size(-3.0), "0 B");
    }
}
