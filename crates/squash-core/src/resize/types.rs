//! Resize configuration types.

use serde::{Deserialize, Serialize};

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Resampling kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMethod {
    /// Lanczos windowed sinc, radius 3.
    #[default]
    Lanczos3,
    /// Catmull-Rom bicubic.
    CatmullRom,
}

impl ResizeMethod {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            ResizeMethod::Lanczos3 => image::imageops::FilterType::Lanczos3,
            ResizeMethod::CatmullRom => image::imageops::FilterType::CatmullRom,
        }
    }
}

/// Named target sizes, as percentages of a 6960x4640 frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizePreset {
    /// 100%: 6960x4640.
    #[default]
    Full,
    /// 50%: 3480x2320.
    Half,
    /// 33%: 2297x1531.
    Third,
    /// 20%: 1392x928.
    Fifth,
    /// 10%: 696x464.
    Tenth,
    /// Width and height entered by hand.
    Custom,
}

impl ResizePreset {
    /// Dimensions of this preset, `None` for [`ResizePreset::Custom`].
    pub fn dimensions(self) -> Option<Dimensions> {
        let (width, height) = match self {
            ResizePreset::Full => (6960, 4640),
            ResizePreset::Half => (3480, 2320),
            ResizePreset::Third => (2297, 1531),
            ResizePreset::Fifth => (1392, 928),
            ResizePreset::Tenth => (696, 464),
            ResizePreset::Custom => return None,
        };
        Some(Dimensions::new(width, height))
    }

    /// Parse the percentage labels used by front ends ("100", "50", ...).
    pub fn from_percent(label: &str) -> Option<ResizePreset> {
        match label.trim().trim_end_matches('%') {
            "100" => Some(ResizePreset::Full),
            "50" => Some(ResizePreset::Half),
            "33" => Some(ResizePreset::Third),
            "20" => Some(ResizePreset::Fifth),
            "10" => Some(ResizePreset::Tenth),
            "custom" => Some(ResizePreset::Custom),
            _ => None,
        }
    }
}

/// Resize settings carried by every task.
///
/// A zero `width` or `height` means "not specified".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResizeConfig {
    /// Resize stage runs only when enabled.
    pub enabled: bool,
    /// Target width, 0 if absent.
    pub width: u32,
    /// Target height, 0 if absent.
    pub height: u32,
    /// Lock the original aspect ratio.
    pub maintain_aspect_ratio: bool,
    /// Resampling kernel.
    pub method: ResizeMethod,
    /// Filter in premultiplied alpha.
    pub premultiply_alpha: bool,
    /// Filter in linear light instead of sRGB.
    #[serde(rename = "linearRGB", alias = "linearRgb")]
    pub linear_rgb: bool,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            width: 6960,
            height: 4640,
            maintain_aspect_ratio: true,
            method: ResizeMethod::default(),
            premultiply_alpha: true,
            linear_rgb: true,
        }
    }
}

impl ResizeConfig {
    /// Enabled config with the given targets and aspect lock, other flags default.
    pub fn to(width: u32, height: u32, maintain_aspect_ratio: bool) -> Self {
        Self {
            enabled: true,
            width,
            height,
            maintain_aspect_ratio,
            ..Self::default()
        }
    }

    /// Apply a preset's dimensions. Custom leaves the current targets alone.
    pub fn with_preset(mut self, preset: ResizePreset) -> Self {
        if let Some(dims) = preset.dimensions() {
            self.width = dims.width;
            self.height = dims.height;
        }
        self
    }
}
