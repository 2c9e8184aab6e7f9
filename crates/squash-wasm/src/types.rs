//! WASM-compatible wrapper types for task options and results.
//!
//! Options arrive from JavaScript as plain objects and are deserialized with
//! `serde-wasm-bindgen`; results go back as a `#[wasm_bindgen]` struct whose
//! encoded bytes are moved out exactly once.

use serde::{Deserialize, Serialize};
use squash_core::{Dimensions, FormatTag, ResizeConfig, TransferBuffer};
use wasm_bindgen::prelude::*;

/// Per-task options as posted by the page.
///
/// ```typescript
/// {
///   sourceType: 'png',
///   outputType: 'webp',
///   quality: 75,
///   resize: { enabled: true, width: 1392, height: 0, maintainAspectRatio: true }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOptions {
    #[serde(alias = "sourceFormat")]
    pub source_type: String,
    #[serde(alias = "targetFormat")]
    pub output_type: String,
    #[serde(default = "default_quality")]
    pub quality: u8,
    #[serde(default)]
    pub resize: ResizeConfig,
}

fn default_quality() -> u8 {
    squash_core::format::DEFAULT_QUALITY
}

/// An encoded result handed back to JavaScript.
#[wasm_bindgen]
pub struct JsProcessResult {
    format: FormatTag,
    width: u32,
    height: u32,
    bytes: Option<TransferBuffer>,
}

#[wasm_bindgen]
impl JsProcessResult {
    /// Target format tag ("webp", "jpeg", ...).
    #[wasm_bindgen(getter)]
    pub fn format(&self) -> String {
        self.format.as_str().to_string()
    }

    /// MIME type for building a `Blob`.
    #[wasm_bindgen(getter, js_name = mimeType)]
    pub fn mime_type(&self) -> String {
        self.format.mime_type().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Encoded size in bytes, 0 once the bytes have been taken.
    #[wasm_bindgen(getter, js_name = byteLength)]
    pub fn byte_length(&self) -> usize {
        self.bytes.as_ref().map_or(0, TransferBuffer::len)
    }

    /// Move the encoded bytes out as a `Uint8Array`.
    ///
    /// Can be called once; afterwards the result holds nothing.
    #[wasm_bindgen(js_name = takeBytes)]
    pub fn take_bytes(&mut self) -> Option<Vec<u8>> {
        self.bytes.take().map(TransferBuffer::into_inner)
    }
}

impl JsProcessResult {
    pub(crate) fn new(format: FormatTag, dimensions: Dimensions, bytes: Vec<u8>) -> Self {
        Self {
            format,
            width: dimensions.width,
            height: dimensions.height,
            bytes: Some(TransferBuffer::new(bytes)),
        }
    }
}

/// Width and height pair for JavaScript.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsDimensions {
    pub width: u32,
    pub height: u32,
}

impl From<Dimensions> for JsDimensions {
    fn from(dims: Dimensions) -> Self {
        Self {
            width: dims.width,
            height: dims.height,
        }
    }
}
