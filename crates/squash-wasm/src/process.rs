//! Pipeline bindings for a browser worker.
//!
//! Each browser worker instantiates this module once, so the codec registry
//! below is one per execution unit. The page posts `{ id, buffer, options }`,
//! the worker calls [`process_image`] and posts back progress and the result.
//!
//! ```typescript
//! import init, { process_image } from '@squash/wasm';
//!
//! self.onmessage = async ({ data }) => {
//!   await init();
//!   try {
//!     const result = process_image(new Uint8Array(data.buffer), data.options,
//!       (percent) => self.postMessage({ type: 'progress', id: data.id, percent }));
//!     const bytes = result.takeBytes();
//!     self.postMessage({ type: 'success', id: data.id, result: bytes.buffer }, [bytes.buffer]);
//!   } catch (e) {
//!     self.postMessage({ type: 'failure', id: data.id, message: String(e) });
//!   }
//! };
//! ```

use std::sync::OnceLock;

use squash_core::pipeline::{self, PipelineOutput, PipelineRequest};
use squash_core::format::UnknownFormat;
use squash_core::{CodecRegistry, FormatTag};
use wasm_bindgen::prelude::*;

use crate::types::{JsProcessResult, ProcessOptions};

static REGISTRY: OnceLock<CodecRegistry> = OnceLock::new();

fn registry() -> &'static CodecRegistry {
    REGISTRY.get_or_init(CodecRegistry::new)
}

/// Run decode, optional resize and encode on one image.
///
/// # Arguments
///
/// * `bytes` - The source file contents
/// * `options` - A `ProcessOptions` object
/// * `on_progress` - Optional callback receiving checkpoint percentages
///
/// # Errors
///
/// Throws the human-readable failure message if the options are malformed or
/// any stage fails.
#[wasm_bindgen]
pub fn process_image(
    bytes: &[u8],
    options: JsValue,
    on_progress: Option<js_sys::Function>,
) -> Result<JsProcessResult, JsValue> {
    let options: ProcessOptions = serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsValue::from_str(&format!("Invalid options: {}", e)))?;

    let output = run(&options, bytes, |percent| {
        if let Some(callback) = &on_progress {
            // A throwing callback must not abort the conversion
            let _ = callback.call1(&JsValue::NULL, &JsValue::from(percent));
        }
    })
    .map_err(|e| JsValue::from_str(&e))?;

    Ok(JsProcessResult::new(output.format, output.dimensions, output.bytes))
}

/// Load the codec for `format` ahead of the first task.
#[wasm_bindgen]
pub fn preload_codec(format: &str) -> Result<(), JsValue> {
    let format: FormatTag = format
        .parse()
        .map_err(|e: UnknownFormat| JsValue::from_str(&e.to_string()))?;
    registry()
        .ensure_loaded(format)
        .map(drop)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

pub(crate) fn run(
    options: &ProcessOptions,
    bytes: &[u8],
    progress: impl FnMut(u8),
) -> Result<PipelineOutput, String> {
    let request = PipelineRequest {
        source_format: options.source_type.clone(),
        target_format: options.output_type.clone(),
        quality: options.quality,
        resize: options.resize,
    };
    pipeline::run(registry(), &request, bytes, progress).map_err(|e| e.to_string())
}


/// WASM-specific tests that require JsValue.
///
/// Run with `wasm-pack test`.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use squash_core::encode::encode_png;
    use squash_core::PixelBuffer;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn options(target: &str) -> JsValue {
        let opts = ProcessOptions {
            source_type: "png".to_string(),
            output_type: target.to_string(),
            quality: 80,
            resize: Default::default(),
        };
        serde_wasm_bindgen::to_value(&opts).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_process_image_png_to_webp() {
        let png = encode_png(&PixelBuffer::new(4, 4, vec![200u8; 64])).unwrap();
        let mut result = process_image(&png, options("webp"), None).unwrap();

        assert_eq!(result.format(), "webp");
        let bytes = result.take_bytes().unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
    }

    #[wasm_bindgen_test]
    fn test_process_image_bad_options() {
        let result = process_image(&[], JsValue::from_str("not an object"), None);
        assert!(result.is_err());
    }

    #[wasm_bindgen_test]
    fn test_preload_unknown_format() {
        assert!(preload_codec("gif").is_err());
        assert!(preload_codec("jxl").is_err());
        assert!(preload_codec("png").is_ok());
    }
}
