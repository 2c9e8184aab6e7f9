//! Squash WASM - WebAssembly bindings for Squash
//!
//! Each browser worker loads this module and runs one execution unit's
//! pipeline through [`process_image`]. The page side uses the pure helpers to
//! size the worker pool and preview resize dimensions.
//!
//! # Module Structure
//!
//! - `process` - Pipeline entry point and codec preloading
//! - `helpers` - Pool sizing, dimension calculation, format detection
//! - `types` - WASM-compatible wrapper types for options and results
//!
//! # Usage
//!
//! ```typescript
//! import init, { pool_size, calculate_dimensions } from '@squash/wasm';
//!
//! await init();
//! const workers = pool_size(intensity, navigator.hardwareConcurrency);
//! const { width, height } = calculate_dimensions(6960, 4640, 1392, 0, true);
//! ```

use wasm_bindgen::prelude::*;

mod helpers;
mod process;
mod types;

pub use helpers::{calculate_dimensions, detect_format, format_file_size, pool_size};
pub use process::{preload_codec, process_image};
pub use types::{JsDimensions, JsProcessResult, ProcessOptions};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
