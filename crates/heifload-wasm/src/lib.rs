//! heifload WASM - WebAssembly bindings for heifload
//!
//! This crate exposes heifload-core frame preparation to JavaScript/TypeScript,
//! for pipelines where the HEIF bitstream is decoded on the JS side.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper for prepared frames
//! - `prepare` - Crop and orientation reconciliation bindings
//!
//! # Usage
//!
//! ```typescript
//! import init, { prepare_frame } from '@heifload/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! // frame: { mode, width, height, stride, crop?, orientation? }
//! // metadata: [{ kind, data: Uint8Array }], colorProfile: { kind, data } or undefined
//! const image = prepare_frame(frame, pixels, metadata, colorProfile, { crop: true });
//! console.log(`Prepared ${image.width}x${image.height}`);
//! ```

use wasm_bindgen::prelude::*;

mod prepare;
mod types;

// Re-export public types
pub use prepare::prepare_frame;
pub use types::JsLoadedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
