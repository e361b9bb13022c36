//! WASM-compatible wrapper types for prepared frames.
//!
//! This module provides JavaScript-friendly types that wrap the core heifload
//! types, handling the conversion between Rust and JavaScript data representations.

use heifload_core::LoadedImage;
use wasm_bindgen::prelude::*;

/// A prepared HEIF frame for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`.
///
/// The `free()` method can be called to explicitly release WASM memory, but this is
/// optional as wasm-bindgen's finalizer will handle cleanup automatically.
#[wasm_bindgen]
pub struct JsLoadedImage {
    inner: LoadedImage,
}

#[wasm_bindgen]
impl JsLoadedImage {
    /// Pixel mode name ("L", "RGB", "RGBA", or the decoder's own name)
    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> String {
        self.inner.mode.name().to_string()
    }

    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Bytes per row of `pixels()`. Can be larger than width * bytes per pixel.
    #[wasm_bindgen(getter)]
    pub fn stride(&self) -> usize {
        self.inner.stride
    }

    /// EXIF orientation (1-8), or undefined if the frame has none.
    #[wasm_bindgen(getter)]
    pub fn orientation(&self) -> Option<u8> {
        self.inner.orientation().map(|o| o as u8)
    }

    /// Returns pixel rows as Uint8Array, `stride` bytes apart.
    ///
    /// Note: This creates a copy of the pixel data.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels.clone()
    }

    /// Returns pixel data with row padding removed.
    ///
    /// # Errors
    /// Returns an error if the pixel mode is unknown.
    pub fn packed_pixels(&self) -> Result<Vec<u8>, JsValue> {
        self.inner
            .packed_pixels()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// EXIF block (`Exif\0\0` + TIFF), or undefined.
    pub fn exif(&self) -> Option<Vec<u8>> {
        self.inner.exif.clone()
    }

    /// ICC profile bytes, or undefined.
    pub fn icc_profile(&self) -> Option<Vec<u8>> {
        self.inner.icc_profile.clone()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl From<LoadedImage> for JsLoadedImage {
    fn from(inner: LoadedImage) -> Self {
        Self { inner }
    }
}
