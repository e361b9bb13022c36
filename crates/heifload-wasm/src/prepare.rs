//! Frame preparation WASM bindings.
//!
//! A JavaScript HEIF decoder (such as libheif compiled to WASM/JS) decodes
//! the file without applying transforms and passes the frame here. The
//! crop is resolved and the orientation is folded into EXIF before the
//! pixels go back to JavaScript.
//!
//! # Example
//!
//! ```typescript
//! import { prepare_frame } from '@heifload/wasm';
//!
//! const image = prepare_frame(
//!   { mode: 'RGB', width: 1280, height: 720, stride: 3840,
//!     crop: { x: 99, y: 33, width: 512, height: 256 }, orientation: 6 },
//!   decoded.data,
//!   [{ kind: 'Exif', data: exifBytes }],
//!   { kind: 'prof', data: iccBytes },
//!   { crop: true },
//! );
//! console.log(`${image.width}x${image.height}, orientation ${image.orientation}`);
//! ```

use heifload_core::{
    ColorProfile, CropRect, DecodedContainer, LoadOptions, MetadataBlock, PixelMode,
};
use js_sys::{Array, Reflect, Uint8Array};
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::types::JsLoadedImage;

/// Frame geometry and declared transforms, deserialized via serde.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrameDescriptor {
    mode: PixelMode,
    width: u32,
    height: u32,
    stride: usize,
    #[serde(default)]
    crop: Option<CropRect>,
    #[serde(default)]
    orientation: u32,
}

/// Prepare a decoded HEIF frame.
///
/// # Arguments
///
/// * `frame` - `{ mode, width, height, stride, crop?, orientation? }`
/// * `data` - Decoded pixel rows, `stride` bytes apart
/// * `metadata` - Array of `{ kind: string, data: Uint8Array }` items
/// * `color_profile` - `{ kind: string, data: Uint8Array }` or undefined
/// * `options` - `{ crop?: boolean, reconcileOrientation?: boolean,
///   acceptRestrictedIcc?: boolean }` or undefined
///
/// # Errors
///
/// Returns an error if an argument is malformed, the buffer is too small
/// for the frame, or a crop is requested on an unknown pixel mode.
#[wasm_bindgen]
pub fn prepare_frame(
    frame: JsValue,
    data: Vec<u8>,
    metadata: Array,
    color_profile: JsValue,
    options: JsValue,
) -> Result<JsLoadedImage, JsValue> {
    let descriptor: FrameDescriptor = serde_wasm_bindgen::from_value(frame)
        .map_err(|e| JsValue::from_str(&format!("Invalid frame descriptor: {}", e)))?;

    let options: LoadOptions = if options.is_undefined() || options.is_null() {
        LoadOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsValue::from_str(&format!("Invalid load options: {}", e)))?
    };

    let blocks = metadata
        .iter()
        .map(|item| read_item(&item))
        .collect::<Result<Vec<_>, _>>()?;

    let profile = if color_profile.is_undefined() || color_profile.is_null() {
        None
    } else {
        Some(read_item(&color_profile)?)
    };

    let container = build_container(descriptor, data, blocks, profile);
    heifload_core::prepare(container, &options)
        .map(JsLoadedImage::from)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Read a `{ kind, data }` object.
fn read_item(value: &JsValue) -> Result<(String, Vec<u8>), JsValue> {
    let kind = Reflect::get(value, &JsValue::from_str("kind"))?
        .as_string()
        .ok_or_else(|| JsValue::from_str("Metadata item is missing a string `kind`"))?;
    let data = Reflect::get(value, &JsValue::from_str("data"))?
        .dyn_into::<Uint8Array>()
        .map_err(|_| JsValue::from_str("Metadata item `data` must be a Uint8Array"))?;
    Ok((kind, data.to_vec()))
}

fn build_container(
    descriptor: FrameDescriptor,
    data: Vec<u8>,
    metadata: Vec<(String, Vec<u8>)>,
    color_profile: Option<(String, Vec<u8>)>,
) -> DecodedContainer {
    let FrameDescriptor {
        mode,
        width,
        height,
        stride,
        crop,
        orientation,
    } = descriptor;

    let metadata = metadata
        .into_iter()
        .map(|(kind, data)| MetadataBlock::from_kind(&kind, data))
        .collect();

    let mut container = DecodedContainer::new(mode, width, height, stride, data)
        .with_crop(crop.unwrap_or(CropRect::full(width, height)))
        .with_orientation(orientation)
        .with_metadata(metadata);
    if let Some((kind, data)) = color_profile {
        container = container.with_color_profile(ColorProfile::new(&kind, data));
    }
    container
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(crop: Option<CropRect>, orientation: u32) -> FrameDescriptor {
        FrameDescriptor {
            mode: PixelMode::from_name("RGB"),
            width: 4,
            height: 4,
            stride: 12,
            crop,
            orientation,
        }
    }

    #[test]
    fn test_build_container_defaults_to_full_frame() {
        let c = build_container(descriptor(None, 0), vec![0u8; 48], vec![], None);
        assert!(c.crop.is_full_frame(4, 4));
        assert_eq!(c.orientation_tag, 0);
        assert!(c.metadata.is_empty());
        assert!(c.color_profile.is_none());
    }

    #[test]
    fn test_build_container_maps_metadata_and_profile() {
        let c = build_container(
            descriptor(Some(CropRect::new(1, 1, 2, 2)), 3),
            vec![0u8; 48],
            vec![
                ("Exif".to_string(), vec![1]),
                ("mime".to_string(), vec![2]),
            ],
            Some(("prof".to_string(), vec![9])),
        );

        assert_eq!(c.crop, CropRect::new(1, 1, 2, 2));
        assert_eq!(c.orientation_tag, 3);
        assert_eq!(c.exif(), Some(&[1u8][..]));
        assert_eq!(c.metadata[1], MetadataBlock::Xmp(vec![2]));
        assert!(c.color_profile.unwrap().is_icc());
    }

    #[test]
    fn test_built_container_prepares() {
        let c = build_container(
            descriptor(Some(CropRect::new(2, 0, 2, 4)), 8),
            (0u8..48).collect(),
            vec![],
            None,
        );
        let img = heifload_core::prepare(c, &LoadOptions::default()).unwrap();
        assert_eq!((img.width, img.height, img.stride), (2, 4, 12));
        assert_eq!(img.row(0).unwrap(), &[6, 7, 8, 9, 10, 11]);
        assert_eq!(img.orientation().map(|o| o.tag()), Some(8));
    }
}
