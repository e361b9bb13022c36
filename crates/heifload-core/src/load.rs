//! Turning a decoded frame into owned pixels and reconciled metadata.
//!
//! [`prepare`] runs the crop stage, then the orientation stage, then
//! copies the pixel rows out of the (possibly offset) buffer view. The
//! result is a [`LoadedImage`]: everything a host image type needs, with
//! the EXIF block as the single source of truth for orientation.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::container::{ColorProfileKind, DecodedContainer, Orientation, PixelMode};
use crate::error::LoadError;
use crate::exif_codec;
use crate::transform::{crop, reconcile};

/// Options controlling frame preparation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoadOptions {
    /// Apply the container's declared crop. When false the full coded
    /// frame is returned and the declared crop is ignored.
    pub crop: bool,
    /// Move the declared orientation into the EXIF block. When false the
    /// metadata is passed through as decoded and the declared orientation
    /// is dropped.
    pub reconcile_orientation: bool,
    /// Pass through `rICC` (restricted ICC) profiles in addition to `prof`.
    pub accept_restricted_icc: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            crop: true,
            reconcile_orientation: true,
            accept_restricted_icc: true,
        }
    }
}

/// A frame ready to hand to an image consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub mode: PixelMode,
    pub width: u32,
    pub height: u32,
    /// Bytes per row in `pixels`. Rows are not repacked after cropping.
    pub stride: usize,
    /// Owned pixel rows, exactly `stride * height` bytes.
    pub pixels: Vec<u8>,
    /// The first EXIF block, carrying the authoritative orientation.
    pub exif: Option<Vec<u8>>,
    /// ICC profile bytes, if the frame had an ICC-type colour profile.
    pub icc_profile: Option<Vec<u8>>,
}

impl LoadedImage {
    /// Orientation recorded in the EXIF block.
    pub fn orientation(&self) -> Option<Orientation> {
        self.exif.as_deref().and_then(exif_codec::read_orientation)
    }

    /// Visible pixels of row `y`, without row padding.
    ///
    /// Returns `None` if `y` is out of range or the mode is unknown.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let bpp = self.mode.bytes_per_pixel()?;
        let start = y as usize * self.stride;
        self.pixels.get(start..start + bpp * self.width as usize)
    }

    /// Pixel data with row padding removed.
    pub fn packed_pixels(&self) -> Result<Vec<u8>, LoadError> {
        let bpp = self.mode.bytes_per_pixel().ok_or_else(|| self.unsupported())?;
        let row_bytes = bpp * self.width as usize;
        if self.stride == row_bytes {
            return Ok(self.pixels.clone());
        }

        let mut packed = Vec::with_capacity(row_bytes * self.height as usize);
        for row in self.pixels.chunks(self.stride).take(self.height as usize) {
            packed.extend_from_slice(&row[..row_bytes]);
        }
        Ok(packed)
    }

    /// Convert into an `image::DynamicImage`.
    ///
    /// Orientation is not applied; it stays in the EXIF block.
    pub fn to_dynamic_image(&self) -> Result<image::DynamicImage, LoadError> {
        let (w, h) = (self.width, self.height);
        let packed = self.packed_pixels()?;
        let image = match self.mode {
            PixelMode::Gray8 => {
                image::GrayImage::from_raw(w, h, packed).map(image::DynamicImage::ImageLuma8)
            }
            PixelMode::Rgb24 => {
                image::RgbImage::from_raw(w, h, packed).map(image::DynamicImage::ImageRgb8)
            }
            PixelMode::Rgba32 => {
                image::RgbaImage::from_raw(w, h, packed).map(image::DynamicImage::ImageRgba8)
            }
            PixelMode::Other(_) => None,
        };
        image.ok_or_else(|| self.unsupported())
    }

    fn unsupported(&self) -> LoadError {
        LoadError::UnsupportedMode {
            mode: self.mode.name().to_string(),
        }
    }
}

/// The external HEIF decoder.
///
/// Implementations decode the file without applying any transforms and
/// report the declared crop and orientation on the container.
pub trait ContainerDecoder {
    type Error: fmt::Display;

    fn decode(&self, bytes: &[u8]) -> Result<DecodedContainer, Self::Error>;
}

/// Decode `bytes` with `decoder` and prepare the resulting frame.
///
/// # Errors
///
/// Decoder failures become `LoadError::Decode` carrying the decoder's
/// message. Otherwise see [`prepare`].
pub fn load<D: ContainerDecoder>(
    decoder: &D,
    bytes: &[u8],
    options: &LoadOptions,
) -> Result<LoadedImage, LoadError> {
    let container = decoder
        .decode(bytes)
        .map_err(|e| LoadError::Decode(e.to_string()))?;
    prepare(container, options)
}

/// Crop, reconcile orientation, and materialize a decoded frame.
///
/// # Errors
///
/// Returns an error if the buffer geometry is inconsistent or the crop
/// cannot be applied. EXIF problems never fail the load.
pub fn prepare(
    container: DecodedContainer,
    options: &LoadOptions,
) -> Result<LoadedImage, LoadError> {
    container.validate()?;

    let cropped = if options.crop {
        crop(&container)?
    } else {
        debug!(
            "crop disabled, keeping full {}x{} frame",
            container.width, container.height
        );
        container
    };
    let frame = if options.reconcile_orientation {
        reconcile(&cropped)
    } else {
        debug!(
            "orientation reconciliation disabled, dropping declared tag {}",
            cropped.orientation_tag
        );
        cropped
    };

    let exif = frame.exif().map(<[u8]>::to_vec);
    let icc_profile = frame.color_profile.as_ref().and_then(|profile| {
        let accepted = match profile.kind {
            ColorProfileKind::Icc => true,
            ColorProfileKind::RestrictedIcc => options.accept_restricted_icc,
            _ => false,
        };
        if !accepted {
            debug!("dropping colour profile of kind {}", profile.kind.tag());
        }
        accepted.then(|| profile.data.clone())
    });

    let pixels = materialize(&frame);

    Ok(LoadedImage {
        mode: frame.mode,
        width: frame.width,
        height: frame.height,
        stride: frame.stride,
        pixels,
        exif,
        icc_profile,
    })
}

/// Copy `stride * height` bytes out of the buffer view.
///
/// A cropped view may end before the padding of its last row; the
/// missing tail is zero-filled.
fn materialize(frame: &DecodedContainer) -> Vec<u8> {
    let len = frame.stride * frame.height as usize;
    let src = frame.buffer.as_slice();
    let take = len.min(src.len());

    let mut pixels = Vec::with_capacity(len);
    pixels.extend_from_slice(&src[..take]);
    pixels.resize(len, 0);
    pixels
}
