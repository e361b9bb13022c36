//! In-memory model of a decoded HEIF frame.
//!
//! A [`DecodedContainer`] is what the external HEIF decoder hands over:
//! a pixel buffer plus the transforms the container declares but has not
//! yet applied (crop rectangle and orientation tag), and any metadata
//! items and colour profile found in the file.
//!
//! Containers are treated as immutable values. Each pipeline stage takes
//! a container by reference and returns a fresh one, overriding only the
//! fields it changes. Cloning is cheap because pixel storage is shared.

mod buffer;
mod metadata;

pub use buffer::PixelBuffer;
pub use metadata::{ColorProfile, ColorProfileKind, MetadataBlock};

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Pixel layout of a decoded buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PixelMode {
    /// 8-bit greyscale, 1 byte per pixel.
    Gray8,
    /// 8-bit RGB, 3 bytes per pixel.
    Rgb24,
    /// 8-bit RGBA, 4 bytes per pixel.
    Rgba32,
    /// A layout this crate does not know the pixel width of.
    Other(String),
}

impl PixelMode {
    /// Parse a decoder mode name. Unknown names become [`PixelMode::Other`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "L" | "Gray8" => PixelMode::Gray8,
            "RGB" | "Rgb24" => PixelMode::Rgb24,
            "RGBA" | "Rgba32" => PixelMode::Rgba32,
            other => PixelMode::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PixelMode::Gray8 => "L",
            PixelMode::Rgb24 => "RGB",
            PixelMode::Rgba32 => "RGBA",
            PixelMode::Other(name) => name,
        }
    }

    /// Bytes per pixel, or `None` when the layout is unknown.
    pub fn bytes_per_pixel(&self) -> Option<usize> {
        match self {
            PixelMode::Gray8 => Some(1),
            PixelMode::Rgb24 => Some(3),
            PixelMode::Rgba32 => Some(4),
            PixelMode::Other(_) => None,
        }
    }
}

impl From<String> for PixelMode {
    fn from(name: String) -> Self {
        PixelMode::from_name(&name)
    }
}

impl From<PixelMode> for String {
    fn from(mode: PixelMode) -> Self {
        mode.name().to_string()
    }
}

/// Crop rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The "no crop" rectangle for a frame of the given size.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn is_full_frame(&self, width: u32, height: u32) -> bool {
        *self == Self::full(width, height)
    }
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl Orientation {
    /// Map a raw tag value to an orientation. Anything outside 1-8 is `None`.
    pub fn from_tag(value: u32) -> Option<Self> {
        match value {
            1 => Some(Orientation::Normal),
            2 => Some(Orientation::FlipHorizontal),
            3 => Some(Orientation::Rotate180),
            4 => Some(Orientation::FlipVertical),
            5 => Some(Orientation::Transpose),
            6 => Some(Orientation::Rotate90CW),
            7 => Some(Orientation::Transverse),
            8 => Some(Orientation::Rotate270CW),
            _ => None,
        }
    }

    /// The EXIF tag value (1-8).
    pub fn tag(self) -> u16 {
        self as u16
    }
}

/// A decoded frame with its pending transforms and metadata.
#[derive(Debug, Clone)]
pub struct DecodedContainer {
    /// Pixel layout of `buffer`.
    pub mode: PixelMode,
    /// Logical frame width in pixels.
    pub width: u32,
    /// Logical frame height in pixels.
    pub height: u32,
    /// Bytes per row in `buffer`. May exceed `width * bytes_per_pixel`.
    pub stride: usize,
    /// Pixel rows, `stride` bytes apart.
    pub buffer: PixelBuffer,
    /// Crop declared by the container; full frame means no crop.
    pub crop: CropRect,
    /// Raw orientation tag declared by the container. 0 means none;
    /// values outside 1-8 are tolerated and treated as none.
    pub orientation_tag: u32,
    /// Metadata items in file order.
    pub metadata: Vec<MetadataBlock>,
    pub color_profile: Option<ColorProfile>,
}

impl DecodedContainer {
    /// Create a container with no pending transforms and no metadata.
    pub fn new(
        mode: PixelMode,
        width: u32,
        height: u32,
        stride: usize,
        buffer: impl Into<PixelBuffer>,
    ) -> Self {
        Self {
            mode,
            width,
            height,
            stride,
            buffer: buffer.into(),
            crop: CropRect::full(width, height),
            orientation_tag: 0,
            metadata: Vec::new(),
            color_profile: None,
        }
    }

    pub fn with_crop(self, crop: CropRect) -> Self {
        Self { crop, ..self }
    }

    pub fn with_orientation(self, orientation_tag: u32) -> Self {
        Self {
            orientation_tag,
            ..self
        }
    }

    pub fn with_metadata(self, metadata: Vec<MetadataBlock>) -> Self {
        Self { metadata, ..self }
    }

    pub fn with_color_profile(self, color_profile: ColorProfile) -> Self {
        Self {
            color_profile: Some(color_profile),
            ..self
        }
    }

    /// The declared orientation, if it is a valid 1-8 tag.
    pub fn declared_orientation(&self) -> Option<Orientation> {
        Orientation::from_tag(self.orientation_tag)
    }

    /// Index of the first EXIF block.
    pub fn exif_index(&self) -> Option<usize> {
        self.metadata
            .iter()
            .position(|block| block.as_exif().is_some())
    }

    /// Payload of the first EXIF block.
    pub fn exif(&self) -> Option<&[u8]> {
        self.metadata.iter().find_map(MetadataBlock::as_exif)
    }

    /// Minimum number of buffer bytes the frame geometry addresses.
    ///
    /// The last row only needs its pixels, not its padding. For unknown
    /// modes the pixel width is unknown, so full rows are required.
    /// Returns `None` if the geometry overflows `usize`.
    pub fn required_buffer_len(&self) -> Option<usize> {
        let rows = self.height as usize;
        if rows == 0 {
            return Some(0);
        }
        match self.mode.bytes_per_pixel() {
            Some(bpp) => self
                .stride
                .checked_mul(rows - 1)?
                .checked_add(bpp.checked_mul(self.width as usize)?),
            None => self.stride.checked_mul(rows),
        }
    }

    /// Check that stride and buffer length agree with the frame size.
    pub fn validate(&self) -> Result<(), LoadError> {
        if let Some(bpp) = self.mode.bytes_per_pixel() {
            let row_bytes = bpp.saturating_mul(self.width as usize);
            if self.stride < row_bytes {
                return Err(LoadError::InvalidStride {
                    stride: self.stride,
                    row_bytes,
                });
            }
        }

        let expected = self.required_buffer_len().unwrap_or(usize::MAX);
        if self.buffer.len() < expected {
            return Err(LoadError::BufferTooSmall {
                expected,
                actual: self.buffer.len(),
            });
        }
        Ok(())
    }
}
