//! Error types for frame preparation.

use thiserror::Error;

/// Errors that abort loading a decoded HEIF frame.
///
/// Only decoder failures and Stage A (crop) failures reach the caller.
/// Problems with embedded EXIF data are recovered inside the orientation
/// stage and never show up here.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The external HEIF decoder rejected the input.
    #[error("Failed to parse HEIF image: {0}")]
    Decode(String),

    /// A crop was requested on a frame whose pixel mode has no known width.
    #[error("Cannot crop image with unsupported pixel mode: {mode}")]
    UnsupportedMode { mode: String },

    /// The declared crop rectangle does not fit inside the frame.
    #[error(
        "Crop rectangle ({x}, {y}, {width}x{height}) exceeds frame size {frame_width}x{frame_height}"
    )]
    CropOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    },

    /// The row stride is narrower than one row of pixels.
    #[error("Invalid stride: {stride} bytes cannot hold a row of {row_bytes} bytes")]
    InvalidStride { stride: usize, row_bytes: usize },

    /// The pixel buffer is shorter than the frame geometry requires.
    #[error("Pixel buffer too small: expected at least {expected} bytes, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },
}

/// Errors from the EXIF codec.
///
/// These are recoverable: the orientation stage falls back to a freshly
/// synthesized EXIF block whenever one of them occurs.
#[derive(Debug, Error)]
pub enum ExifError {
    /// The EXIF block contains no bytes.
    #[error("EXIF block is empty")]
    Empty,

    /// The block does not start with a TIFF header in any known framing.
    #[error("EXIF block has no recognizable TIFF header")]
    UnrecognizedHeader,

    /// The TIFF structure could not be parsed.
    #[error("Malformed EXIF data: {0}")]
    Malformed(#[from] exif::Error),

    /// The tag set could not be serialized.
    #[error("Failed to write EXIF data: {0}")]
    Write(exif::Error),
}
