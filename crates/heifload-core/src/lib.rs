//! heifload Core - preparing decoded HEIF/HEIC frames for image consumers
//!
//! A HEIF decoder hands back pixels together with transforms the file
//! declares but the decoder has not applied: a crop rectangle and an
//! orientation. This crate resolves both before the frame reaches a
//! generic image layer:
//!
//! - the crop becomes a zero-copy view into the decoded buffer
//! - the orientation moves into the EXIF Orientation tag, so it is the
//!   only orientation signal left and re-encoding cannot apply it twice
//!
//! The HEIF bitstream decoder itself is external; see
//! [`load::ContainerDecoder`].

pub mod container;
pub mod error;
pub mod exif_codec;
pub mod load;
pub mod transform;

pub use container::{
    ColorProfile, ColorProfileKind, CropRect, DecodedContainer, MetadataBlock, Orientation,
    PixelBuffer, PixelMode,
};
pub use error::{ExifError, LoadError};
pub use load::{load, prepare, ContainerDecoder, LoadOptions, LoadedImage};
pub use transform::{crop, reconcile};
