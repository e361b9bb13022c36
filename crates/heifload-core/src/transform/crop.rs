//! Zero-copy cropping of a decoded frame.
//!
//! The declared crop is resolved by moving the start of the buffer view,
//! not by copying pixels. Rows are not repacked: the cropped container
//! keeps the original stride, and only its logical size shrinks. Whoever
//! walks the rows must step by `stride`, not by `width * bytes_per_pixel`.
//!
//! # Example
//!
//! ```ignore
//! let cropped = crop(&container)?;
//! assert!(cropped.buffer.shares_storage_with(&container.buffer));
//! ```

use log::debug;

use crate::container::{CropRect, DecodedContainer};
use crate::error::LoadError;

/// Apply the container's declared crop as a view into its buffer.
///
/// A full-frame crop returns the container unchanged, sharing the same
/// buffer view. Otherwise the pixel mode must have a known width.
///
/// # Errors
///
/// - `LoadError::UnsupportedMode` if the crop is not full-frame and the
///   pixel mode is unknown
/// - `LoadError::CropOutOfBounds` if the rectangle exceeds the frame
/// - `LoadError::BufferTooSmall` if the buffer ends before the last
///   cropped pixel
pub fn crop(container: &DecodedContainer) -> Result<DecodedContainer, LoadError> {
    let rect = container.crop;
    if rect.is_full_frame(container.width, container.height) {
        return Ok(container.clone());
    }

    let bpp = container
        .mode
        .bytes_per_pixel()
        .ok_or_else(|| LoadError::UnsupportedMode {
            mode: container.mode.name().to_string(),
        })?;

    check_bounds(&rect, container.width, container.height)?;

    let too_small = |expected| LoadError::BufferTooSmall {
        expected,
        actual: container.buffer.len(),
    };
    let (offset, wanted, needed) =
        view_extent(container.stride, bpp, &rect).ok_or_else(|| too_small(usize::MAX))?;

    let available = container.buffer.len().saturating_sub(offset);
    if available < needed {
        return Err(too_small(offset.saturating_add(needed)));
    }

    let len = wanted.min(available);
    let buffer = container
        .buffer
        .view(offset, len)
        .ok_or_else(|| too_small(offset.saturating_add(len)))?;

    debug!(
        "cropping {}x{} frame to {:?}: view offset {} len {}",
        container.width, container.height, rect, offset, len
    );

    Ok(DecodedContainer {
        width: rect.width,
        height: rect.height,
        crop: CropRect::full(rect.width, rect.height),
        buffer,
        ..container.clone()
    })
}

/// Byte offset of the crop origin, the byte length of its full rows, and
/// the bytes actually addressed (the last row may end inside the padding
/// of the backing buffer). `None` on overflow.
fn view_extent(stride: usize, bpp: usize, rect: &CropRect) -> Option<(usize, usize, usize)> {
    let offset = stride
        .checked_mul(rect.y as usize)?
        .checked_add(bpp.checked_mul(rect.x as usize)?)?;
    let wanted = stride.checked_mul(rect.height as usize)?;
    let needed = match rect.height {
        0 => 0,
        h => stride
            .checked_mul(h as usize - 1)?
            .checked_add(bpp.checked_mul(rect.width as usize)?)?,
    };
    Some((offset, wanted, needed))
}

fn check_bounds(rect: &CropRect, width: u32, height: u32) -> Result<(), LoadError> {
    let fits_x = rect.x.checked_add(rect.width).is_some_and(|r| r <= width);
    let fits_y = rect.y.checked_add(rect.height).is_some_and(|b| b <= height);
    if fits_x && fits_y {
        return Ok(());
    }
    Err(LoadError::CropOutOfBounds {
        x: rect.x,
        y: rect.y,
        width: rect.width,
        height: rect.height,
        frame_width: width,
        frame_height: height,
    })
}
