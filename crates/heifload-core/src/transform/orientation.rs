//! Folding the container's orientation transform into EXIF.
//!
//! HEIF stores rotation and mirroring as `irot`/`imir` item properties that
//! take precedence over any EXIF Orientation tag. Other formats only know
//! the EXIF tag, so once a frame leaves the HEIF world the container
//! transform must live in EXIF and nowhere else. Otherwise re-encoding to
//! another format would either lose the rotation or apply it twice.
//!
//! [`reconcile`] writes the declared orientation into the first EXIF block
//! (creating one if needed) and clears the declared transform.

use log::{debug, error, warn};

use crate::container::{DecodedContainer, MetadataBlock, Orientation};
use crate::exif_codec::{self, ExifTags};

/// Move the declared orientation into EXIF.
///
/// Containers without a valid (1-8) declared orientation are returned
/// unchanged. Otherwise the first EXIF block gets its Orientation tag
/// overwritten in place, or a minimal block is appended if there is none.
/// A pre-existing block that cannot be decoded or re-encoded is replaced
/// in place by a minimal one. The declared orientation is always cleared.
///
/// This never fails; no pixel data is touched.
pub fn reconcile(container: &DecodedContainer) -> DecodedContainer {
    let Some(orientation) = container.declared_orientation() else {
        if container.orientation_tag != 0 {
            debug!(
                "ignoring out-of-range orientation tag {}",
                container.orientation_tag
            );
        }
        return container.clone();
    };

    let mut metadata = container.metadata.clone();
    match container.exif_index() {
        Some(index) => {
            let existing = metadata[index].data();
            let block = match rewrite_orientation(existing, orientation) {
                Some(block) => block,
                None => match synthesize(orientation) {
                    Some(block) => block,
                    None => return container.clone(),
                },
            };
            metadata[index] = MetadataBlock::Exif(block);
        }
        None => match synthesize(orientation) {
            Some(block) => {
                debug!("no EXIF block, synthesized one for {:?}", orientation);
                metadata.push(MetadataBlock::Exif(block));
            }
            None => return container.clone(),
        },
    }

    DecodedContainer {
        metadata,
        orientation_tag: 0,
        ..container.clone()
    }
}

/// Overwrite the orientation in an existing block, keeping all other tags.
fn rewrite_orientation(data: &[u8], orientation: Orientation) -> Option<Vec<u8>> {
    let mut tags = match ExifTags::decode(data) {
        Ok(tags) => tags,
        Err(e) => {
            warn!("discarding unreadable EXIF block: {}", e);
            return None;
        }
    };

    if let Some(previous) = tags.orientation() {
        debug!(
            "EXIF orientation {:?} replaced by container orientation {:?}",
            previous, orientation
        );
    }
    tags.set_orientation(orientation);

    match tags.encode() {
        Ok(block) => Some(block),
        Err(e) => {
            warn!("discarding EXIF block that cannot be rewritten: {}", e);
            None
        }
    }
}

fn synthesize(orientation: Orientation) -> Option<Vec<u8>> {
    match exif_codec::synthesize(orientation) {
        Ok(block) => Some(block),
        Err(e) => {
            // Leave the declared transform in place rather than lose it.
            error!("failed to synthesize EXIF orientation block: {}", e);
            None
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::container::PixelMode;
    use proptest::prelude::*;

    fn container(orientation_tag: u32) -> DecodedContainer {
        DecodedContainer::new(PixelMode::Gray8, 1, 1, 1, vec![0u8])
            .with_orientation(orientation_tag)
    }

    proptest! {
        /// Property: a valid declared orientation is always consumed and
        /// ends up as the EXIF orientation.
        #[test]
        fn prop_orientation_consumed(tag in 1u32..=8) {
            let result = reconcile(&container(tag));
            prop_assert_eq!(result.orientation_tag, 0);

            let exif = result.exif().unwrap();
            prop_assert_eq!(
                exif_codec::read_orientation(exif),
                Orientation::from_tag(tag)
            );
        }

        /// Property: reconciling twice changes nothing the second time.
        #[test]
        fn prop_reconcile_idempotent(tag in 0u32..=20) {
            let once = reconcile(&container(tag));
            let twice = reconcile(&once);
            prop_assert_eq!(once.metadata, twice.metadata);
            prop_assert_eq!(once.orientation_tag, twice.orientation_tag);
        }

        /// Property: arbitrary bytes in the EXIF block never prevent the
        /// orientation from being recorded.
        #[test]
        fn prop_garbage_exif_recovered(
            tag in 1u32..=8,
            garbage in prop::collection::vec(any::<u8>(), 0..64),
        ) {
            let c = container(tag).with_metadata(vec![MetadataBlock::Exif(garbage)]);
            let result = reconcile(&c);
            prop_assert_eq!(result.orientation_tag, 0);
            prop_assert_eq!(
                exif_codec::read_orientation(result.exif().unwrap()),
                Orientation::from_tag(tag)
            );
        }
    }
}
