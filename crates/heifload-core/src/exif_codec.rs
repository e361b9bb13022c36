//! EXIF block decoding and encoding on top of `kamadak-exif`.
//!
//! HEIF files and the tools around them frame EXIF payloads in several
//! ways. [`ExifTags::decode`] accepts all of them:
//!
//! - a bare TIFF structure (`II*\0` or `MM\0*`)
//! - the JPEG APP1 style `Exif\0\0` prefix followed by TIFF
//! - the HEIF `Exif` item layout: a 4-byte big-endian offset to the TIFF
//!   header, usually followed by the `Exif\0\0` prefix
//!
//! [`ExifTags::encode`] always produces `Exif\0\0` + TIFF, which is what
//! image consumers expect to find in an `exif` info entry.

use std::io::Cursor;

use exif::experimental::Writer;
use exif::{Exif, Field, In, Reader, Tag, Value};

use crate::container::Orientation;
use crate::error::ExifError;

const EXIF_PREFIX: &[u8] = b"Exif\0\0";
const TIFF_LE: &[u8] = b"II*\0";
const TIFF_BE: &[u8] = b"MM\0*";

/// A decoded, editable set of EXIF fields.
#[derive(Debug, Clone, Default)]
pub struct ExifTags {
    fields: Vec<Field>,
    little_endian: bool,
    thumbnail: Option<Vec<u8>>,
}

impl ExifTags {
    /// An empty tag set, written big-endian.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an EXIF block in any supported framing.
    pub fn decode(data: &[u8]) -> Result<Self, ExifError> {
        let tiff = tiff_payload(data)?;
        let exif = Reader::new().read_raw(tiff.to_vec())?;
        Ok(Self {
            fields: exif.fields().cloned().collect(),
            little_endian: exif.little_endian(),
            thumbnail: jpeg_thumbnail(&exif),
        })
    }

    /// Look up a field in the primary IFD.
    pub fn get(&self, tag: Tag) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.tag == tag && f.ifd_num == In::PRIMARY)
    }

    /// The primary image orientation, if present and valid.
    pub fn orientation(&self) -> Option<Orientation> {
        self.get(Tag::Orientation)
            .and_then(|f| f.value.get_uint(0))
            .and_then(Orientation::from_tag)
    }

    /// Set the primary image orientation, replacing any existing value.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.fields
            .retain(|f| !(f.tag == Tag::Orientation && f.ifd_num == In::PRIMARY));
        self.fields.push(Field {
            tag: Tag::Orientation,
            ifd_num: In::PRIMARY,
            value: Value::Short(vec![orientation.tag()]),
        });
    }

    /// Serialize as `Exif\0\0` + TIFF in the original byte order.
    ///
    /// Fields the writer cannot express (unknown value types, IFDs past
    /// the thumbnail) are dropped. The writer lays out IFD pointers itself
    /// and re-embeds the JPEG thumbnail captured by [`ExifTags::decode`].
    /// Uncompressed strip thumbnails are not carried over.
    pub fn encode(&self) -> Result<Vec<u8>, ExifError> {
        let mut writer = Writer::new();
        for field in self.fields.iter().filter(|f| is_writable(f)) {
            writer.push_field(field);
        }
        if let Some(jpeg) = &self.thumbnail {
            writer.set_jpeg(jpeg, In::THUMBNAIL);
        }

        let mut tiff = Cursor::new(Vec::new());
        writer
            .write(&mut tiff, self.little_endian)
            .map_err(ExifError::Write)?;

        let tiff = tiff.into_inner();
        let mut out = Vec::with_capacity(EXIF_PREFIX.len() + tiff.len());
        out.extend_from_slice(EXIF_PREFIX);
        out.extend_from_slice(&tiff);
        Ok(out)
    }
}

/// Build a minimal EXIF block holding only the orientation tag.
pub fn synthesize(orientation: Orientation) -> Result<Vec<u8>, ExifError> {
    let mut tags = ExifTags::new();
    tags.set_orientation(orientation);
    tags.encode()
}

/// Read the primary orientation from an EXIF block.
///
/// Returns `None` when the block is unreadable or has no valid orientation.
pub fn read_orientation(data: &[u8]) -> Option<Orientation> {
    ExifTags::decode(data).ok()?.orientation()
}

/// Copy the IFD1 JPEG thumbnail out of the TIFF buffer.
fn jpeg_thumbnail(exif: &Exif) -> Option<Vec<u8>> {
    let uint = |tag| {
        exif.get_field(tag, In::THUMBNAIL)
            .and_then(|f| f.value.get_uint(0))
            .map(|v| v as usize)
    };
    let offset = uint(Tag::JPEGInterchangeFormat)?;
    let len = uint(Tag::JPEGInterchangeFormatLength)?;
    exif.buf()
        .get(offset..offset.checked_add(len)?)
        .map(<[u8]>::to_vec)
}

fn is_writable(field: &Field) -> bool {
    !matches!(field.value, Value::Unknown(..))
        && (field.ifd_num == In::PRIMARY || field.ifd_num == In::THUMBNAIL)
}

fn is_tiff_header(data: &[u8]) -> bool {
    data.starts_with(TIFF_LE) || data.starts_with(TIFF_BE)
}

/// Locate the TIFF structure inside an EXIF block.
fn tiff_payload(data: &[u8]) -> Result<&[u8], ExifError> {
    if data.is_empty() {
        return Err(ExifError::Empty);
    }
    if is_tiff_header(data) {
        return Ok(data);
    }
    if let Some(rest) = data.strip_prefix(EXIF_PREFIX) {
        if is_tiff_header(rest) {
            return Ok(rest);
        }
        return Err(ExifError::UnrecognizedHeader);
    }
    if data.len() >= 4 {
        let skip = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
        if let Some(rest) = skip.checked_add(4).and_then(|start| data.get(start..)) {
            if is_tiff_header(rest) {
                return Ok(rest);
            }
        }
    }
    Err(ExifError::UnrecognizedHeader)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags_with_description(text: &str, orientation: Option<Orientation>) -> ExifTags {
        let mut tags = ExifTags::new();
        tags.fields.push(Field {
            tag: Tag::ImageDescription,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![text.as_bytes().to_vec()]),
        });
        if let Some(o) = orientation {
            tags.set_orientation(o);
        }
        tags
    }

    fn description(tags: &ExifTags) -> Option<Vec<u8>> {
        match &tags.get(Tag::ImageDescription)?.value {
            Value::Ascii(parts) => parts.first().cloned(),
            _ => None,
        }
    }

    #[test]
    fn test_synthesized_block_has_prefix_and_orientation() {
        let block = synthesize(Orientation::Transverse).unwrap();
        assert!(block.starts_with(EXIF_PREFIX));

        let tags = ExifTags::decode(&block).unwrap();
        assert_eq!(tags.orientation(), Some(Orientation::Transverse));
        assert_eq!(tags.fields.len(), 1);
        assert!(tags.thumbnail.is_none());
    }

    #[test]
    fn test_encode_preserves_other_fields() {
        let tags = tags_with_description("Sample image", Some(Orientation::Rotate90CW));
        let block = tags.encode().unwrap();

        let decoded = ExifTags::decode(&block).unwrap();
        assert_eq!(decoded.orientation(), Some(Orientation::Rotate90CW));
        assert_eq!(description(&decoded), Some(b"Sample image".to_vec()));
    }

    #[test]
    fn test_set_orientation_replaces_existing() {
        let mut tags = tags_with_description("x", Some(Orientation::Transverse));
        tags.set_orientation(Orientation::Normal);

        let count = tags
            .fields
            .iter()
            .filter(|f| f.tag == Tag::Orientation)
            .count();
        assert_eq!(count, 1);
        assert_eq!(tags.orientation(), Some(Orientation::Normal));
    }

    #[test]
    fn test_thumbnail_is_reembedded() {
        let thumb = [0xFF, 0xD8, 0xFF, 0xDB, 1, 2, 3, 4, 0xFF, 0xD9];
        let mut tags = tags_with_description("with thumbnail", Some(Orientation::Rotate180));
        tags.thumbnail = Some(thumb.to_vec());
        let block = tags.encode().unwrap();

        let decoded = ExifTags::decode(&block).unwrap();
        assert_eq!(decoded.thumbnail.as_deref(), Some(&thumb[..]));

        let mut rewritten = decoded;
        rewritten.set_orientation(Orientation::Normal);
        let again = ExifTags::decode(&rewritten.encode().unwrap()).unwrap();
        assert_eq!(again.thumbnail.as_deref(), Some(&thumb[..]));
        assert_eq!(again.orientation(), Some(Orientation::Normal));
    }

    #[test]
    fn test_decode_accepts_bare_tiff() {
        let block = synthesize(Orientation::Rotate180).unwrap();
        let bare = &block[EXIF_PREFIX.len()..];
        assert_eq!(read_orientation(bare), Some(Orientation::Rotate180));
    }

    #[test]
    fn test_decode_accepts_heif_item_framing() {
        let block = synthesize(Orientation::FlipVertical).unwrap();
        // HEIF Exif item: 4-byte offset (6) to the TIFF header, then "Exif\0\0"
        let mut item = vec![0, 0, 0, 6];
        item.extend_from_slice(&block);
        assert_eq!(read_orientation(&item), Some(Orientation::FlipVertical));

        // Zero offset, TIFF immediately after the length field
        let mut item = vec![0, 0, 0, 0];
        item.extend_from_slice(&block[EXIF_PREFIX.len()..]);
        assert_eq!(read_orientation(&item), Some(Orientation::FlipVertical));
    }

    #[test]
    fn test_encode_keeps_byte_order() {
        let mut tags = ExifTags::new();
        tags.little_endian = true;
        tags.set_orientation(Orientation::Normal);
        let block = tags.encode().unwrap();

        assert_eq!(&block[EXIF_PREFIX.len()..EXIF_PREFIX.len() + 4], TIFF_LE);
        assert!(ExifTags::decode(&block).unwrap().little_endian);
    }

    #[test]
    fn test_decode_empty() {
        assert!(matches!(ExifTags::decode(b""), Err(ExifError::Empty)));
    }

    #[test]
    fn test_decode_garbage_header() {
        assert!(matches!(
            ExifTags::decode(b"not exif at all"),
            Err(ExifError::UnrecognizedHeader)
        ));
        assert!(matches!(
            ExifTags::decode(b"Exif\0\0garbage"),
            Err(ExifError::UnrecognizedHeader)
        ));
    }

    #[test]
    fn test_decode_broken_ifd() {
        // Valid header whose IFD offset points back into the header
        let broken = b"Exif\x00\x00II*\x00\x02\x00\x00\x00\x00\x00\x00\x00\x00\x00";
        assert!(matches!(
            ExifTags::decode(broken),
            Err(ExifError::Malformed(_))
        ));
        assert_eq!(read_orientation(broken), None);
    }

    #[test]
    fn test_huge_item_offset_is_rejected() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF, b'I', b'I'];
        assert!(matches!(
            ExifTags::decode(&data),
            Err(ExifError::UnrecognizedHeader)
        ));
    }
}
