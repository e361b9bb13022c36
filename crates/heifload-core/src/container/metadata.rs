//! Metadata blocks and colour profiles attached to a decoded frame.

/// A metadata item reported by the decoder.
///
/// Decoders label items with a free-form kind string. The kinds this crate
/// cares about get their own variant; everything else passes through
/// untouched as [`MetadataBlock::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataBlock {
    /// An EXIF payload (kind `"Exif"`).
    Exif(Vec<u8>),
    /// An XMP packet (kind `"mime"` or `"XMP"`).
    Xmp(Vec<u8>),
    /// Any other item, kept opaque.
    Other { kind: String, data: Vec<u8> },
}

impl MetadataBlock {
    /// Classify a decoder item by its kind string.
    pub fn from_kind(kind: &str, data: Vec<u8>) -> Self {
        match kind {
            "Exif" => MetadataBlock::Exif(data),
            "mime" | "XMP" => MetadataBlock::Xmp(data),
            _ => MetadataBlock::Other {
                kind: kind.to_string(),
                data,
            },
        }
    }

    /// The decoder kind string for this block.
    pub fn kind(&self) -> &str {
        match self {
            MetadataBlock::Exif(_) => "Exif",
            MetadataBlock::Xmp(_) => "mime",
            MetadataBlock::Other { kind, .. } => kind,
        }
    }

    /// Raw payload bytes.
    pub fn data(&self) -> &[u8] {
        match self {
            MetadataBlock::Exif(data) | MetadataBlock::Xmp(data) => data,
            MetadataBlock::Other { data, .. } => data,
        }
    }

    /// The payload if this is an EXIF block.
    pub fn as_exif(&self) -> Option<&[u8]> {
        match self {
            MetadataBlock::Exif(data) => Some(data),
            _ => None,
        }
    }
}

/// Colour profile kinds found in HEIF `colr` properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorProfileKind {
    /// `rICC`: restricted ICC profile (monochrome or matrix-based only).
    RestrictedIcc,
    /// `prof`: unrestricted ICC profile.
    Icc,
    /// `nclx`: coded colour primaries/transfer/matrix, not an ICC blob.
    Nclx,
    /// Anything else.
    Other(String),
}

impl ColorProfileKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "rICC" => ColorProfileKind::RestrictedIcc,
            "prof" => ColorProfileKind::Icc,
            "nclx" => ColorProfileKind::Nclx,
            other => ColorProfileKind::Other(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            ColorProfileKind::RestrictedIcc => "rICC",
            ColorProfileKind::Icc => "prof",
            ColorProfileKind::Nclx => "nclx",
            ColorProfileKind::Other(tag) => tag,
        }
    }
}

/// A colour profile as reported by the decoder. Contents are never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorProfile {
    pub kind: ColorProfileKind,
    pub data: Vec<u8>,
}

impl ColorProfile {
    pub fn new(kind: &str, data: Vec<u8>) -> Self {
        Self {
            kind: ColorProfileKind::from_tag(kind),
            data,
        }
    }

    /// True for the two ICC-carrying kinds (`rICC` and `prof`).
    pub fn is_icc(&self) -> bool {
        matches!(
            self.kind,
            ColorProfileKind::RestrictedIcc | ColorProfileKind::Icc
        )
    }
}
