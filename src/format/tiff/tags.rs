//! TIFF tag, field type and compression vocabulary.

// =============================================================================
// TIFF Field Types
// =============================================================================

/// TIFF field types that determine how values are encoded.
///
/// Only the types that carry the tags read here are defined; entries of any
/// other type are kept but their values are never decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum FieldType {
    /// Unsigned 8-bit integer
    Byte = 1,

    /// 8-bit ASCII character, NUL terminated
    Ascii = 2,

    /// Unsigned 16-bit integer
    Short = 3,

    /// Unsigned 32-bit integer
    Long = 4,

    /// Opaque bytes (XMP packets are often stored this way)
    Undefined = 7,

    /// Unsigned 64-bit integer, BigTIFF only
    Long8 = 16,
}

impl FieldType {
    /// Size of a single value of this type in bytes.
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            FieldType::Byte | FieldType::Ascii | FieldType::Undefined => 1,
            FieldType::Short => 2,
            FieldType::Long => 4,
            FieldType::Long8 => 8,
        }
    }

    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(FieldType::Byte),
            2 => Some(FieldType::Ascii),
            3 => Some(FieldType::Short),
            4 => Some(FieldType::Long),
            7 => Some(FieldType::Undefined),
            16 => Some(FieldType::Long8),
            _ => None,
        }
    }

    /// Check if `count` values of this type fit in the entry's value field
    /// (4 bytes for classic TIFF, 8 for BigTIFF).
    #[inline]
    pub fn fits_inline(self, count: u64, is_bigtiff: bool) -> bool {
        let threshold = if is_bigtiff { 8 } else { 4 };
        (self.size_in_bytes() as u64)
            .checked_mul(count)
            .map_or(false, |total| total <= threshold)
    }
}

// =============================================================================
// TIFF Tags
// =============================================================================

/// TIFF tag IDs read while classifying directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TiffTag {
    /// Image width in pixels
    ImageWidth = 256,

    /// Image height (length) in pixels
    ImageLength = 257,

    /// Compression scheme used
    Compression = 259,

    /// Free-text description; Ventana puts `level=N` tokens here
    ImageDescription = 270,

    /// Width of each tile in pixels
    TileWidth = 322,

    /// Height (length) of each tile in pixels
    TileLength = 323,

    /// Byte offsets of each tile
    TileOffsets = 324,

    /// Byte counts of each tile
    TileByteCounts = 325,

    /// Embedded XMP/XML packet; Ventana stores scan metadata here
    XmlPacket = 700,
}

impl TiffTag {
    /// Create a TiffTag from its numeric value.
    ///
    /// Unknown tags are not an error; they are simply not looked at.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            256 => Some(TiffTag::ImageWidth),
            257 => Some(TiffTag::ImageLength),
            259 => Some(TiffTag::Compression),
            270 => Some(TiffTag::ImageDescription),
            322 => Some(TiffTag::TileWidth),
            323 => Some(TiffTag::TileLength),
            324 => Some(TiffTag::TileOffsets),
            325 => Some(TiffTag::TileByteCounts),
            700 => Some(TiffTag::XmlPacket),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Tag name used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            TiffTag::ImageWidth => "ImageWidth",
            TiffTag::ImageLength => "ImageLength",
            TiffTag::Compression => "Compression",
            TiffTag::ImageDescription => "ImageDescription",
            TiffTag::TileWidth => "TileWidth",
            TiffTag::TileLength => "TileLength",
            TiffTag::TileOffsets => "TileOffsets",
            TiffTag::TileByteCounts => "TileByteCounts",
            TiffTag::XmlPacket => "XMLPacket",
        }
    }
}

// =============================================================================
// Compression Values
// =============================================================================

/// Value the Compression tag takes when it is absent.
pub const DEFAULT_COMPRESSION: u16 = 1;

/// TIFF compression scheme identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Compression {
    None = 1,
    CcittRle = 2,
    Lzw = 5,
    OldJpeg = 6,
    Jpeg = 7,
    Deflate = 8,
    PackBits = 32773,
    AdobeDeflate = 32946,
    /// Aperio JPEG 2000, YCbCr
    Jp2kYcbcr = 33003,
    /// Aperio JPEG 2000, RGB
    Jp2kRgb = 33005,
    Zstd = 50000,
    Webp = 50001,
}

impl Compression {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(Compression::None),
            2 => Some(Compression::CcittRle),
            5 => Some(Compression::Lzw),
            6 => Some(Compression::OldJpeg),
            7 => Some(Compression::Jpeg),
            8 => Some(Compression::Deflate),
            32773 => Some(Compression::PackBits),
            32946 => Some(Compression::AdobeDeflate),
            33003 => Some(Compression::Jp2kYcbcr),
            33005 => Some(Compression::Jp2kRgb),
            50000 => Some(Compression::Zstd),
            50001 => Some(Compression::Webp),
            _ => None,
        }
    }

    /// Whether the tiled backend has a decoder for this scheme.
    #[inline]
    pub const fn is_configured(self) -> bool {
        matches!(
            self,
            Compression::None
                | Compression::Lzw
                | Compression::OldJpeg
                | Compression::Jpeg
                | Compression::Deflate
                | Compression::PackBits
                | Compression::AdobeDeflate
                | Compression::Jp2kYcbcr
                | Compression::Jp2kRgb
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            Compression::None => "None",
            Compression::CcittRle => "CCITT RLE",
            Compression::Lzw => "LZW",
            Compression::OldJpeg => "Old JPEG",
            Compression::Jpeg => "JPEG",
            Compression::Deflate => "Deflate",
            Compression::PackBits => "PackBits",
            Compression::AdobeDeflate => "Adobe Deflate",
            Compression::Jp2kYcbcr => "JPEG 2000 (YCbCr)",
            Compression::Jp2kRgb => "JPEG 2000 (RGB)",
            Compression::Zstd => "Zstandard",
            Compression::Webp => "WebP",
        }
    }
}

/// Whether a raw compression value names a scheme the backend can decode.
pub fn is_codec_configured(scheme: u16) -> bool {
    Compression::from_u16(scheme).map_or(false, Compression::is_configured)
}

// =============================================================================
// Tests
// =============================================================================
