use thiserror::Error;

/// I/O errors that can occur when reading slide bytes
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// Error from S3 or S3-compatible storage
    #[error("S3 error: {0}")]
    S3(String),

    /// Requested range exceeds resource bounds
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, size is {size}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Object or file not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Local filesystem error
    #[error("File error: {0}")]
    File(String),
}

/// Errors that can occur when parsing TIFF structure
#[derive(Debug, Clone, Error)]
pub enum TiffError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Invalid TIFF magic bytes (not II or MM)
    #[error("Invalid TIFF magic bytes: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidMagic(u16),

    /// Invalid TIFF version number
    #[error("Invalid TIFF version: expected 42 (TIFF) or 43 (BigTIFF), got {0}")]
    InvalidVersion(u16),

    /// Invalid BigTIFF offset byte size (must be 8)
    #[error("Invalid BigTIFF offset byte size: expected 8, got {0}")]
    InvalidBigTiffOffsetSize(u16),

    /// File is too small to contain a valid TIFF header
    #[error("File too small: need at least {required} bytes, got {actual}")]
    FileTooSmall { required: u64, actual: u64 },

    /// Invalid IFD offset (points outside file or to invalid location)
    #[error("Invalid IFD offset: {0}")]
    InvalidIfdOffset(u64),

    /// IFD entry count too large to address
    #[error("Invalid IFD entry count: {0}")]
    InvalidEntryCount(u64),

    /// Required tag is missing from a directory
    #[error("Missing required tag: {0}")]
    MissingTag(&'static str),

    /// Tag has unexpected type or count
    #[error("Invalid tag value for {tag}: {message}")]
    InvalidTagValue { tag: &'static str, message: String },

    /// Compression scheme the runtime cannot decode
    #[error("Unsupported compression: {0}")]
    UnsupportedCompression(u16),

    /// Unknown field type in IFD entry
    #[error("Unknown field type: {0}")]
    UnknownFieldType(u16),
}

/// Coarse classification of a [`SlideError`].
///
/// Callers probing several vendor formats use this to decide whether to try
/// the next detector (`FormatNotSupported`) or to give up on the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The file does not belong to this vendor's format
    FormatNotSupported,

    /// The file is this vendor's format but is malformed
    BadData,

    /// Reading the file failed
    Io,
}

/// Errors raised while recognizing a Ventana slide.
#[derive(Debug, Clone, Error)]
pub enum SlideError {
    /// Not a Ventana slide; other detectors may still accept it
    #[error("Format not supported: {0}")]
    FormatNotSupported(String),

    /// A Ventana slide with malformed structure or metadata
    #[error("Bad data: {0}")]
    BadData(String),

    /// Registering an associated image failed
    #[error("Can't read associated {name} image: {source}")]
    AssociatedImage {
        name: String,
        #[source]
        source: TiffError,
    },

    /// TIFF structure error while loading the container
    #[error("TIFF error: {0}")]
    Tiff(#[from] TiffError),

    /// I/O error while reading the slide
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}

impl SlideError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SlideError::FormatNotSupported(_) => ErrorKind::FormatNotSupported,
            SlideError::BadData(_) => ErrorKind::BadData,
            SlideError::AssociatedImage { .. } => ErrorKind::Io,
            SlideError::Tiff(TiffError::Io(_)) => ErrorKind::Io,
            SlideError::Tiff(_) => ErrorKind::FormatNotSupported,
            SlideError::Io(_) => ErrorKind::Io,
        }
    }
}
