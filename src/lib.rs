//! # ventana-slide
//!
//! Recognition of Ventana (Roche) whole slide images.
//!
//! Ventana scanners write tiled BigTIFF files whose pyramid levels are
//! identified by `level=N` tokens in each directory's ImageDescription and
//! whose scan metadata lives in an XML packet on the base level. This crate
//! decides whether a file is such a slide, extracts its properties and
//! associated images, and orders its pyramid levels for a tiled backend.
//!
//! Files are read through byte ranges, so slides on S3 are never downloaded
//! in full.
//!
//! ## Architecture
//!
//! - [`io`] - Range readers for local files, memory and S3
//! - [`mod@format`] - TIFF parsing and the Ventana recognizer
//! - [`container`] - Directory-by-directory access to a TIFF
//! - [`slide`] - Properties, associated images, pyramid layout, quickhash
//! - [`config`] - CLI configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use ventana_slide::{FileRangeReader, VentanaSlide};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let reader = FileRangeReader::open("slide.bif").await?;
//!     let slide = VentanaSlide::open(&reader).await?;
//!
//!     println!("mpp-x = {:?}", slide.properties.get("mpp-x"));
//!     println!("{} levels", slide.layout.level_count());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod container;
pub mod error;
pub mod format;
pub mod io;
pub mod slide;

// Re-export commonly used types
pub use config::{Cli, Command, DetectConfig, OutputFormat, ProbeConfig, SlideSource, SourceArgs};
pub use container::{Container, Directory, DirectoryContainer, MAX_DIRECTORIES};
pub use error::{ErrorKind, IoError, SlideError, TiffError};
pub use format::tiff::{
    is_codec_configured, ByteOrder, Compression, FieldType, Ifd, IfdEntry, TiffHeader, TiffTag,
    ValueReader, BIGTIFF_HEADER_SIZE, DEFAULT_COMPRESSION, TIFF_HEADER_SIZE,
};
pub use format::ventana::{
    classify, find_value, order_levels, parse_scan_info, try_ventana, Level, MetadataDocument,
};
pub use io::{
    create_s3_client, FileRangeReader, MemoryRangeReader, RangeReader, S3Location, S3RangeReader,
};
pub use slide::{
    register_associated_image, AssociatedImage, AssociatedImages, LevelInfo, PropertyMap,
    PyramidLayout, QuickHash, TiledBackend, VentanaSlide,
};
