//! TIFF parsing for Whole Slide Images.
//!
//! # Key Concepts
//!
//! - **Byte order**: declared in the header (II = little-endian, MM = big-endian).
//!   Every multi-byte value is read in that order.
//!
//! - **Classic TIFF vs BigTIFF**: 32-bit versus 64-bit offsets. Ventana slides
//!   are BigTIFF; both are handled.
//!
//! - **IFD (Image File Directory)**: one per sub-image. Slides carry several:
//!   pyramid levels plus label, thumbnail and overview images.
//!
//! - **Inline vs offset values**: small values live in the IFD entry itself,
//!   larger ones at an offset the entry points to.

mod parser;
mod tags;
mod values;

pub use parser::{ByteOrder, Ifd, IfdEntry, TiffHeader, BIGTIFF_HEADER_SIZE, TIFF_HEADER_SIZE};
pub use tags::{is_codec_configured, Compression, FieldType, TiffTag, DEFAULT_COMPRESSION};
pub use values::ValueReader;
