//! Byte sources for slide files.
//!
//! The TIFF loader only ever asks for byte ranges, so slides can be read from
//! local disk, from memory, or straight out of S3 without a full download.

mod file_reader;
mod range_reader;
mod s3_reader;

pub use file_reader::FileRangeReader;
pub use range_reader::{MemoryRangeReader, RangeReader};
pub use s3_reader::{create_s3_client, S3Location, S3RangeReader};
