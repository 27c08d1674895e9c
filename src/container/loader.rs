//! Loading a [`DirectoryContainer`] from a TIFF/BigTIFF file.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::TiffError;
use crate::format::tiff::{
    Ifd, TiffHeader, TiffTag, ValueReader, BIGTIFF_HEADER_SIZE, DEFAULT_COMPRESSION,
};
use crate::io::RangeReader;

use super::{Directory, DirectoryContainer};

/// Maximum number of IFDs followed along the chain (safety limit)
pub const MAX_DIRECTORIES: usize = 100;

impl DirectoryContainer {
    /// Read the TIFF header and every IFD in the chain, resolving the tags
    /// format recognition looks at.
    ///
    /// The returned container is positioned at directory 0.
    pub async fn open<R: RangeReader>(reader: &R) -> Result<Self, TiffError> {
        let header_len = (reader.size() as usize).min(BIGTIFF_HEADER_SIZE);
        let header_bytes = reader.read_exact_at(0, header_len).await?;
        let header = TiffHeader::parse(&header_bytes, reader.size())?;

        let ifds = read_ifd_chain(reader, &header).await?;
        debug!(
            "{}: {} directories (bigtiff={})",
            reader.identifier(),
            ifds.len(),
            header.is_bigtiff
        );

        let values = ValueReader::new(reader, &header);
        let mut directories = Vec::with_capacity(ifds.len());
        for ifd in &ifds {
            directories.push(load_directory(&values, ifd).await?);
        }

        Ok(DirectoryContainer::new(directories).with_identifier(reader.identifier()))
    }
}

/// Follow the next-IFD chain, stopping at offset 0, a repeated offset, or
/// [`MAX_DIRECTORIES`].
async fn read_ifd_chain<R: RangeReader>(
    reader: &R,
    header: &TiffHeader,
) -> Result<Vec<Ifd>, TiffError> {
    let mut ifds = Vec::new();
    let mut seen = HashSet::new();
    let mut offset = header.first_ifd_offset;

    while offset != 0 {
        if ifds.len() == MAX_DIRECTORIES {
            warn!(
                "{}: stopping after {} directories",
                reader.identifier(),
                MAX_DIRECTORIES
            );
            break;
        }
        if !seen.insert(offset) {
            warn!("{}: IFD chain loops back to {}", reader.identifier(), offset);
            break;
        }
        if offset >= reader.size() {
            return Err(TiffError::InvalidIfdOffset(offset));
        }

        let count_bytes = reader.read_exact_at(offset, header.ifd_count_size()).await?;
        let entry_count = if header.is_bigtiff {
            header.byte_order.read_u64(&count_bytes)
        } else {
            header.byte_order.read_u16(&count_bytes) as u64
        };

        let ifd_size = Ifd::calculate_size(entry_count, header)?;
        let ifd_end = offset.checked_add(ifd_size as u64);
        if ifd_end.map_or(true, |end| end > reader.size()) {
            return Err(TiffError::FileTooSmall {
                required: ifd_end.unwrap_or(u64::MAX),
                actual: reader.size(),
            });
        }
        let ifd_bytes = reader.read_exact_at(offset, ifd_size).await?;
        let ifd = Ifd::parse(&ifd_bytes, header)?;

        offset = ifd.next_ifd_offset;
        ifds.push(ifd);
    }

    Ok(ifds)
}

async fn load_directory<R: RangeReader>(
    values: &ValueReader<'_, R>,
    ifd: &Ifd,
) -> Result<Directory, TiffError> {
    let width = read_optional_u64(values, ifd, TiffTag::ImageWidth).await?;
    let height = read_optional_u64(values, ifd, TiffTag::ImageLength).await?;

    let tile_size = if ifd.is_tiled() {
        let tile_width = read_optional_u64(values, ifd, TiffTag::TileWidth).await?;
        let tile_height = read_optional_u64(values, ifd, TiffTag::TileLength).await?;
        match (tile_width, tile_height) {
            (Some(w), Some(h)) => Some((
                to_u32(w, TiffTag::TileWidth)?,
                to_u32(h, TiffTag::TileLength)?,
            )),
            _ => None,
        }
    } else {
        None
    };

    // A Compression tag we cannot decode is recorded as unreadable rather than
    // failing the load: only pyramid levels care about it.
    let compression = match ifd.get_entry_by_tag(TiffTag::Compression) {
        None => Some(DEFAULT_COMPRESSION),
        Some(entry) => match values.read_u64(entry).await {
            Ok(value) => u16::try_from(value).ok(),
            Err(TiffError::Io(e)) => return Err(TiffError::Io(e)),
            Err(e) => {
                debug!("unreadable compression tag: {}", e);
                None
            }
        },
    };

    let description = match ifd.get_entry_by_tag(TiffTag::ImageDescription) {
        Some(entry) => Some(values.read_string(entry).await?),
        None => None,
    };

    let xml_packet = match ifd.get_entry_by_tag(TiffTag::XmlPacket) {
        Some(entry) => Some(values.read_raw_bytes(entry).await?),
        None => None,
    };

    Ok(Directory {
        width,
        height,
        tile_size,
        compression,
        description,
        xml_packet,
    })
}

async fn read_optional_u64<R: RangeReader>(
    values: &ValueReader<'_, R>,
    ifd: &Ifd,
    tag: TiffTag,
) -> Result<Option<u64>, TiffError> {
    match ifd.get_entry_by_tag(tag) {
        Some(entry) => Ok(Some(values.read_u64(entry).await?)),
        None => Ok(None),
    }
}

fn to_u32(value: u64, tag: TiffTag) -> Result<u32, TiffError> {
    u32::try_from(value).map_err(|_| TiffError::InvalidTagValue {
        tag: tag.name(),
        message: format!("{} does not fit in 32 bits", value),
    })
}
