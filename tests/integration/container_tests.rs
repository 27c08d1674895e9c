//! Directory loading integration tests.
//!
//! Tests verify:
//! - Both byte orders and BigTIFF load the same directories
//! - Tag values stored inline and out of line are read
//! - Broken or looping IFD chains are handled

use ventana_slide::container::{Container, DirectoryContainer, MAX_DIRECTORIES};
use ventana_slide::io::MemoryRangeReader;
use ventana_slide::{Directory, TiffError};

use super::test_utils::{
    build_slide, is_bigtiff_magic, is_tiff_magic, scan_info_xml, ventana_ifds, ByteOrderType,
    IfdBuilder, TiffBuilder, TrackingMockReader,
};

async fn load(data: Vec<u8>) -> DirectoryContainer {
    let reader = MemoryRangeReader::new(data, "mem://test.tif");
    DirectoryContainer::open(&reader).await.unwrap()
}

// =============================================================================
// Byte Order and BigTIFF
// =============================================================================

#[tokio::test]
async fn test_all_layouts_load_the_same_directories() {
    let xml = scan_info_xml(&[("Magnification", "40")]);
    let mut loaded: Vec<Vec<Directory>> = Vec::new();

    for (byte_order, is_bigtiff) in [
        (ByteOrderType::LittleEndian, false),
        (ByteOrderType::BigEndian, false),
        (ByteOrderType::LittleEndian, true),
        (ByteOrderType::BigEndian, true),
    ] {
        let data = build_slide(ventana_ifds(&xml), byte_order, is_bigtiff);
        if is_bigtiff {
            assert!(is_bigtiff_magic(&data));
        } else {
            assert!(is_tiff_magic(&data));
        }
        loaded.push(load(data).await.directories().to_vec());
    }

    assert_eq!(loaded[0].len(), 4);
    for other in &loaded[1..] {
        assert_eq!(other, &loaded[0]);
    }
}

#[tokio::test]
async fn test_directory_tags() {
    let xml = scan_info_xml(&[("Magnification", "40")]);
    let mut container = load(build_slide(
        ventana_ifds(&xml),
        ByteOrderType::BigEndian,
        true,
    ))
    .await;

    assert_eq!(container.image_description(), Some("Label Image"));
    assert_eq!(container.image_width(), Some(1200));
    assert_eq!(container.image_length(), Some(400));
    assert_eq!(container.tile_size(), Some((256, 256)));
    assert_eq!(container.compression(), Some(7));
    assert_eq!(container.xml_packet(), None);

    assert!(container.set_directory(2));
    assert_eq!(container.image_width(), Some(100000));
    assert_eq!(container.tile_size(), Some((1024, 1024)));
    assert_eq!(container.xml_packet(), Some(xml.as_bytes()));
    assert_eq!(
        container.image_description(),
        Some("level=0 mag=20 quality=90")
    );
}

#[tokio::test]
async fn test_short_values_are_inline() {
    // "lvl=0\0" fits the 8-byte BigTIFF value field
    let data = TiffBuilder::new()
        .with_bigtiff(true)
        .add_ifd(IfdBuilder::tiled(64, 64, 16, 16).description("lvl=0"))
        .build();
    let container = load(data).await;
    assert_eq!(container.image_description(), Some("lvl=0"));
}

#[tokio::test]
async fn test_stripped_and_missing_compression() {
    let mut no_compression = IfdBuilder::tiled(64, 64, 16, 16);
    no_compression.remove(259);

    let data = TiffBuilder::new()
        .add_ifd(IfdBuilder::stripped(640, 480))
        .add_ifd(no_compression)
        .build();
    let mut container = load(data).await;

    assert!(!container.is_tiled());
    assert_eq!(container.tile_size(), None);

    assert!(container.read_directory());
    assert!(container.is_tiled());
    assert_eq!(container.compression(), Some(1));
}

#[tokio::test]
async fn test_unreadable_compression_is_recorded() {
    let mut ifd = IfdBuilder::tiled(64, 64, 16, 16);
    ifd.add_entry_with_data(259, 2, b"jpeg\0".to_vec());

    let container = load(TiffBuilder::new().add_ifd(ifd).build()).await;
    assert_eq!(container.compression(), None);
}

// =============================================================================
// Chains and Errors
// =============================================================================

#[tokio::test]
async fn test_many_directories_are_capped() {
    let builder = (0..MAX_DIRECTORIES + 5).fold(TiffBuilder::new(), |b, _| {
        b.add_ifd(IfdBuilder::stripped(8, 8))
    });
    let container = load(builder.build()).await;
    assert_eq!(container.directory_count(), MAX_DIRECTORIES);
}

#[tokio::test]
async fn test_next_offset_past_end() {
    let mut data = TiffBuilder::new()
        .add_ifd(IfdBuilder::stripped(8, 8))
        .build();
    // Point the first IFD's next offset beyond the file
    let next_pos = 8 + 2 + 5 * 12;
    data[next_pos..next_pos + 4].copy_from_slice(&0x00FF_FFFFu32.to_le_bytes());

    let reader = MemoryRangeReader::new(data, "mem://broken.tif");
    let err = DirectoryContainer::open(&reader).await.unwrap_err();
    assert!(matches!(err, TiffError::InvalidIfdOffset(0x00FF_FFFF)));
}

#[tokio::test]
async fn test_truncated_file() {
    let data = build_slide(
        ventana_ifds(&scan_info_xml(&[])),
        ByteOrderType::LittleEndian,
        true,
    );
    let reader = MemoryRangeReader::new(data[..40].to_vec(), "mem://truncated.tif");
    let err = DirectoryContainer::open(&reader).await.unwrap_err();
    assert!(matches!(err, TiffError::FileTooSmall { actual: 40, .. }));
}

#[tokio::test]
async fn test_not_a_tiff() {
    let reader = MemoryRangeReader::new(b"GIF89a\x01\x00\x01\x00".to_vec(), "mem://a.gif");
    assert!(matches!(
        DirectoryContainer::open(&reader).await,
        Err(TiffError::InvalidMagic(_))
    ));

    let reader = MemoryRangeReader::new(b"II".to_vec(), "mem://tiny");
    assert!(matches!(
        DirectoryContainer::open(&reader).await,
        Err(TiffError::FileTooSmall { .. })
    ));
}

#[tokio::test]
async fn test_tile_data_is_never_read() {
    let tile_data = vec![0xAB; 64 * 1024];
    let mut builder = TiffBuilder::new().with_bigtiff(true);
    for ifd in ventana_ifds(&scan_info_xml(&[("ScanRes", "0.5")])) {
        builder = builder.add_ifd(ifd);
    }
    let data = builder.with_trailing_data(tile_data.clone()).build();
    let tile_start = (data.len() - tile_data.len()) as u64;

    let reader = TrackingMockReader::new(data, "mem://tracked.tif");
    DirectoryContainer::open(&reader).await.unwrap();

    assert!(reader.request_count() > 0);
    for (offset, len) in reader.get_requests() {
        assert!(offset + len as u64 <= tile_start, "read {}+{} touches tile data", offset, len);
    }
}
