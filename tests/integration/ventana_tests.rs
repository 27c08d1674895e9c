//! Ventana recognition integration tests.
//!
//! Tests verify:
//! - A Ventana slide opens with properties, associated images and levels
//! - Detection-only mode agrees with a full open
//! - Foreign and malformed files are classified correctly
//! - Slides are read from local files as well as memory

use std::io::Write;

use ventana_slide::io::{FileRangeReader, MemoryRangeReader};
use ventana_slide::{ErrorKind, SlideError, VentanaSlide};

use super::test_utils::{
    build_slide, create_ventana_slide, scan_info_xml, ventana_ifds, ByteOrderType, IfdBuilder,
    TiffBuilder,
};

fn reader(data: Vec<u8>) -> MemoryRangeReader {
    MemoryRangeReader::new(data, "mem://slide.bif")
}

// =============================================================================
// Recognized Slides
// =============================================================================

#[tokio::test]
async fn test_open_ventana_slide() {
    let slide = VentanaSlide::open(&reader(create_ventana_slide()))
        .await
        .unwrap();

    let prop = |k: &str| slide.properties.get(k).map(String::as_str);
    assert_eq!(prop("vendor"), Some("ventana"));
    assert_eq!(prop("objective-power"), Some("20"));
    assert_eq!(prop("mpp-x"), Some("0.25"));
    assert_eq!(prop("mpp-y"), Some("0.25"));
    assert_eq!(prop("ventana.magnification"), Some("20"));
    assert_eq!(prop("ventana.resolution"), Some("0.25"));
    assert_eq!(prop("ventana.device-model"), Some("BI10N0294"));
    assert_eq!(prop("ventana.build-date"), Some("2013-04-18"));
    assert_eq!(prop("ventana.show-label"), Some("1"));
    assert_eq!(prop("ventana.slide-annotation"), None);

    assert_eq!(slide.associated_images.len(), 2);
    let label = &slide.associated_images["label"];
    assert_eq!((label.directory, label.width, label.height), (0, 1200, 400));
    assert_eq!(slide.associated_images["thumbnail"].directory, 1);

    let directories: Vec<usize> = slide.layout.levels().iter().map(|l| l.directory).collect();
    assert_eq!(directories, vec![2, 3]);
    assert_eq!(slide.layout.dimensions(), Some((100000, 80000)));

    let level1 = slide.layout.level(1).unwrap();
    assert_eq!((level1.tiles_x, level1.tiles_y), (25, 20));
    assert!((level1.downsample - 4.0).abs() < 1e-9);

    assert_eq!(slide.quickhash.len(), 64);
    assert_eq!(slide.source, "mem://slide.bif");
}

#[tokio::test]
async fn test_detect_matches_open() {
    let data = create_ventana_slide();
    let levels = VentanaSlide::detect(&reader(data.clone())).await.unwrap();
    let slide = VentanaSlide::open(&reader(data)).await.unwrap();

    let opened: Vec<usize> = slide.layout.levels().iter().map(|l| l.directory).collect();
    assert_eq!(levels, opened);
}

#[tokio::test]
async fn test_quickhash_is_stable() {
    let a = VentanaSlide::open(&reader(create_ventana_slide())).await.unwrap();
    let b = VentanaSlide::open(&reader(create_ventana_slide())).await.unwrap();
    assert_eq!(a.quickhash, b.quickhash);
}

#[tokio::test]
async fn test_levels_sorted_by_width() {
    let xml = scan_info_xml(&[("Magnification", "40"), ("ScanRes", "0.2325")]);
    let ifds = vec![
        IfdBuilder::tiled(1200, 400, 256, 256),
        IfdBuilder::tiled(1024, 768, 256, 256),
        IfdBuilder::tiled(10000, 8000, 512, 512).description("level=2"),
        IfdBuilder::tiled(40000, 32000, 512, 512)
            .description("level=0")
            .xml_packet(&xml),
        IfdBuilder::tiled(10000, 8000, 512, 512).description("level=2b"),
        IfdBuilder::tiled(20000, 16000, 512, 512).description("level=1"),
        // Overview without a level token is ignored
        IfdBuilder::tiled(3000, 1000, 256, 256).description("Overview"),
    ];
    let data = build_slide(ifds, ByteOrderType::BigEndian, true);

    let slide = VentanaSlide::open(&reader(data)).await.unwrap();
    let directories: Vec<usize> = slide.layout.levels().iter().map(|l| l.directory).collect();
    assert_eq!(directories, vec![3, 5, 2, 4]);
    assert_eq!(slide.properties.get("mpp-x").map(String::as_str), Some("0.2325"));
    assert_eq!(slide.properties.get("objective-power").map(String::as_str), Some("40"));
}

#[tokio::test]
async fn test_classic_tiff_layout_is_accepted() {
    let xml = scan_info_xml(&[("Magnification", "20"), ("ScanRes", "0.5")]);
    let data = build_slide(ventana_ifds(&xml), ByteOrderType::LittleEndian, false);
    let levels = VentanaSlide::detect(&reader(data)).await.unwrap();
    assert_eq!(levels, vec![2, 3]);
}

#[tokio::test]
async fn test_open_from_local_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&create_ventana_slide()).unwrap();
    file.flush().unwrap();

    let reader = FileRangeReader::open(file.path()).await.unwrap();
    let slide = VentanaSlide::open(&reader).await.unwrap();
    assert_eq!(slide.layout.level_count(), 2);
    assert!(slide.associated_images.contains_key("label"));
}

// =============================================================================
// Not Ventana
// =============================================================================

#[tokio::test]
async fn test_untiled_first_directory() {
    let data = TiffBuilder::new()
        .add_ifd(IfdBuilder::stripped(4000, 3000))
        .add_ifd(IfdBuilder::tiled(4000, 3000, 256, 256).description("level=0"))
        .build();
    let err = VentanaSlide::open(&reader(data)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FormatNotSupported);
    assert_eq!(err.to_string(), "Format not supported: TIFF is not tiled");
}

#[tokio::test]
async fn test_xml_without_marker() {
    let xml = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"/></x:xmpmeta>"#;
    let data = build_slide(ventana_ifds(xml), ByteOrderType::LittleEndian, true);

    let err = VentanaSlide::detect(&reader(data)).await.unwrap_err();
    assert!(matches!(err, SlideError::FormatNotSupported(ref m) if m == "Not a Ventana slide"));
}

#[tokio::test]
async fn test_marker_in_unparsable_xml() {
    let data = build_slide(
        ventana_ifds("<EncodeInfo><iScan Magnification=\"20\">"),
        ByteOrderType::LittleEndian,
        true,
    );
    let err = VentanaSlide::open(&reader(data)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FormatNotSupported);
    assert_eq!(err.to_string(), "Format not supported: Could not parse XML");
}

#[tokio::test]
async fn test_oversized_entry_count_is_an_error() {
    let mut data = b"II\x2B\x00\x08\x00\x00\x00".to_vec();
    data.extend(&16u64.to_le_bytes());
    data.extend(&(1u64 << 62).to_le_bytes());
    data.resize(40, 0);

    let err = VentanaSlide::detect(&reader(data)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FormatNotSupported);
    assert!(err.to_string().contains("Invalid IFD entry count"));
}

#[tokio::test]
async fn test_not_a_tiff() {
    let err = VentanaSlide::detect(&reader(b"\xFF\xD8\xFF\xE0 not a tiff at all".to_vec()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FormatNotSupported);
}

// =============================================================================
// Malformed Ventana
// =============================================================================

#[tokio::test]
async fn test_scan_info_count() {
    for xml in [
        "<EncodeInfo><SlideInfo/><Other><iScan/></Other></EncodeInfo>",
        "<EncodeInfo><SlideInfo><iScan/><iScan/></SlideInfo></EncodeInfo>",
    ] {
        let data = build_slide(ventana_ifds(xml), ByteOrderType::LittleEndian, true);
        let err = VentanaSlide::open(&reader(data)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadData, "{}", xml);
    }
}

#[tokio::test]
async fn test_unsupported_level_compression() {
    let xml = scan_info_xml(&[("Magnification", "20")]);
    let mut ifds = ventana_ifds(&xml);
    ifds.push(
        IfdBuilder::tiled(6250, 5000, 1024, 1024)
            .description("level=2")
            .compression(50001),
    );
    let data = build_slide(ifds, ByteOrderType::LittleEndian, true);

    let err = VentanaSlide::open(&reader(data)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadData);
    assert!(err.to_string().contains("Unsupported TIFF compression: 50001"));
}

#[tokio::test]
async fn test_only_associated_images() {
    let data = TiffBuilder::new()
        .with_bigtiff(true)
        .add_ifd(IfdBuilder::tiled(1200, 400, 256, 256))
        .add_ifd(IfdBuilder::tiled(1024, 768, 256, 256))
        .build();
    let err = VentanaSlide::detect(&reader(data)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadData);
}

#[tokio::test]
async fn test_unreadable_thumbnail() {
    let xml = scan_info_xml(&[("Magnification", "20")]);
    let mut ifds = ventana_ifds(&xml);
    ifds[1] = IfdBuilder::tiled(1024, 768, 256, 256).compression(2);
    let data = build_slide(ifds, ByteOrderType::LittleEndian, true);

    let err = VentanaSlide::open(&reader(data)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err
        .to_string()
        .starts_with("Can't read associated thumbnail image: "));
}
