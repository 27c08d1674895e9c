//! Ventana (Roche) BigTIFF slide recognition.
//!
//! Ventana iScan scanners write tiled BigTIFF files laid out as:
//!
//! - **Directory 0**: slide label
//! - **Directory 1**: thumbnail
//! - **Pyramid levels**: directories whose ImageDescription carries a
//!   `level=N` token; the `level=0` directory holds an XML packet with the
//!   scan metadata (`<iScan ...>`)
//!
//! Pyramid levels are not stored in resolution order, so they are sorted by
//! width before being handed to the tiled backend.
//!
//! # Pipeline
//!
//! ```text
//! try_ventana ─▶ classify ─▶ order_levels ─▶ TiledBackend::add_levels
//!                  │
//!                  ├─ find_value (level=N)
//!                  └─ parse_scan_info (level=0 only)
//! ```

pub mod classify;
pub mod description;
pub mod driver;
pub mod levels;
pub mod metadata;

pub use classify::{classify, fixed_slot, Level};
pub use description::find_value;
pub use driver::try_ventana;
pub use levels::order_levels;
pub use metadata::{decode_packet, parse_scan_info, MetadataDocument, SCAN_INFO_ATTRIBUTES};

/// Value of the `vendor` property
pub const VENDOR: &str = "ventana";

/// Substring of the base level's XML packet identifying a Ventana slide
pub const FORMAT_MARKER: &str = "<iScan";

/// Path of the element carrying the scan metadata
pub const SCAN_INFO_PATH: &str = "/EncodeInfo/SlideInfo/iScan";

/// Vendor-namespaced property name, e.g. `ventana.magnification`.
pub fn property_name(suffix: &str) -> String {
    format!("{}.{}", VENDOR, suffix)
}
