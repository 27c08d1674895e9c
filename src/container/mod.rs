//! Directory-addressable image containers.
//!
//! Format recognition walks a container one directory at a time, the way
//! libtiff-style readers expose a "current directory" cursor:
//!
//! ```text
//! ┌──────────────┐  read_directory()  ┌──────────────┐        ┌──────────────┐
//! │ directory 0  │ ─────────────────▶ │ directory 1  │ ─────▶ │ directory N  │
//! │ (label)      │                    │ (thumbnail)  │        │ (level=K)    │
//! └──────────────┘                    └──────────────┘        └──────────────┘
//! ```
//!
//! [`Container`] is the synchronous capability the Ventana recognizer needs.
//! [`DirectoryContainer`] implements it over an in-memory snapshot of each
//! directory's tags, loaded asynchronously from any
//! [`RangeReader`](crate::io::RangeReader) by [`DirectoryContainer::open`].
//!
//! The cursor is shared mutable state: one container must not be classified
//! from several threads at once.

mod loader;

pub use loader::MAX_DIRECTORIES;

use bytes::Bytes;

use crate::format::tiff::{is_codec_configured, DEFAULT_COMPRESSION};

// =============================================================================
// Container Trait
// =============================================================================

/// A multi-directory image container with a current-directory cursor.
///
/// Tag accessors answer for the current directory. `None` means the tag is
/// absent (or, for [`compression`](Container::compression), unreadable).
pub trait Container {
    /// Index of the current directory.
    fn current_directory(&self) -> usize;

    /// Advance to the next directory. Returns `false` when none remain.
    fn read_directory(&mut self) -> bool;

    /// Move to directory `index`. Returns `false` if it does not exist.
    fn set_directory(&mut self, index: usize) -> bool;

    /// Whether the current directory is tiled.
    fn is_tiled(&self) -> bool;

    fn image_width(&self) -> Option<u64>;

    fn image_length(&self) -> Option<u64>;

    /// Tile width and height.
    fn tile_size(&self) -> Option<(u32, u32)>;

    /// Compression scheme; an absent tag reads as the TIFF default.
    fn compression(&self) -> Option<u16>;

    /// Free-text ImageDescription tag.
    fn image_description(&self) -> Option<&str>;

    /// Embedded XML packet tag.
    fn xml_packet(&self) -> Option<&[u8]>;

    /// Whether the runtime can decode tiles compressed with `scheme`.
    fn is_codec_configured(&self, scheme: u16) -> bool {
        is_codec_configured(scheme)
    }
}

// =============================================================================
// Directory
// =============================================================================

/// Snapshot of the tags of one container directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    pub width: Option<u64>,
    pub height: Option<u64>,

    /// Tile width and height, present only for tiled directories
    pub tile_size: Option<(u32, u32)>,

    /// `None` when the Compression tag is present but unreadable
    pub compression: Option<u16>,

    pub description: Option<String>,
    pub xml_packet: Option<Bytes>,
}

impl Default for Directory {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            tile_size: None,
            compression: Some(DEFAULT_COMPRESSION),
            description: None,
            xml_packet: None,
        }
    }
}

impl Directory {
    /// A tiled directory of the given size with 256x256 tiles.
    pub fn tiled(width: u64, height: u64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            tile_size: Some((256, 256)),
            ..Self::default()
        }
    }

    /// A stripped (untiled) directory of the given size.
    pub fn stripped(width: u64, height: u64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_compression(mut self, compression: Option<u16>) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_xml_packet(mut self, xml: impl Into<Bytes>) -> Self {
        self.xml_packet = Some(xml.into());
        self
    }
}

// =============================================================================
// DirectoryContainer
// =============================================================================

/// A [`Container`] over directory snapshots, positioned at directory 0.
#[derive(Debug, Clone, Default)]
pub struct DirectoryContainer {
    directories: Vec<Directory>,
    cursor: usize,
    identifier: String,
}

impl DirectoryContainer {
    pub fn new(directories: Vec<Directory>) -> Self {
        Self {
            directories,
            cursor: 0,
            identifier: String::from("memory"),
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Where the directories were loaded from (for logging).
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn directory_count(&self) -> usize {
        self.directories.len()
    }

    pub fn directories(&self) -> &[Directory] {
        &self.directories
    }

    fn current(&self) -> Option<&Directory> {
        self.directories.get(self.cursor)
    }
}

impl Container for DirectoryContainer {
    fn current_directory(&self) -> usize {
        self.cursor
    }

    fn read_directory(&mut self) -> bool {
        if self.cursor + 1 < self.directories.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn set_directory(&mut self, index: usize) -> bool {
        if index < self.directories.len() {
            self.cursor = index;
            true
        } else {
            false
        }
    }

    fn is_tiled(&self) -> bool {
        self.current().map_or(false, |d| d.tile_size.is_some())
    }

    fn image_width(&self) -> Option<u64> {
        self.current()?.width
    }

    fn image_length(&self) -> Option<u64> {
        self.current()?.height
    }

    fn tile_size(&self) -> Option<(u32, u32)> {
        self.current()?.tile_size
    }

    fn compression(&self) -> Option<u16> {
        self.current()?.compression
    }

    fn image_description(&self) -> Option<&str> {
        self.current()?.description.as_deref()
    }

    fn xml_packet(&self) -> Option<&[u8]> {
        self.current()?.xml_packet.as_deref()
    }
}
