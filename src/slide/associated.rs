//! Associated (non-pyramid) images such as the slide label and thumbnail.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::container::Container;
use crate::error::TiffError;

/// An auxiliary image stored in its own container directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssociatedImage {
    pub name: String,

    /// Directory holding the image
    pub directory: usize,

    pub width: u64,
    pub height: u64,
}

/// Associated images by name, owned by the caller.
pub type AssociatedImages = HashMap<String, AssociatedImage>;

/// Register the container's current directory as an associated image.
///
/// Without `name`, the directory's ImageDescription is used as the name; if
/// that is absent too nothing is registered and `Ok(false)` is returned.
///
/// The directory is validated even when `sink` is `None`, so detection and
/// full opening fail on the same files. An existing entry with the same name
/// is kept.
///
/// # Errors
///
/// Returns a `TiffError` when the image dimensions are missing or its
/// compression cannot be decoded.
pub fn register_associated_image<C: Container>(
    sink: Option<&mut AssociatedImages>,
    name: Option<&str>,
    container: &C,
) -> Result<bool, TiffError> {
    let Some(name) = name.or_else(|| container.image_description()) else {
        return Ok(false);
    };

    let width = container
        .image_width()
        .ok_or(TiffError::MissingTag("ImageWidth"))?;
    let height = container
        .image_length()
        .ok_or(TiffError::MissingTag("ImageLength"))?;

    let compression = container
        .compression()
        .ok_or_else(|| TiffError::InvalidTagValue {
            tag: "Compression",
            message: "unreadable compression scheme".to_string(),
        })?;
    if !container.is_codec_configured(compression) {
        return Err(TiffError::UnsupportedCompression(compression));
    }

    let directory = container.current_directory();
    debug!(
        "associated image {:?}: directory {}, {}x{}",
        name, directory, width, height
    );

    if let Some(images) = sink {
        images
            .entry(name.to_string())
            .or_insert_with(|| AssociatedImage {
                name: name.to_string(),
                directory,
                width,
                height,
            });
    }

    Ok(true)
}
