//! Directory classification.
//!
//! Walks the container from its current directory to the end, sorting each
//! directory into one of:
//!
//! | Directory                       | Treated as                  |
//! |---------------------------------|-----------------------------|
//! | untiled, or no width            | ignored                     |
//! | index 0                         | `label` associated image    |
//! | index 1                         | `thumbnail` associated image|
//! | description with `level=N`      | pyramid level               |
//! | anything else                   | ignored (e.g. overview)     |

use tracing::{debug, info};

use crate::container::Container;
use crate::error::SlideError;
use crate::slide::{register_associated_image, AssociatedImages, PropertyMap, PROPERTY_NAME_VENDOR};

use super::description::find_value;
use super::metadata::parse_scan_info;
use super::{FORMAT_MARKER, VENDOR};

/// A pyramid level candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    /// Container directory of the level
    pub directory: usize,

    /// Width in pixels
    pub width: u64,
}

/// Associated image occupying a fixed directory slot, if any.
///
/// Ventana stores the label first and the thumbnail second regardless of
/// their content.
pub fn fixed_slot(directory: usize) -> Option<&'static str> {
    match directory {
        0 => Some("label"),
        1 => Some("thumbnail"),
        _ => None,
    }
}

/// Classify every directory from the container's current position onward.
///
/// Returns the pyramid levels in directory order. Associated images are
/// registered into `associated` as they are met and stay registered if a
/// later directory fails.
///
/// # Errors
///
/// - `FormatNotSupported` if the first directory is untiled, or the `level=0`
///   directory lacks a Ventana XML packet
/// - `BadData` for an unreadable or undecodable level compression, or
///   malformed scan metadata
/// - `AssociatedImage` if the label or thumbnail cannot be registered
pub fn classify<C: Container>(
    container: &mut C,
    mut properties: Option<&mut PropertyMap>,
    mut associated: Option<&mut AssociatedImages>,
) -> Result<Vec<Level>, SlideError> {
    if !container.is_tiled() {
        return Err(SlideError::FormatNotSupported("TIFF is not tiled".to_string()));
    }

    if let Some(props) = properties.as_deref_mut() {
        props.insert(PROPERTY_NAME_VENDOR.to_string(), VENDOR.to_string());
    }

    let mut levels = Vec::new();
    loop {
        let directory = container.current_directory();
        if let Some(level) =
            classify_directory(container, directory, &mut properties, &mut associated)?
        {
            levels.push(level);
        }

        if !container.read_directory() {
            break;
        }
    }

    Ok(levels)
}

fn classify_directory<C: Container>(
    container: &C,
    directory: usize,
    properties: &mut Option<&mut PropertyMap>,
    associated: &mut Option<&mut AssociatedImages>,
) -> Result<Option<Level>, SlideError> {
    if !container.is_tiled() {
        debug!("directory {}: not tiled, skipping", directory);
        return Ok(None);
    }

    let Some(width) = container.image_width() else {
        debug!("directory {}: no width, skipping", directory);
        return Ok(None);
    };

    if let Some(name) = fixed_slot(directory) {
        register_associated_image(associated.as_deref_mut(), Some(name), container).map_err(
            |source| SlideError::AssociatedImage {
                name: name.to_string(),
                source,
            },
        )?;
        debug!("directory {}: {} image", directory, name);
        return Ok(None);
    }

    let Some(level) = container.image_description().and_then(|d| find_value(d, "level")) else {
        debug!("directory {}: no level in description, skipping", directory);
        return Ok(None);
    };

    let compression = container
        .compression()
        .ok_or_else(|| SlideError::BadData("Can't read compression scheme".to_string()))?;
    if !container.is_codec_configured(compression) {
        return Err(SlideError::BadData(format!(
            "Unsupported TIFF compression: {}",
            compression
        )));
    }

    if level == "0" {
        let xml = container
            .xml_packet()
            .filter(|xml| contains_marker(xml))
            .ok_or_else(|| SlideError::FormatNotSupported("Not a Ventana slide".to_string()))?;
        parse_scan_info(xml, properties.as_deref_mut())?;
        info!("directory {}: Ventana base level confirmed", directory);
    }

    debug!("directory {}: level {} ({} px wide)", directory, level, width);
    Ok(Some(Level { directory, width }))
}

fn contains_marker(xml: &[u8]) -> bool {
    let end = xml.iter().position(|&b| b == 0).unwrap_or(xml.len());
    xml[..end]
        .windows(FORMAT_MARKER.len())
        .any(|window| window == FORMAT_MARKER.as_bytes())
}
