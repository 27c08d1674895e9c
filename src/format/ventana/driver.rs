//! Ventana format driver: classification, ordering and backend handoff.

use tracing::{debug, info};

use crate::container::Container;
use crate::error::SlideError;
use crate::slide::{AssociatedImages, PropertyMap, QuickHash, TiledBackend};

use super::classify::classify;
use super::levels::order_levels;

/// Recognize a Ventana slide and hand its pyramid to `backend`.
///
/// The container must be positioned at its first directory. Without sinks
/// the slide is only checked; `properties` and `associated` are left
/// untouched.
///
/// Returns the pyramid directories, base level first.
///
/// # Errors
///
/// `FormatNotSupported` when the container is not a Ventana slide, `BadData`
/// when it is one but malformed, and the backend's error if level setup
/// fails. Associated images registered before a failure are not removed.
pub fn try_ventana<C, B>(
    container: &mut C,
    properties: Option<&mut PropertyMap>,
    associated: Option<&mut AssociatedImages>,
    quickhash: Option<&mut QuickHash>,
    backend: &mut B,
) -> Result<Vec<usize>, SlideError>
where
    C: Container,
    B: TiledBackend,
{
    let levels = classify(container, properties, associated)?;
    debug!("{} candidate levels", levels.len());

    let directories = order_levels(levels)?;
    backend.add_levels(container, &directories, quickhash)?;

    info!(
        "Ventana slide with {} levels, base directory {}",
        directories.len(),
        directories[0]
    );
    Ok(directories)
}
