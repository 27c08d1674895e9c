//! Pyramid level ordering.

use crate::error::SlideError;

use super::classify::Level;

/// Order levels from widest to narrowest and return their directories.
///
/// Levels of equal width keep ascending directory order. The first entry is
/// the base level.
pub fn order_levels(mut levels: Vec<Level>) -> Result<Vec<usize>, SlideError> {
    if levels.is_empty() {
        return Err(SlideError::BadData("No pyramid levels found".to_string()));
    }

    levels.sort_by(|a, b| b.width.cmp(&a.width).then(a.directory.cmp(&b.directory)));
    Ok(levels.into_iter().map(|l| l.directory).collect())
}
