//! Tiled-image backend receiving the ordered pyramid levels.
//!
//! The format driver decides *which* directories form the pyramid; a
//! [`TiledBackend`] turns them into readable levels. [`PyramidLayout`]
//! records the geometry of each level so tile requests can be resolved
//! later.

use serde::Serialize;
use tracing::debug;

use crate::container::Container;
use crate::error::SlideError;

use super::hash::QuickHash;

// =============================================================================
// Level Information
// =============================================================================

/// Geometry of a single pyramid level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelInfo {
    /// Container directory holding this level
    pub directory: usize,

    /// Width of this level in pixels
    pub width: u64,

    /// Height of this level in pixels
    pub height: u64,

    pub tile_width: u32,
    pub tile_height: u32,

    /// Number of tiles in X direction
    pub tiles_x: u64,

    /// Number of tiles in Y direction
    pub tiles_y: u64,

    /// Downsample factor relative to level 0
    ///
    /// Level 0 has downsample 1.0, level 1 might have 4.0, etc.
    pub downsample: f64,
}

// =============================================================================
// TiledBackend Trait
// =============================================================================

/// Consumer of the ordered pyramid directories.
pub trait TiledBackend {
    /// Set up levels from `directories`, ordered from the base (largest)
    /// level down, feeding identifying data into `quickhash` when given.
    fn add_levels<C: Container>(
        &mut self,
        container: &mut C,
        directories: &[usize],
        quickhash: Option<&mut QuickHash>,
    ) -> Result<(), SlideError>;
}

// =============================================================================
// PyramidLayout
// =============================================================================

/// A [`TiledBackend`] that records per-level geometry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PyramidLayout {
    levels: Vec<LevelInfo>,
}

impl PyramidLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of pyramid levels.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[LevelInfo] {
        &self.levels
    }

    pub fn level(&self, level: usize) -> Option<&LevelInfo> {
        self.levels.get(level)
    }

    /// Dimensions of the base level.
    pub fn dimensions(&self) -> Option<(u64, u64)> {
        self.levels.first().map(|l| (l.width, l.height))
    }

    /// Find the best level for a given downsample factor.
    ///
    /// Returns the level with the largest downsample that does not exceed the
    /// requested factor (so no detail is lost), or level 0 when every level
    /// is coarser than requested.
    pub fn best_level_for_downsample(&self, downsample: f64) -> Option<usize> {
        if self.levels.is_empty() {
            return None;
        }

        let best = self
            .levels
            .iter()
            .enumerate()
            .filter(|(_, l)| l.downsample <= downsample * 1.01) // Small tolerance
            .map(|(idx, _)| idx)
            .last()
            .unwrap_or(0);
        Some(best)
    }
}

impl TiledBackend for PyramidLayout {
    fn add_levels<C: Container>(
        &mut self,
        container: &mut C,
        directories: &[usize],
        quickhash: Option<&mut QuickHash>,
    ) -> Result<(), SlideError> {
        let mut levels = Vec::with_capacity(directories.len());

        for &directory in directories {
            if !container.set_directory(directory) {
                return Err(SlideError::BadData(format!(
                    "Cannot read directory {}",
                    directory
                )));
            }
            levels.push(read_level(container, directory)?);
        }

        let Some(base) = levels.first().copied() else {
            return Err(SlideError::BadData("No pyramid levels".to_string()));
        };

        for level in &mut levels {
            let downsample_x = base.width as f64 / level.width as f64;
            let downsample_y = base.height as f64 / level.height as f64;
            level.downsample = (downsample_x + downsample_y) / 2.0;
            debug!(
                "level: directory {}, {}x{}, downsample {:.3}",
                level.directory, level.width, level.height, level.downsample
            );
        }

        if let (Some(hash), Some(lowest)) = (quickhash, levels.last()) {
            hash_level(hash, lowest);
        }

        self.levels = levels;
        Ok(())
    }
}

fn read_level<C: Container>(container: &C, directory: usize) -> Result<LevelInfo, SlideError> {
    let missing = |what: &str| {
        SlideError::BadData(format!("Cannot read {} of directory {}", what, directory))
    };

    let width = container
        .image_width()
        .filter(|&w| w > 0)
        .ok_or_else(|| missing("image width"))?;
    let height = container
        .image_length()
        .filter(|&h| h > 0)
        .ok_or_else(|| missing("image height"))?;
    let (tile_width, tile_height) = container
        .tile_size()
        .filter(|&(w, h)| w > 0 && h > 0)
        .ok_or_else(|| missing("tile size"))?;

    Ok(LevelInfo {
        directory,
        width,
        height,
        tile_width,
        tile_height,
        tiles_x: width.div_ceil(tile_width as u64),
        tiles_y: height.div_ceil(tile_height as u64),
        downsample: 1.0,
    })
}

/// Identify the slide by the geometry of its smallest level.
fn hash_level(hash: &mut QuickHash, level: &LevelInfo) {
    hash.update(&(level.directory as u64).to_le_bytes());
    hash.update(&level.width.to_le_bytes());
    hash.update(&level.height.to_le_bytes());
    hash.update(&level.tile_width.to_le_bytes());
    hash.update(&level.tile_height.to_le_bytes());
}
