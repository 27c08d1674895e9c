//! Slide-level state filled in by format recognition.
//!
//! Recognition writes into caller-owned sinks and hands the pyramid to a
//! tiled backend:
//!
//! ```text
//! ┌──────────────────────┐
//! │     RangeReader      │  local file, S3
//! └──────────┬───────────┘
//!            ▼
//! ┌──────────────────────┐
//! │  DirectoryContainer  │  one snapshot per IFD
//! └──────────┬───────────┘
//!            ▼
//! ┌──────────────────────┐      ┌───────────────────────────────┐
//! │     try_ventana      │ ───▶ │ PropertyMap, AssociatedImages │
//! └──────────┬───────────┘      └───────────────────────────────┘
//!            ▼
//! ┌──────────────────────┐
//! │ TiledBackend          │  PyramidLayout + QuickHash
//! └──────────────────────┘
//! ```
//!
//! [`VentanaSlide`] runs the whole chain for a byte source.

mod associated;
mod backend;
mod hash;
mod properties;

pub use associated::{register_associated_image, AssociatedImage, AssociatedImages};
pub use backend::{LevelInfo, PyramidLayout, TiledBackend};
pub use hash::QuickHash;
pub use properties::{
    duplicate_double_property, duplicate_int_property, PropertyMap, PROPERTY_NAME_MPP_X,
    PROPERTY_NAME_MPP_Y, PROPERTY_NAME_OBJECTIVE_POWER, PROPERTY_NAME_VENDOR,
};

use serde::Serialize;
use tracing::debug;

use crate::container::DirectoryContainer;
use crate::error::SlideError;
use crate::format::ventana::try_ventana;
use crate::io::RangeReader;

/// A recognized Ventana slide.
#[derive(Debug, Clone, Serialize)]
pub struct VentanaSlide {
    /// Where the slide was read from
    pub source: String,

    pub properties: PropertyMap,
    pub associated_images: AssociatedImages,

    /// Pyramid levels, base level first
    pub layout: PyramidLayout,

    /// Hex quickhash identifying the slide
    pub quickhash: String,
}

impl VentanaSlide {
    /// Open a slide, collecting its properties, associated images and
    /// pyramid layout.
    ///
    /// # Errors
    ///
    /// See [`try_ventana`]; a source that is not a TIFF at all fails with a
    /// [`SlideError::Tiff`] classified as `FormatNotSupported`.
    pub async fn open<R: RangeReader>(reader: &R) -> Result<Self, SlideError> {
        let mut container = DirectoryContainer::open(reader).await?;
        debug!(
            "{}: {} directories",
            container.identifier(),
            container.directory_count()
        );

        let mut properties = PropertyMap::new();
        let mut associated_images = AssociatedImages::new();
        let mut quickhash = QuickHash::new();
        let mut layout = PyramidLayout::new();

        try_ventana(
            &mut container,
            Some(&mut properties),
            Some(&mut associated_images),
            Some(&mut quickhash),
            &mut layout,
        )?;

        Ok(Self {
            source: reader.identifier().to_string(),
            properties,
            associated_images,
            layout,
            quickhash: quickhash.hex_digest(),
        })
    }

    /// Check whether `reader` holds a Ventana slide without collecting
    /// anything. Returns the pyramid directories, base level first.
    pub async fn detect<R: RangeReader>(reader: &R) -> Result<Vec<usize>, SlideError> {
        let mut container = DirectoryContainer::open(reader).await?;
        try_ventana(&mut container, None, None, None, &mut PyramidLayout::new())
    }
}
