//! Slide format parsing.
//!
//! - [`tiff`]: TIFF/BigTIFF headers, IFDs and tag values
//! - [`ventana`]: Ventana slide recognition on top of a [`Container`](crate::container::Container)

pub mod tiff;
pub mod ventana;
