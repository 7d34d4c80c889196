//! pixlabel-core - Raster containers for connected-component labeling
//!
//! This crate provides the data structures shared by every pixlabel crate:
//!
//! - [`Raster`] / [`RasterMut`] - The image container (immutable / mutable)
//! - [`PixelFormat`] - The closed set of sample layouts
//! - [`BoundingBox`] - Inclusive pixel rectangles
//!
//! Binary source images are `Bitmap` rasters; tag rasters produced by the
//! labeling engine are `Gray16` rasters of the same size.

pub mod bbox;
pub mod error;
pub mod raster;

pub use bbox::BoundingBox;
pub use error::{Error, Result};
pub use raster::{MAX_DIMENSION, PixelFormat, Raster, RasterMut};
