//! Connected component analysis
//!
//! The [`Component`] record and convenience entry points built on
//! [`label_components`](crate::label_components).

use crate::error::{RegionError, RegionResult};
use crate::label::label_connected_components;
use crate::options::{ConnectivityType, LabelOptions};
use pixlabel_core::raster::get_data_two_bytes;
use pixlabel_core::{BoundingBox, PixelFormat, Raster, RasterMut};
use std::num::NonZeroUsize;

/// A connected component in an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    /// Final component id, as stored in the tag raster
    pub id: u32,
    /// Number of pixels in this component
    pub pixel_count: u64,
    /// Inclusive bounding box of this component
    pub bounds: BoundingBox,
}

impl Component {
    /// Create a new connected component
    pub fn new(id: u32, pixel_count: u64, bounds: BoundingBox) -> Self {
        Self {
            id,
            pixel_count,
            bounds,
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

/// Find all connected components in a binary image
///
/// Set pixels are foreground. Runs on one worker per available core.
pub fn find_connected_components(
    source: &Raster,
    connectivity: ConnectivityType,
) -> RegionResult<Vec<Component>> {
    let options = LabelOptions::new(connectivity).with_workers(default_workers());
    let (_, report) = label_connected_components(source, &options)?;
    Ok(report.components)
}

/// Count the connected components of a binary image
pub fn count_components(source: &Raster, connectivity: ConnectivityType) -> RegionResult<u32> {
    Ok(find_connected_components(source, connectivity)?.len() as u32)
}

/// Rebuild a bitmap from a labeled raster: labeled pixels become set bits.
pub fn foreground_mask(labeled: &Raster) -> RegionResult<Raster> {
    if labeled.format() != PixelFormat::Gray16 {
        return Err(RegionError::UnsupportedFormat {
            expected: PixelFormat::Gray16.name(),
            actual: labeled.format().name(),
        });
    }
    let mut mask = RasterMut::new(labeled.width(), labeled.height(), PixelFormat::Bitmap)?;
    for y in 0..labeled.height() {
        let line = labeled.row_data(y);
        for x in 0..labeled.width() {
            if get_data_two_bytes(line, x) != 0 {
                mask.set_pixel_unchecked(x, y, 1);
            }
        }
    }
    Ok(mask.into())
}
