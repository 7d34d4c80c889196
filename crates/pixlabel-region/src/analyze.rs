//! Per-component statistics
//!
//! Each band is tallied on its own, then merged into the shared result.
//! The shared result holds one lock per component, so bands that touch
//! different components never contend.

use crate::conncomp::Component;
use crate::error::{RegionError, RegionResult};
use crate::partition::RowPartition;
use pixlabel_core::raster::get_data_two_bytes;
use pixlabel_core::{BoundingBox, PixelFormat, Raster};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy)]
struct Tally {
    count: u64,
    bounds: BoundingBox,
}

impl Default for Tally {
    fn default() -> Self {
        Self {
            count: 0,
            bounds: BoundingBox::EMPTY,
        }
    }
}

impl Tally {
    fn add(&mut self, x: u32, y: u32) {
        self.count += 1;
        self.bounds.extend(x, y);
    }

    fn merge(&mut self, other: &Tally) {
        self.count += other.count;
        self.bounds.merge(&other.bounds);
    }
}

/// Tally the labels `1..=num_components` of a 16-bit buffer.
///
/// Component `id` ends up at index `id - 1`. A component that has no pixel
/// keeps a zero count and an empty box.
///
/// # Errors
///
/// Returns [`RegionError::InvalidParameters`] for a label above
/// `num_components`.
pub(crate) fn analyze_bands(
    tags: &[u8],
    width: u32,
    plan: &RowPartition,
    num_components: u32,
) -> RegionResult<Vec<Component>> {
    let row_bytes = 2 * width as usize;
    let shared: Vec<Mutex<Tally>> = (0..num_components)
        .map(|_| Mutex::new(Tally::default()))
        .collect();

    tags.par_chunks(plan.band_bytes(row_bytes))
        .enumerate()
        .try_for_each(|(index, band)| -> RegionResult<()> {
            let start = plan.band(index).start;
            let local = tally_band(band, width, start, num_components)?;
            for (id, tally) in local {
                let mut slot = shared[id as usize - 1]
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                slot.merge(&tally);
            }
            Ok(())
        })?;

    Ok(shared
        .into_iter()
        .zip(1..)
        .map(|(slot, id)| {
            let tally = slot.into_inner().unwrap_or_else(PoisonError::into_inner);
            Component::new(id, tally.count, tally.bounds)
        })
        .collect())
}

fn tally_band(
    band: &[u8],
    width: u32,
    start: u32,
    num_components: u32,
) -> RegionResult<HashMap<u32, Tally>> {
    let row_bytes = 2 * width as usize;
    let mut local: HashMap<u32, Tally> = HashMap::new();
    for (y, line) in (start..).zip(band.chunks_exact(row_bytes)) {
        for x in 0..width {
            let id = u32::from(get_data_two_bytes(line, x));
            if id == 0 {
                continue;
            }
            if id > num_components {
                return Err(RegionError::InvalidParameters(format!(
                    "label {id} at ({x}, {y}) exceeds the component count {num_components}"
                )));
            }
            local.entry(id).or_default().add(x, y);
        }
    }
    Ok(local)
}

/// Compute per-component statistics of an already labeled raster.
///
/// The component count is taken as the largest label present, so labels
/// must be consecutive for every entry to be populated.
///
/// # Errors
///
/// Returns [`RegionError::UnsupportedFormat`] unless `labeled` is a 16-bit
/// raster.
pub fn component_stats(labeled: &Raster) -> RegionResult<Vec<Component>> {
    if labeled.format() != PixelFormat::Gray16 {
        return Err(RegionError::UnsupportedFormat {
            expected: PixelFormat::Gray16.name(),
            actual: labeled.format().name(),
        });
    }
    let num_components = labeled
        .data()
        .chunks_exact(2)
        .map(|c| u32::from(u16::from_be_bytes([c[0], c[1]])))
        .max()
        .unwrap_or(0);
    let plan = RowPartition::new(labeled.height(), rayon::current_num_threads());
    analyze_bands(labeled.data(), labeled.width(), &plan, num_components)
}
