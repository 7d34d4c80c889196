//! Seam repair between row bands
//!
//! Runs after every tagger worker has finished, so the rows on both sides of
//! each seam are final. Seams are independent of each other and are
//! processed in parallel; each seam records its unions in one critical
//! section.

use crate::disjoint_set::SharedDisjointSet;
use crate::options::ConnectivityType;
use crate::partition::RowPartition;
use pixlabel_core::raster::get_data_two_bytes;
use rayon::prelude::*;
use tracing::trace;

/// Union the tags on both sides of every seam in `plan`.
///
/// `tags` is the raw buffer of a 16-bit raster `width` cells wide.
pub(crate) fn stitch_seams(
    tags: &[u8],
    width: u32,
    plan: &RowPartition,
    connectivity: ConnectivityType,
    table: &SharedDisjointSet,
) {
    let row_bytes = 2 * width as usize;
    plan.seams().into_par_iter().for_each(|y0| {
        let start = y0 as usize * row_bytes;
        let above = &tags[start - row_bytes..start];
        let below = &tags[start..start + row_bytes];
        let pairs = seam_pairs(above, below, width, connectivity);
        trace!(seam = y0, unions = pairs.len(), "stitching seam");
        table.union_pairs(&pairs);
    });
}

/// Tag pairs that touch across the boundary between `above` and `below`.
fn seam_pairs(
    above: &[u8],
    below: &[u8],
    width: u32,
    connectivity: ConnectivityType,
) -> Vec<(u32, u32)> {
    let mut pairs = Vec::new();
    for x in 0..width {
        let tag = u32::from(get_data_two_bytes(below, x));
        if tag == 0 {
            continue;
        }
        let reach = match connectivity {
            ConnectivityType::FourWay => x..=x,
            ConnectivityType::EightWay => x.saturating_sub(1)..=(x + 1).min(width - 1),
        };
        for nx in reach {
            let other = u32::from(get_data_two_bytes(above, nx));
            if other != 0 && other != tag && pairs.last() != Some(&(tag, other)) {
                pairs.push((tag, other));
            }
        }
    }
    pairs
}
