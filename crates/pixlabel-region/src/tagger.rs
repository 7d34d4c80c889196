//! First pass: provisional tags
//!
//! Each worker scans its own row band in row-major order. A foreground pixel
//! takes the smallest tag among its already visited neighbors, or a fresh tag
//! when none is tagged, and every other tagged neighbor is recorded as
//! equivalent. The first row of a band has no northern neighbors; those
//! seams are repaired by [`crate::stitch`].

use crate::disjoint_set::SharedDisjointSet;
use crate::error::RegionResult;
use crate::options::ConnectivityType;
use crate::partition::RowPartition;
use pixlabel_core::raster::{get_data_bit, get_data_two_bytes, set_data_two_bytes};
use pixlabel_core::Raster;
use rayon::prelude::*;
use std::ops::Range;
use tracing::trace;

/// Tag every band of `tags` in parallel.
///
/// `tags` is the raw buffer of a 16-bit raster with the dimensions of
/// `source`; every cell is overwritten.
pub(crate) fn tag_bands(
    source: &Raster,
    tags: &mut [u8],
    plan: &RowPartition,
    connectivity: ConnectivityType,
    background: u32,
    table: &SharedDisjointSet,
) -> RegionResult<()> {
    let row_bytes = 2 * source.width() as usize;
    tags.par_chunks_mut(plan.band_bytes(row_bytes))
        .enumerate()
        .try_for_each(|(index, band)| {
            let rows = plan.band(index);
            trace!(band = index, start = rows.start, end = rows.end, "tagging band");
            tag_band(source, band, rows, connectivity, background, table)
        })
}

fn tag_band(
    source: &Raster,
    band: &mut [u8],
    rows: Range<u32>,
    connectivity: ConnectivityType,
    background: u32,
    table: &SharedDisjointSet,
) -> RegionResult<()> {
    let width = source.width();
    let row_bytes = 2 * width as usize;
    let eight = connectivity == ConnectivityType::EightWay;

    for (local, y) in rows.enumerate() {
        let (done, rest) = band.split_at_mut(local * row_bytes);
        let line = &mut rest[..row_bytes];
        let north = local.checked_sub(1).map(|prev| &done[prev * row_bytes..]);
        let src = source.row_data(y);

        for x in 0..width {
            if get_data_bit(src, x) == background {
                set_data_two_bytes(line, x, 0);
                continue;
            }

            let mut neighbors = [0u32; 4];
            if x > 0 {
                neighbors[0] = u32::from(get_data_two_bytes(line, x - 1));
            }
            if let Some(north) = north {
                neighbors[1] = u32::from(get_data_two_bytes(north, x));
                if eight {
                    if x > 0 {
                        neighbors[2] = u32::from(get_data_two_bytes(north, x - 1));
                    }
                    if x + 1 < width {
                        neighbors[3] = u32::from(get_data_two_bytes(north, x + 1));
                    }
                }
            }

            let tag = match neighbors.iter().copied().filter(|&t| t != 0).min() {
                Some(tag) => {
                    let mut others = [0u32; 3];
                    let mut count = 0;
                    for t in neighbors {
                        if t != 0 && t != tag && !others[..count].contains(&t) {
                            others[count] = t;
                            count += 1;
                        }
                    }
                    if count > 0 {
                        table.union_all(tag, &others[..count]);
                    }
                    tag
                }
                None => table.allocate()?,
            };
            // tags never exceed the table capacity, itself at most u16::MAX
            set_data_two_bytes(line, x, tag as u16);
        }
    }
    Ok(())
}
