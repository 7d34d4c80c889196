//! Rewrite of provisional tags into final component ids

use crate::partition::RowPartition;
use crate::reduce::ClassMap;
use rayon::prelude::*;

/// Replace every nonzero cell of the 16-bit buffer `tags` by its class.
///
/// Bands are rewritten in parallel; cells are independent.
pub(crate) fn retag_bands(tags: &mut [u8], row_bytes: usize, plan: &RowPartition, classes: &ClassMap) {
    tags.par_chunks_mut(plan.band_bytes(row_bytes))
        .for_each(|band| {
            for cell in band.chunks_exact_mut(2) {
                let tag = u16::from_be_bytes([cell[0], cell[1]]);
                if tag != 0 {
                    // class ids never exceed the tag they replace
                    let class = classes.class_of(u32::from(tag)) as u16;
                    cell.copy_from_slice(&class.to_be_bytes());
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disjoint_set::DisjointSet;

    #[test]
    fn test_retag_rewrites_every_band() {
        let mut table = DisjointSet::new(8);
        for _ in 0..4 {
            table.allocate().unwrap();
        }
        table.union(1, 4);
        let classes = ClassMap::from_table(&table);

        let cells: [u16; 6] = [1, 0, 2, 3, 4, 0];
        let mut tags: Vec<u8> = cells.iter().flat_map(|c| c.to_be_bytes()).collect();
        let plan = RowPartition::new(3, 3);
        retag_bands(&mut tags, 4, &plan, &classes);

        let out: Vec<u16> = tags
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(out, vec![1, 0, 2, 3, 1, 0]);
    }
}
