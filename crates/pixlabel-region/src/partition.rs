//! Row partitioning shared by every parallel stage
//!
//! The image is cut into contiguous bands of equal height (the last band may
//! be shorter). The tagger, stitcher, retagger and analyzer all use the same
//! plan, so the seams the stitcher repairs are exactly the band starts the
//! tagger treated as having no northern neighbors.

use std::ops::Range;

/// Contiguous row bands covering `0..height`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowPartition {
    height: u32,
    rows_per_band: u32,
}

impl RowPartition {
    /// Split `height` rows among at most `workers` bands.
    ///
    /// Fewer bands are produced when there are fewer rows than workers, or
    /// when rounding band heights up leaves the last workers without rows.
    pub fn new(height: u32, workers: usize) -> Self {
        let workers = (workers.max(1) as u64).min(u64::from(height.max(1))) as u32;
        Self {
            height,
            rows_per_band: height.div_ceil(workers).max(1),
        }
    }

    /// Rows in every band but possibly the last.
    pub fn rows_per_band(&self) -> u32 {
        self.rows_per_band
    }

    /// Number of bands.
    pub fn len(&self) -> usize {
        self.height.div_ceil(self.rows_per_band) as usize
    }

    /// True for an empty image.
    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    /// Row range of band `index`.
    pub fn band(&self, index: usize) -> Range<u32> {
        let start = (index as u32).saturating_mul(self.rows_per_band).min(self.height);
        let end = start.saturating_add(self.rows_per_band).min(self.height);
        start..end
    }

    /// All bands in order.
    pub fn bands(&self) -> impl Iterator<Item = Range<u32>> + '_ {
        (0..self.len()).map(move |i| self.band(i))
    }

    /// First row of every band except the first.
    pub fn seams(&self) -> Vec<u32> {
        self.bands().skip(1).map(|band| band.start).collect()
    }

    /// Byte length of a full band in a raster with `row_bytes` per row.
    pub fn band_bytes(&self, row_bytes: usize) -> usize {
        self.rows_per_band as usize * row_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(10, 1, vec![0..10])]
    #[case(10, 4, vec![0..3, 3..6, 6..9, 9..10])]
    #[case(9, 4, vec![0..3, 3..6, 6..9])]
    #[case(3, 8, vec![0..1, 1..2, 2..3])]
    #[case(1, 4, vec![0..1])]
    fn test_bands(#[case] height: u32, #[case] workers: usize, #[case] expected: Vec<Range<u32>>) {
        let plan = RowPartition::new(height, workers);
        assert_eq!(plan.bands().collect::<Vec<_>>(), expected);
        assert_eq!(plan.len(), expected.len());
    }

    #[test]
    fn test_seams() {
        let plan = RowPartition::new(10, 4);
        assert_eq!(plan.seams(), vec![3, 6, 9]);
        assert!(RowPartition::new(10, 1).seams().is_empty());
    }

    #[test]
    fn test_band_bytes_match_chunks() {
        let plan = RowPartition::new(10, 4);
        let data = vec![0u8; 10 * 6];
        let chunks: Vec<usize> = data.chunks(plan.band_bytes(6)).map(|c| c.len()).collect();
        let bands: Vec<usize> = plan.bands().map(|b| b.len() * 6).collect();
        assert_eq!(chunks, bands);
    }
}
