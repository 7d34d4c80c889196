//! Labeling pipeline
//!
//! [`label_components`] runs the five stages on a pool of `workers` threads:
//!
//! 1. tag: provisional tags and equivalences, one row band per worker
//! 2. stitch: equivalences across band seams
//! 3. reduce: consecutive component ids (sequential)
//! 4. retag: final ids written into the tag raster
//! 5. analyze: pixel counts and bounding boxes
//!
//! Each stage is a fork/join on the pool; the join is the barrier before the
//! next stage. All stages share one [`RowPartition`], so the result does not
//! depend on the worker count beyond the numbering order.

use crate::analyze::analyze_bands;
use crate::conncomp::Component;
use crate::disjoint_set::SharedDisjointSet;
use crate::error::{RegionError, RegionResult};
use crate::options::LabelOptions;
use crate::partition::RowPartition;
use crate::reduce::ClassMap;
use crate::retag::retag_bands;
use crate::stitch::stitch_seams;
use crate::tagger::tag_bands;
use pixlabel_core::{PixelFormat, Raster, RasterMut};
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Wall-clock time spent in each stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTimings {
    /// Provisional tagging of every band
    pub tag: Duration,
    /// Merging tags across band seams
    pub stitch: Duration,
    /// Numbering the classes
    pub reduce: Duration,
    /// Rewriting tags as component ids
    pub retag: Duration,
    /// Gathering pixel counts and bounds
    pub analyze: Duration,
}

impl StageTimings {
    /// Sum of all stages.
    pub fn total(&self) -> Duration {
        self.tag + self.stitch + self.reduce + self.retag + self.analyze
    }
}

/// Outcome of a labeling run
#[derive(Debug, Clone)]
pub struct LabelReport {
    /// One entry per component, component `id` at index `id - 1`
    pub components: Vec<Component>,
    /// Provisional tags allocated by the first pass
    pub num_tags: u32,
    /// Per-stage wall-clock times
    pub timings: StageTimings,
}

impl LabelReport {
    /// Number of components found.
    pub fn num_components(&self) -> u32 {
        self.components.len() as u32
    }

    /// The component with the most pixels; the lowest id wins ties.
    pub fn largest(&self) -> Option<&Component> {
        self.components.iter().max_by(|a, b| {
            a.pixel_count
                .cmp(&b.pixel_count)
                .then_with(|| b.id.cmp(&a.id))
        })
    }

    /// Foreground pixels over all components.
    pub fn total_pixels(&self) -> u64 {
        self.components.iter().map(|c| c.pixel_count).sum()
    }

    /// Look up a component by id.
    pub fn component(&self, id: u32) -> Option<&Component> {
        id.checked_sub(1)
            .and_then(|index| self.components.get(index as usize))
    }
}

/// Label the connected foreground regions of `source` into `tags`.
///
/// `tags` must be a `Gray16` raster of the same size as the `Bitmap`
/// `source`. Its previous contents are ignored; on success every
/// foreground pixel holds its component id in `1..=num_components` and
/// every background pixel holds 0.
///
/// # Errors
///
/// - [`RegionError::InvalidParameters`] for invalid `options`
/// - [`RegionError::UnsupportedFormat`] for a non-bitmap source or a
///   non-16-bit tag raster
/// - [`RegionError::DimensionMismatch`] if the sizes differ
/// - [`RegionError::CapacityExceeded`] if the image needs more than
///   `options.max_tags` provisional tags; `tags` is then left partially
///   written
///
/// # Examples
///
/// ```
/// use pixlabel_core::{PixelFormat, Raster, RasterMut};
/// use pixlabel_region::{LabelOptions, label_components};
///
/// let mut source = RasterMut::new(4, 4, PixelFormat::Bitmap).unwrap();
/// source.set_pixel(0, 0, 1).unwrap();
/// source.set_pixel(3, 3, 1).unwrap();
/// let source: Raster = source.into();
///
/// let mut tags = RasterMut::new(4, 4, PixelFormat::Gray16).unwrap();
/// let report = label_components(&source, &mut tags, &LabelOptions::default()).unwrap();
/// assert_eq!(report.num_components(), 2);
/// assert_eq!(tags.get_pixel(3, 3), Some(2));
/// ```
#[instrument(
    level = "debug",
    skip_all,
    fields(width = source.width(), height = source.height(), workers = options.workers)
)]
pub fn label_components(
    source: &Raster,
    tags: &mut RasterMut,
    options: &LabelOptions,
) -> RegionResult<LabelReport> {
    check_inputs(source, tags, options)?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .thread_name(|index| format!("pixlabel-{index}"))
        .build()?;

    pool.install(|| run_stages(source, tags, options))
}

fn check_inputs(source: &Raster, tags: &RasterMut, options: &LabelOptions) -> RegionResult<()> {
    options.validate()?;
    if source.format() != PixelFormat::Bitmap {
        return Err(RegionError::UnsupportedFormat {
            expected: PixelFormat::Bitmap.name(),
            actual: source.format().name(),
        });
    }
    if tags.format() != PixelFormat::Gray16 {
        return Err(RegionError::UnsupportedFormat {
            expected: PixelFormat::Gray16.name(),
            actual: tags.format().name(),
        });
    }
    if source.width() != tags.width() || source.height() != tags.height() {
        return Err(RegionError::DimensionMismatch {
            expected: (source.width(), source.height()),
            actual: (tags.width(), tags.height()),
        });
    }
    Ok(())
}

fn run_stages(
    source: &Raster,
    tags: &mut RasterMut,
    options: &LabelOptions,
) -> RegionResult<LabelReport> {
    let width = source.width();
    let row_bytes = tags.row_bytes();
    let plan = RowPartition::new(source.height(), options.workers);
    let background = options.background.background_of(source);
    let table = SharedDisjointSet::new(options.max_tags);
    let mut timings = StageTimings::default();
    debug!(bands = plan.len(), background, "labeling");

    let started = Instant::now();
    tag_bands(
        source,
        tags.data_mut(),
        &plan,
        options.connectivity,
        background,
        &table,
    )?;
    timings.tag = started.elapsed();

    let started = Instant::now();
    stitch_seams(tags.data(), width, &plan, options.connectivity, &table);
    timings.stitch = started.elapsed();

    let started = Instant::now();
    let table = table.into_inner();
    debug_assert!(table.check_invariant());
    let classes = ClassMap::from_table(&table);
    timings.reduce = started.elapsed();
    debug!(
        num_tags = table.num_tags(),
        num_components = classes.num_components(),
        "reduced equivalences"
    );

    let started = Instant::now();
    retag_bands(tags.data_mut(), row_bytes, &plan, &classes);
    timings.retag = started.elapsed();

    let started = Instant::now();
    let components = analyze_bands(tags.data(), width, &plan, classes.num_components())?;
    timings.analyze = started.elapsed();

    debug!(
        tag_us = timings.tag.as_micros() as u64,
        stitch_us = timings.stitch.as_micros() as u64,
        reduce_us = timings.reduce.as_micros() as u64,
        retag_us = timings.retag.as_micros() as u64,
        analyze_us = timings.analyze.as_micros() as u64,
        "stage timings"
    );

    Ok(LabelReport {
        components,
        num_tags: table.num_tags(),
        timings,
    })
}

/// Label `source` into a freshly allocated tag raster.
///
/// Returns the labeled `Gray16` raster and the run report.
pub fn label_connected_components(
    source: &Raster,
    options: &LabelOptions,
) -> RegionResult<(Raster, LabelReport)> {
    let mut tags = RasterMut::new(source.width(), source.height(), PixelFormat::Gray16)?;
    let report = label_components(source, &mut tags, options)?;
    Ok((tags.into(), report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{BackgroundRule, ConnectivityType};
    use pixlabel_core::BoundingBox;
    use pixlabel_test::bitmap_from_rows;

    #[test]
    fn test_two_corner_dots() {
        let source = bitmap_from_rows(&["#...", "....", "....", "...#"]).unwrap();
        let (labeled, report) =
            label_connected_components(&source, &LabelOptions::default()).unwrap();
        assert_eq!(report.num_components(), 2);
        assert_eq!(report.num_tags, 2);
        for comp in &report.components {
            assert_eq!(comp.pixel_count, 1);
            assert_eq!(comp.bounds.width(), 1);
            assert_eq!(comp.bounds.height(), 1);
        }
        assert_eq!(labeled.get_pixel(0, 0), Some(1));
        assert_eq!(labeled.get_pixel(3, 3), Some(2));
        assert_eq!(labeled.get_pixel(1, 1), Some(0));
    }

    #[test]
    fn test_all_foreground() {
        let source = bitmap_from_rows(&["#####", "#####", "#####"]).unwrap();
        for workers in 1..=4 {
            let options = LabelOptions::default().with_workers(workers);
            let (_, report) = label_connected_components(&source, &options).unwrap();
            assert_eq!(report.num_components(), 1);
            assert_eq!(report.components[0].pixel_count, 15);
            assert_eq!(report.components[0].bounds, BoundingBox::new(0, 0, 4, 2));
        }
    }

    #[test]
    fn test_top_left_background() {
        // (0, 0) is set, so the clear pixels are the foreground
        let source = bitmap_from_rows(&["##.", "###", ".##"]).unwrap();
        let options = LabelOptions::default().with_background(BackgroundRule::TopLeft);
        let (labeled, report) = label_connected_components(&source, &options).unwrap();
        assert_eq!(report.num_components(), 2);
        assert_eq!(report.total_pixels(), 2);
        assert_eq!(labeled.get_pixel(2, 0), Some(1));
        assert_eq!(labeled.get_pixel(0, 2), Some(2));
    }

    #[test]
    fn test_largest_prefers_lowest_id() {
        let source = bitmap_from_rows(&["##.##", ".....", "###.."]).unwrap();
        let (_, report) = label_connected_components(&source, &LabelOptions::default()).unwrap();
        assert_eq!(report.largest().map(|c| c.id), Some(3));

        let source = bitmap_from_rows(&["##.##"]).unwrap();
        let (_, report) = label_connected_components(&source, &LabelOptions::default()).unwrap();
        assert_eq!(report.largest().map(|c| c.id), Some(1));
        assert_eq!(report.component(2).map(|c| c.pixel_count), Some(2));
        assert!(report.component(0).is_none());
    }

    #[test]
    fn test_no_foreground() {
        let source = bitmap_from_rows(&["...", "..."]).unwrap();
        let (_, report) = label_connected_components(&source, &LabelOptions::default()).unwrap();
        assert_eq!(report.num_components(), 0);
        assert!(report.largest().is_none());
    }

    #[test]
    fn test_preconditions() {
        let source = bitmap_from_rows(&["#."]).unwrap();
        let mut small = RasterMut::new(1, 1, PixelFormat::Gray16).unwrap();
        assert!(matches!(
            label_components(&source, &mut small, &LabelOptions::default()),
            Err(RegionError::DimensionMismatch { .. })
        ));

        let mut wrong = RasterMut::new(2, 1, PixelFormat::Gray8).unwrap();
        assert!(matches!(
            label_components(&source, &mut wrong, &LabelOptions::default()),
            Err(RegionError::UnsupportedFormat { .. })
        ));

        let gray = Raster::new(2, 1, PixelFormat::Gray8).unwrap();
        let mut tags = RasterMut::new(2, 1, PixelFormat::Gray16).unwrap();
        assert!(matches!(
            label_components(&gray, &mut tags, &LabelOptions::default()),
            Err(RegionError::UnsupportedFormat { .. })
        ));

        let options = LabelOptions::new(ConnectivityType::EightWay).with_workers(0);
        assert!(matches!(
            label_components(&source, &mut tags, &options),
            Err(RegionError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_capacity_exceeded() {
        let source = bitmap_from_rows(&["#.#.#", ".....", "#.#.#"]).unwrap();
        let options = LabelOptions::default().with_max_tags(5);
        assert!(matches!(
            label_connected_components(&source, &options),
            Err(RegionError::CapacityExceeded { capacity: 5 })
        ));
        let options = LabelOptions::default().with_max_tags(6);
        assert!(label_connected_components(&source, &options).is_ok());
    }
}
