//! pixlabel-region - Connected-component labeling
//!
//! This crate labels the foreground regions of binary rasters with a
//! two-pass algorithm that runs on a pool of worker threads:
//!
//! - [`DisjointSet`] - Equivalence table over provisional tags
//! - [`RowPartition`] - The row bands every parallel stage shares
//! - [`label_components`] - The full pipeline into a caller-supplied tag raster
//! - [`ClassMap`] - Provisional tag to final id mapping
//! - [`component_stats`] - Pixel counts and bounding boxes of a labeled raster
//!
//! # Example
//!
//! ```
//! use pixlabel_core::{PixelFormat, Raster, RasterMut};
//! use pixlabel_region::{ConnectivityType, LabelOptions, label_connected_components};
//!
//! let mut source = RasterMut::new(5, 3, PixelFormat::Bitmap).unwrap();
//! for y in 0..3 {
//!     for x in 0..5 {
//!         source.set_pixel(x, y, 1).unwrap();
//!     }
//! }
//! let source: Raster = source.into();
//! let options = LabelOptions::new(ConnectivityType::EightWay).with_workers(2);
//! let (_, report) = label_connected_components(&source, &options).unwrap();
//!
//! assert_eq!(report.num_components(), 1);
//! assert_eq!(report.components[0].pixel_count, 15);
//! ```

mod analyze;
pub mod conncomp;
pub mod disjoint_set;
pub mod error;
pub mod label;
pub mod options;
pub mod partition;
pub mod reduce;
mod retag;
mod stitch;
mod tagger;

pub use analyze::component_stats;
pub use conncomp::{Component, count_components, find_connected_components, foreground_mask};
pub use disjoint_set::{DisjointSet, SharedDisjointSet};
pub use error::{RegionError, RegionResult};
pub use label::{LabelReport, StageTimings, label_components, label_connected_components};
pub use options::{BackgroundRule, ConnectivityType, LabelOptions, MAX_TAGS};
pub use partition::RowPartition;
pub use reduce::ClassMap;
