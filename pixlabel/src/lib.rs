//! pixlabel - Parallel connected-component labeling for binary images
//!
//! Reads a NetPBM bitmap, labels its 4- or 8-connected foreground regions on
//! a pool of worker threads and reports the size and extent of each region.
//!
//! - [`Raster`] / [`RasterMut`] - Raster containers, re-exported at the root
//! - [`io`] - NetPBM reading and writing
//! - [`region`] - The labeling engine
//! - [`cli`] - The `pixlabel` command
//!
//! # Example
//!
//! ```
//! use pixlabel::region::{LabelOptions, label_connected_components};
//!
//! let source = pixlabel::io::read_pnm(&b"P1\n4 2\n1 1 0 1\n0 0 0 1\n"[..]).unwrap();
//! let (_, report) = label_connected_components(&source, &LabelOptions::default()).unwrap();
//! assert_eq!(report.num_components(), 2);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use pixlabel_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use pixlabel_io as io;
pub use pixlabel_region as region;

pub mod cli;
pub mod logging;
