//! Error types for pixlabel-region

use thiserror::Error;

/// Errors that can occur during connected-component labeling
#[derive(Debug, Error)]
pub enum RegionError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] pixlabel_core::Error),

    /// A raster has the wrong pixel format for this operation
    #[error("unsupported format: expected {expected}, got {actual}")]
    UnsupportedFormat {
        expected: &'static str,
        actual: &'static str,
    },

    /// Source and tag rasters differ in size
    #[error("dimension mismatch: expected {}x{}, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// More provisional tags were needed than the table can hold
    #[error("tag capacity exceeded: the image needs more than {capacity} provisional tags")]
    CapacityExceeded { capacity: u32 },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The worker pool could not be started
    #[error("worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type for region operations
pub type RegionResult<T> = Result<T, RegionError>;
