//! Labeling configuration

use crate::error::{RegionError, RegionResult};
use pixlabel_core::Raster;

/// Capacity of the equivalence table: the largest tag a 16-bit tag raster
/// can hold.
pub const MAX_TAGS: u32 = u16::MAX as u32;

/// Connectivity type for component analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityType {
    /// 4-way connectivity (up, down, left, right)
    #[default]
    FourWay,
    /// 8-way connectivity (includes diagonals)
    EightWay,
}

/// How the background sample of a bitmap is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundRule {
    /// Clear bits are background, set bits are foreground
    #[default]
    Zero,
    /// The sample at (0, 0) is background, whatever its value
    TopLeft,
}

impl BackgroundRule {
    /// The background sample of `source` under this rule.
    pub fn background_of(self, source: &Raster) -> u32 {
        match self {
            BackgroundRule::Zero => 0,
            BackgroundRule::TopLeft => source.get_pixel(0, 0).unwrap_or(0),
        }
    }
}

/// Options for a labeling run
#[derive(Debug, Clone)]
pub struct LabelOptions {
    /// Connectivity type (4-way or 8-way)
    pub connectivity: ConnectivityType,
    /// Number of worker threads, and of row partitions
    pub workers: usize,
    /// Capacity of the equivalence table
    pub max_tags: u32,
    /// Background selection
    pub background: BackgroundRule,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            connectivity: ConnectivityType::FourWay,
            workers: 1,
            max_tags: MAX_TAGS,
            background: BackgroundRule::Zero,
        }
    }
}

impl LabelOptions {
    /// Create new options with the specified connectivity
    pub fn new(connectivity: ConnectivityType) -> Self {
        Self {
            connectivity,
            ..Self::default()
        }
    }

    /// Set the number of workers
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the equivalence table capacity
    pub fn with_max_tags(mut self, max_tags: u32) -> Self {
        self.max_tags = max_tags;
        self
    }

    /// Set the background rule
    pub fn with_background(mut self, background: BackgroundRule) -> Self {
        self.background = background;
        self
    }

    /// Reject settings no run could succeed with.
    pub fn validate(&self) -> RegionResult<()> {
        if self.workers == 0 {
            return Err(RegionError::InvalidParameters(
                "at least one worker is required".to_string(),
            ));
        }
        if self.max_tags == 0 || self.max_tags > MAX_TAGS {
            return Err(RegionError::InvalidParameters(format!(
                "max_tags must be in 1..={MAX_TAGS}, got {}",
                self.max_tags
            )));
        }
        Ok(())
    }
}
