//! BoundingBox - Inclusive pixel rectangle
//!
//! Corners are stored as inclusive pixel coordinates `(x1, y1)` (upper-left)
//! and `(x2, y2)` (lower-right), the form the component analyzer folds into.

/// Inclusive axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    /// Leftmost column
    pub x1: u32,
    /// Topmost row
    pub y1: u32,
    /// Rightmost column
    pub x2: u32,
    /// Bottom row
    pub y2: u32,
}

impl BoundingBox {
    /// Fold identity: folding any pixel into it yields that pixel's 1x1 box.
    pub const EMPTY: BoundingBox = BoundingBox {
        x1: u32::MAX,
        y1: u32::MAX,
        x2: 0,
        y2: 0,
    };

    /// Create a box from inclusive corners.
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box covering a single pixel.
    pub fn from_point(x: u32, y: u32) -> Self {
        Self::new(x, y, x, y)
    }

    /// True until at least one pixel has been folded in.
    pub fn is_empty(&self) -> bool {
        self.x1 > self.x2 || self.y1 > self.y2
    }

    /// Width in pixels (0 for an empty box).
    pub fn width(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            self.x2 - self.x1 + 1
        }
    }

    /// Height in pixels (0 for an empty box).
    pub fn height(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            self.y2 - self.y1 + 1
        }
    }

    /// Number of pixels covered.
    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// Check whether (x, y) lies inside the box.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    /// Grow the box to include (x, y).
    #[inline]
    pub fn extend(&mut self, x: u32, y: u32) {
        self.x1 = self.x1.min(x);
        self.y1 = self.y1.min(y);
        self.x2 = self.x2.max(x);
        self.y2 = self.y2.max(y);
    }

    /// Grow the box to include another box.
    pub fn merge(&mut self, other: &BoundingBox) {
        self.x1 = self.x1.min(other.x1);
        self.y1 = self.y1.min(other.y1);
        self.x2 = self.x2.max(other.x2);
        self.y2 = self.y2.max(other.y2);
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}
