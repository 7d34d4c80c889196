//! Raster - The main image container
//!
//! The `Raster` structure is the pixel grid every pixlabel stage reads from
//! and writes to. Its sample layout is fixed by the [`PixelFormat`] chosen at
//! construction, so per-pixel access never re-dispatches on a format tag
//! stored elsewhere.
//!
//! # Pixel layout
//!
//! - Image data is stored as bytes, rows back to back
//! - Bitmap rows are padded to a whole byte; pixels are packed MSB first
//! - Multi-byte samples (16-bit gray, float) are stored big-endian, which is
//!   also the NetPBM on-disk order
//! - Rgb888 stores three bytes per pixel, red first
//!
//! # Ownership model
//!
//! `Raster` uses `Arc` for cheap cloning (shared ownership).
//! To modify pixel data, convert to `RasterMut` via [`Raster::try_into_mut`]
//! or [`Raster::to_mut`], then convert back with `Into<Raster>`.

mod access;

pub use access::*;

use crate::error::{Error, Result};
use std::sync::Arc;

/// Largest accepted width or height.
pub const MAX_DIMENSION: u32 = 100_000;

/// Pixel sample format
///
/// The closed set of layouts a raster can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 1-bit black and white, 8 pixels per byte
    Bitmap,
    /// 8-bit grayscale
    Gray8,
    /// 16-bit grayscale; also used for tag rasters
    Gray16,
    /// 32-bit floating-point grayscale
    GrayFloat,
    /// 3 x 8-bit color
    Rgb888,
}

impl PixelFormat {
    /// Get the number of bits per pixel.
    pub fn bits(self) -> u32 {
        match self {
            PixelFormat::Bitmap => 1,
            PixelFormat::Gray8 => 8,
            PixelFormat::Gray16 => 16,
            PixelFormat::GrayFloat => 32,
            PixelFormat::Rgb888 => 24,
        }
    }

    /// Get the number of bytes a single sample occupies.
    ///
    /// Bitmap samples share bytes; this returns 1 for them, the size of the
    /// smallest addressable unit.
    pub fn byte_size(self) -> usize {
        self.bits().div_ceil(8) as usize
    }

    /// Get the largest integer sample value.
    ///
    /// For `GrayFloat` this is the largest raw bit pattern; for `Rgb888` it
    /// is `0xFFFFFF`.
    pub fn max_value(self) -> u32 {
        match self {
            PixelFormat::GrayFloat => u32::MAX,
            other => (1u32 << other.bits()) - 1,
        }
    }

    /// Get the number of bytes in one row of `width` pixels.
    pub fn row_bytes(self, width: u32) -> usize {
        let bits = u64::from(width) * u64::from(self.bits());
        bits.div_ceil(8) as usize
    }

    /// Human readable name, as printed by [`Raster::print_info`].
    pub fn name(self) -> &'static str {
        match self {
            PixelFormat::Bitmap => "bitmap",
            PixelFormat::Gray8 => "8bit grayscale",
            PixelFormat::Gray16 => "16bit grayscale",
            PixelFormat::GrayFloat => "floating-point grayscale",
            PixelFormat::Rgb888 => "3x8bit RGB color",
        }
    }
}

/// Internal raster data
#[derive(Debug, Clone)]
struct RasterData {
    width: u32,
    height: u32,
    format: PixelFormat,
    /// Bytes per row, including bitmap padding
    row_bytes: usize,
    data: Vec<u8>,
}

impl RasterData {
    fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        check_dimensions(width, height)?;
        let row_bytes = format.row_bytes(width);
        Ok(RasterData {
            width,
            height,
            format,
            row_bytes,
            data: vec![0u8; row_bytes * height as usize],
        })
    }

    #[inline]
    fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.row_bytes;
        &self.data[start..start + self.row_bytes]
    }

    #[inline]
    fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.row_bytes;
        &mut self.data[start..start + self.row_bytes]
    }

    #[inline]
    fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    fn out_of_bounds(&self, x: u32, y: u32) -> Error {
        Error::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 || width >= MAX_DIMENSION || height >= MAX_DIMENSION {
        return Err(Error::InvalidDimension { width, height });
    }
    Ok(())
}

/// Raster - Main image container
///
/// # Examples
///
/// ```
/// use pixlabel_core::{PixelFormat, Raster};
///
/// let raster = Raster::new(640, 480, PixelFormat::Gray16).unwrap();
/// assert_eq!(raster.width(), 640);
/// assert_eq!(raster.row_bytes(), 1280);
/// ```
#[derive(Debug, Clone)]
pub struct Raster {
    inner: Arc<RasterData>,
}

impl Raster {
    /// Create a new zero-filled raster.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0 or not
    /// below [`MAX_DIMENSION`].
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        Ok(Raster {
            inner: Arc::new(RasterData::new(width, height, format)?),
        })
    }

    /// Wrap an existing pixel buffer laid out as described in the module docs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferSize`] if `data` does not hold exactly
    /// `height * row_bytes` bytes.
    pub fn from_raw(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        let row_bytes = format.row_bytes(width);
        let expected = row_bytes * height as usize;
        if data.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Raster {
            inner: Arc::new(RasterData {
                width,
                height,
                format,
                row_bytes,
                data,
            }),
        })
    }

    /// Get the raster width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the raster height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get the pixel format.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.inner.format
    }

    /// Get the number of bytes per row.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.inner.row_bytes
    }

    /// Get raw access to the pixel data.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.inner.data
    }

    /// Get the bytes of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_data(&self, y: u32) -> &[u8] {
        self.inner.row(y)
    }

    /// Check whether (x, y) lies inside the raster.
    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.inner.contains(x, y)
    }

    /// Check if two rasters have the same width, height, and format.
    pub fn sizes_equal(&self, other: &Raster) -> bool {
        self.inner.width == other.inner.width
            && self.inner.height == other.inner.height
            && self.inner.format == other.inner.format
    }

    /// Get the number of strong references to this raster.
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Write raster metadata to a writer (for debugging).
    pub fn print_info(&self, writer: &mut impl std::io::Write, label: Option<&str>) -> Result<()> {
        if let Some(text) = label {
            writeln!(writer, "Raster info for {text}:")?;
        }
        writeln!(
            writer,
            "    width {} x height {}, {} format",
            self.inner.width,
            self.inner.height,
            self.inner.format.name()
        )?;
        writeln!(writer, "    row bytes = {}", self.inner.row_bytes)?;
        Ok(())
    }

    /// Create a deep copy of this raster.
    ///
    /// Unlike `clone()` which shares data via Arc, this creates
    /// a completely independent copy.
    pub fn deep_clone(&self) -> Self {
        Raster {
            inner: Arc::new(self.inner.as_ref().clone()),
        }
    }

    /// Try to get mutable access to the pixel data.
    ///
    /// Succeeds only if there is exactly one reference to the data.
    pub fn try_into_mut(self) -> std::result::Result<RasterMut, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(data) => Ok(RasterMut { inner: data }),
            Err(arc) => Err(Raster { inner: arc }),
        }
    }

    /// Create a mutable copy of this raster.
    pub fn to_mut(&self) -> RasterMut {
        RasterMut {
            inner: self.inner.as_ref().clone(),
        }
    }
}

/// Mutable raster
///
/// Allows modification of pixel data. Convert back to an immutable
/// [`Raster`] using `Into<Raster>`.
#[derive(Debug)]
pub struct RasterMut {
    inner: RasterData,
}

impl RasterMut {
    /// Create a new zero-filled mutable raster.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        Ok(RasterMut {
            inner: RasterData::new(width, height, format)?,
        })
    }

    /// Get the raster width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the raster height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get the pixel format.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.inner.format
    }

    /// Get the number of bytes per row.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.inner.row_bytes
    }

    /// Check whether (x, y) lies inside the raster.
    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.inner.contains(x, y)
    }

    /// Get raw access to the pixel data.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.inner.data
    }

    /// Get mutable access to the pixel data.
    ///
    /// The buffer length never changes; callers may split it into disjoint
    /// row bands with `chunks_mut(row_bytes * rows)`.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.inner.data
    }

    /// Get the bytes of row `y`.
    #[inline]
    pub fn row_data(&self, y: u32) -> &[u8] {
        self.inner.row(y)
    }

    /// Get mutable access to row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_data_mut(&mut self, y: u32) -> &mut [u8] {
        self.inner.row_mut(y)
    }

    /// Reset every sample to zero.
    pub fn clear(&mut self) {
        self.inner.data.fill(0);
    }
}

impl From<RasterMut> for Raster {
    fn from(raster: RasterMut) -> Self {
        Raster {
            inner: Arc::new(raster.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PixelFormat::Bitmap, 10, 2)]
    #[case(PixelFormat::Bitmap, 16, 2)]
    #[case(PixelFormat::Gray8, 10, 10)]
    #[case(PixelFormat::Gray16, 10, 20)]
    #[case(PixelFormat::GrayFloat, 10, 40)]
    #[case(PixelFormat::Rgb888, 10, 30)]
    fn test_row_bytes(#[case] format: PixelFormat, #[case] width: u32, #[case] expected: usize) {
        let raster = Raster::new(width, 3, format).unwrap();
        assert_eq!(raster.row_bytes(), expected);
        assert_eq!(raster.data().len(), expected * 3);
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(Raster::new(0, 10, PixelFormat::Bitmap).is_err());
        assert!(Raster::new(10, 0, PixelFormat::Bitmap).is_err());
        assert!(Raster::new(MAX_DIMENSION, 1, PixelFormat::Gray8).is_err());
    }

    #[test]
    fn test_from_raw_checks_length() {
        assert!(Raster::from_raw(9, 2, PixelFormat::Bitmap, vec![0; 4]).is_ok());
        let err = Raster::from_raw(9, 2, PixelFormat::Bitmap, vec![0; 3]).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferSize {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_mut_round_trip() {
        let raster = Raster::new(4, 4, PixelFormat::Gray16).unwrap();
        let mut raster_mut = raster.try_into_mut().unwrap();
        raster_mut.set_pixel(1, 2, 513).unwrap();
        let raster: Raster = raster_mut.into();
        assert_eq!(raster.get_pixel(1, 2), Some(513));

        let shared = raster.clone();
        assert_eq!(shared.ref_count(), 2);
        let raster = raster.try_into_mut().unwrap_err();
        assert_eq!(raster.to_mut().get_pixel(1, 2), Some(513));
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let raster = Raster::new(3, 3, PixelFormat::Gray8).unwrap();
        let copy = raster.deep_clone();
        assert_eq!(raster.ref_count(), 1);
        assert!(copy.sizes_equal(&raster));
    }

    #[test]
    fn test_print_info() {
        let raster = Raster::new(5, 3, PixelFormat::Bitmap).unwrap();
        let mut out = Vec::new();
        raster.print_info(&mut out, Some("probe")).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("probe"));
        assert!(text.contains("width 5 x height 3, bitmap format"));
    }
}
