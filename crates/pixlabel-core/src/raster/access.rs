//! Pixel access functions
//!
//! Bound-checked getters and setters on [`Raster`] / [`RasterMut`], plus the
//! low-level row accessors the labeling stages use on raw row slices.
//!
//! # Pixel packing
//!
//! Bitmap pixels are packed MSB-to-LSB within each byte: pixel 0 of a row
//! occupies bit 7 of the first byte. 16-bit and float samples are
//! big-endian.

use super::{PixelFormat, Raster, RasterData, RasterMut};
use crate::error::{Error, Result};

impl RasterData {
    #[inline]
    fn sample(&self, x: u32, y: u32) -> u32 {
        read_sample(self.format, self.row(y), x)
    }

    #[inline]
    fn store(&mut self, x: u32, y: u32, val: u32) {
        let format = self.format;
        write_sample(format, self.row_mut(y), x, val);
    }
}

/// Read the sample at `x` from a row of the given format.
#[inline]
fn read_sample(format: PixelFormat, line: &[u8], x: u32) -> u32 {
    match format {
        PixelFormat::Bitmap => get_data_bit(line, x),
        PixelFormat::Gray8 => get_data_byte(line, x),
        PixelFormat::Gray16 => u32::from(get_data_two_bytes(line, x)),
        PixelFormat::GrayFloat => get_data_four_bytes(line, x),
        PixelFormat::Rgb888 => {
            let (r, g, b) = get_data_rgb(line, x);
            (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
        }
    }
}

/// Store `val` at `x` in a row of the given format, masked to the format.
#[inline]
fn write_sample(format: PixelFormat, line: &mut [u8], x: u32, val: u32) {
    match format {
        PixelFormat::Bitmap => set_data_bit(line, x, val),
        PixelFormat::Gray8 => set_data_byte(line, x, val),
        PixelFormat::Gray16 => set_data_two_bytes(line, x, (val & 0xffff) as u16),
        PixelFormat::GrayFloat => set_data_four_bytes(line, x, val),
        PixelFormat::Rgb888 => set_data_rgb(
            line,
            x,
            ((val >> 16) & 0xff) as u8,
            ((val >> 8) & 0xff) as u8,
            (val & 0xff) as u8,
        ),
    }
}

impl Raster {
    /// Get a pixel value at (x, y).
    ///
    /// Bitmap samples are 0 or 1, `Rgb888` samples are `0xRRGGBB` and
    /// `GrayFloat` samples are the raw `f32` bit pattern.
    /// Returns `None` if coordinates are out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        self.inner.contains(x, y).then(|| self.inner.sample(x, y))
    }

    /// Get a pixel value without bounds checking.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`, or if `x` lies past the row buffer.
    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> u32 {
        self.inner.sample(x, y)
    }

    /// Get RGB values at (x, y). Only valid for `Rgb888` rasters.
    pub fn get_rgb(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        if self.inner.format != PixelFormat::Rgb888 || !self.inner.contains(x, y) {
            return None;
        }
        Some(get_data_rgb(self.inner.row(y), x))
    }

    /// Get a float sample at (x, y). Only valid for `GrayFloat` rasters.
    pub fn get_float(&self, x: u32, y: u32) -> Option<f32> {
        if self.inner.format != PixelFormat::GrayFloat || !self.inner.contains(x, y) {
            return None;
        }
        Some(f32::from_bits(self.inner.sample(x, y)))
    }

    /// Count the samples that are not zero.
    ///
    /// For a bitmap this is the number of set (foreground) pixels.
    pub fn count_nonzero(&self) -> u64 {
        let data = &self.inner;
        if data.format == PixelFormat::Bitmap {
            let full = (data.width / 8) as usize;
            let tail = data.width % 8;
            let tail_mask = if tail == 0 { 0 } else { 0xffu8 << (8 - tail) };
            return (0..data.height)
                .map(|y| {
                    let line = data.row(y);
                    let whole: u32 = line[..full].iter().map(|b| b.count_ones()).sum();
                    let partial = if tail == 0 { 0 } else { (line[full] & tail_mask).count_ones() };
                    u64::from(whole + partial)
                })
                .sum();
        }
        (0..data.height)
            .flat_map(|y| (0..data.width).map(move |x| (x, y)))
            .filter(|&(x, y)| data.sample(x, y) != 0)
            .count() as u64
    }
}

impl RasterMut {
    /// Get a pixel value at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u32> {
        self.inner.contains(x, y).then(|| self.inner.sample(x, y))
    }

    /// Get a pixel value without bounds checking.
    #[inline]
    pub fn get_pixel_unchecked(&self, x: u32, y: u32) -> u32 {
        self.inner.sample(x, y)
    }

    /// Set a pixel value at (x, y).
    ///
    /// The value is masked to the format's sample width.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if coordinates are out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, val: u32) -> Result<()> {
        if !self.inner.contains(x, y) {
            return Err(self.inner.out_of_bounds(x, y));
        }
        self.inner.store(x, y, val);
        Ok(())
    }

    /// Set a pixel value without bounds checking.
    #[inline]
    pub fn set_pixel_unchecked(&mut self, x: u32, y: u32, val: u32) {
        self.inner.store(x, y, val);
    }

    /// Set an RGB pixel at (x, y). Only valid for `Rgb888` rasters.
    pub fn set_rgb(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8) -> Result<()> {
        if self.inner.format != PixelFormat::Rgb888 {
            return Err(Error::UnsupportedFormat(self.inner.format.name()));
        }
        if !self.inner.contains(x, y) {
            return Err(self.inner.out_of_bounds(x, y));
        }
        set_data_rgb(self.inner.row_mut(y), x, r, g, b);
        Ok(())
    }

    /// Set a float sample at (x, y). Only valid for `GrayFloat` rasters.
    pub fn set_float(&mut self, x: u32, y: u32, val: f32) -> Result<()> {
        if self.inner.format != PixelFormat::GrayFloat {
            return Err(Error::UnsupportedFormat(self.inner.format.name()));
        }
        if !self.inner.contains(x, y) {
            return Err(self.inner.out_of_bounds(x, y));
        }
        self.inner.store(x, y, val.to_bits());
        Ok(())
    }
}

/// Get a 1-bit pixel value.
#[inline]
pub fn get_data_bit(line: &[u8], x: u32) -> u32 {
    u32::from((line[(x >> 3) as usize] >> (7 - (x & 7))) & 1)
}

/// Set a 1-bit pixel value.
#[inline]
pub fn set_data_bit(line: &mut [u8], x: u32, val: u32) {
    let mask = 0x80u8 >> (x & 7);
    let byte = &mut line[(x >> 3) as usize];
    if val & 1 != 0 {
        *byte |= mask;
    } else {
        *byte &= !mask;
    }
}

/// Get an 8-bit pixel value.
#[inline]
pub fn get_data_byte(line: &[u8], x: u32) -> u32 {
    u32::from(line[x as usize])
}

/// Set an 8-bit pixel value.
#[inline]
pub fn set_data_byte(line: &mut [u8], x: u32, val: u32) {
    line[x as usize] = (val & 0xff) as u8;
}

/// Get a 16-bit pixel value.
#[inline]
pub fn get_data_two_bytes(line: &[u8], x: u32) -> u16 {
    let i = 2 * x as usize;
    u16::from_be_bytes([line[i], line[i + 1]])
}

/// Set a 16-bit pixel value.
#[inline]
pub fn set_data_two_bytes(line: &mut [u8], x: u32, val: u16) {
    let i = 2 * x as usize;
    line[i..i + 2].copy_from_slice(&val.to_be_bytes());
}

/// Get a 32-bit sample.
#[inline]
pub fn get_data_four_bytes(line: &[u8], x: u32) -> u32 {
    let i = 4 * x as usize;
    u32::from_be_bytes([line[i], line[i + 1], line[i + 2], line[i + 3]])
}

/// Set a 32-bit sample.
#[inline]
pub fn set_data_four_bytes(line: &mut [u8], x: u32, val: u32) {
    let i = 4 * x as usize;
    line[i..i + 4].copy_from_slice(&val.to_be_bytes());
}

/// Get an RGB triple.
#[inline]
pub fn get_data_rgb(line: &[u8], x: u32) -> (u8, u8, u8) {
    let i = 3 * x as usize;
    (line[i], line[i + 1], line[i + 2])
}

/// Set an RGB triple.
#[inline]
pub fn set_data_rgb(line: &mut [u8], x: u32, r: u8, g: u8, b: u8) {
    let i = 3 * x as usize;
    line[i] = r;
    line[i + 1] = g;
    line[i + 2] = b;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_packing_is_msb_first() {
        let mut line = [0u8; 2];
        set_data_bit(&mut line, 0, 1);
        set_data_bit(&mut line, 9, 1);
        assert_eq!(line, [0x80, 0x40]);
        assert_eq!(get_data_bit(&line, 0), 1);
        assert_eq!(get_data_bit(&line, 1), 0);
        assert_eq!(get_data_bit(&line, 9), 1);
        set_data_bit(&mut line, 0, 0);
        assert_eq!(line[0], 0);
    }

    #[test]
    fn test_two_bytes_are_big_endian() {
        let mut line = [0u8; 4];
        set_data_two_bytes(&mut line, 1, 0x1234);
        assert_eq!(line, [0, 0, 0x12, 0x34]);
        assert_eq!(get_data_two_bytes(&line, 1), 0x1234);
    }

    #[test]
    fn test_set_pixel_out_of_bounds() {
        let mut raster = RasterMut::new(4, 3, PixelFormat::Bitmap).unwrap();
        assert!(raster.set_pixel(3, 2, 1).is_ok());
        assert!(matches!(
            raster.set_pixel(4, 0, 1),
            Err(Error::OutOfBounds { x: 4, y: 0, .. })
        ));
        assert_eq!(raster.get_pixel(3, 3), None);
    }

    #[test]
    fn test_rgb_and_float_access() {
        let mut rgb = RasterMut::new(2, 2, PixelFormat::Rgb888).unwrap();
        rgb.set_rgb(1, 1, 10, 20, 30).unwrap();
        assert_eq!(rgb.get_pixel(1, 1), Some(0x0a141e));
        let rgb: Raster = rgb.into();
        assert_eq!(rgb.get_rgb(1, 1), Some((10, 20, 30)));
        assert_eq!(rgb.get_float(1, 1), None);

        let mut gray = RasterMut::new(2, 2, PixelFormat::GrayFloat).unwrap();
        gray.set_float(0, 1, 0.25).unwrap();
        assert!(gray.set_rgb(0, 0, 1, 2, 3).is_err());
        let gray: Raster = gray.into();
        assert_eq!(gray.get_float(0, 1), Some(0.25));
    }

    #[test]
    fn test_count_nonzero_ignores_padding() {
        let mut bits = RasterMut::new(10, 2, PixelFormat::Bitmap).unwrap();
        bits.set_pixel(0, 0, 1).unwrap();
        bits.set_pixel(9, 1, 1).unwrap();
        // padding bits past the last column
        bits.row_data_mut(0)[1] |= 0x3f;
        let bits: Raster = bits.into();
        assert_eq!(bits.count_nonzero(), 2);

        let mut gray = RasterMut::new(3, 3, PixelFormat::Gray16).unwrap();
        gray.set_pixel(2, 2, 700).unwrap();
        let gray: Raster = gray.into();
        assert_eq!(gray.count_nonzero(), 1);
    }

    #[test]
    fn test_values_are_masked() {
        let mut raster = RasterMut::new(2, 1, PixelFormat::Gray8).unwrap();
        raster.set_pixel(0, 0, 0x1ff).unwrap();
        assert_eq!(raster.get_pixel(0, 0), Some(0xff));
    }
}
