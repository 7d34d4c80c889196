//! PNM (Portable Any Map) format support
//!
//! Reads all six classic variants (P1-P6) and writes either the binary
//! (P4/P5/P6) or the ASCII (P1/P2/P3) form.
//!
//! Header tokens are separated by whitespace and may be interleaved with
//! `#` comments running to the end of the line. Binary pixel data starts
//! after exactly one whitespace byte following the last header token.
//! Bitmap rows are padded to whole bytes; 16-bit samples are big-endian.

use crate::format::{PnmKind, detect_format_from_bytes};
use crate::{IoError, IoResult};
use pixlabel_core::{PixelFormat, Raster, RasterMut};
use std::io::{Read, Write};

/// Pixel data encoding used when writing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Whitespace-separated decimal samples (P1/P2/P3)
    Ascii,
    /// Raw sample block (P4/P5/P6)
    #[default]
    Binary,
}

/// Parsed PNM header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PnmHeader {
    /// File variant
    pub kind: PnmKind,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Maximum sample value (1 for bitmaps)
    pub maxval: u32,
}

impl PnmHeader {
    /// Raster format the pixel data decodes into.
    pub fn pixel_format(&self) -> PixelFormat {
        match self.kind {
            PnmKind::BitmapAscii | PnmKind::BitmapBinary => PixelFormat::Bitmap,
            PnmKind::GrayAscii | PnmKind::GrayBinary if self.maxval < 256 => PixelFormat::Gray8,
            PnmKind::GrayAscii | PnmKind::GrayBinary => PixelFormat::Gray16,
            PnmKind::RgbAscii | PnmKind::RgbBinary => PixelFormat::Rgb888,
        }
    }
}

/// Byte cursor over an in-memory PNM file
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(c) = self.peek() {
            if c == b'#' {
                while let Some(c) = self.peek() {
                    self.pos += 1;
                    if c == b'\n' {
                        break;
                    }
                }
            } else if c.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn read_uint(&mut self, what: &str) -> IoResult<u32> {
        self.skip_whitespace_and_comments();
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(IoError::InvalidData(format!(
                "expected {what} at byte {start}"
            )));
        }
        let digits = &self.data[start..self.pos];
        std::str::from_utf8(digits)
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(|| IoError::InvalidData(format!("{what} is out of range")))
    }

    /// ASCII sample; a clamped decimal integer.
    fn read_sample(&mut self, max: u32) -> IoResult<u32> {
        match self.read_uint("sample") {
            Ok(v) => Ok(v.min(max)),
            Err(IoError::InvalidData(msg)) => Err(IoError::DecodeError(msg)),
            Err(e) => Err(e),
        }
    }

    /// P1 samples are single digits and need no separator.
    fn read_bit(&mut self) -> IoResult<u32> {
        self.skip_whitespace_and_comments();
        match self.peek() {
            Some(c @ (b'0' | b'1')) => {
                self.pos += 1;
                Ok(u32::from(c - b'0'))
            }
            Some(c) => Err(IoError::DecodeError(format!(
                "unexpected byte {:#04x} in bitmap data",
                c
            ))),
            None => Err(IoError::DecodeError("bitmap data ends early".to_string())),
        }
    }
}

/// Parse the header of an in-memory PNM file.
///
/// Returns the header and the offset at which pixel data starts.
pub fn read_header(data: &[u8]) -> IoResult<(PnmHeader, usize)> {
    let kind = detect_format_from_bytes(data)?;
    let mut cursor = Cursor::new(data, 2);
    let width = cursor.read_uint("width")?;
    let height = cursor.read_uint("height")?;
    let maxval = if kind.has_maxval() {
        cursor.read_uint("max value")?
    } else {
        1
    };

    if maxval == 0 || maxval > 65535 {
        return Err(IoError::InvalidData(format!("max value {maxval}")));
    }
    if matches!(kind, PnmKind::RgbAscii | PnmKind::RgbBinary) && maxval > 255 {
        return Err(IoError::UnsupportedFormat(format!(
            "16-bit color (max value {maxval})"
        )));
    }

    if kind.is_binary() {
        // exactly one whitespace byte separates the header from the raster
        match cursor.peek() {
            Some(c) if c.is_ascii_whitespace() => cursor.pos += 1,
            _ => {
                return Err(IoError::InvalidData(
                    "missing whitespace after header".to_string(),
                ));
            }
        }
    }

    Ok((
        PnmHeader {
            kind,
            width,
            height,
            maxval,
        },
        cursor.pos,
    ))
}

/// Decode a complete PNM file held in memory.
pub fn decode_pnm(data: &[u8]) -> IoResult<Raster> {
    let (header, offset) = read_header(data)?;
    let format = header.pixel_format();

    if header.kind.is_binary() {
        let row_bytes = format.row_bytes(header.width);
        let nbytes = row_bytes * header.height as usize;
        let available = data.len() - offset;
        if available < nbytes {
            return Err(IoError::DecodeError(format!(
                "expected {nbytes} bytes of pixel data, could read only {available}"
            )));
        }
        let raster = Raster::from_raw(
            header.width,
            header.height,
            format,
            data[offset..offset + nbytes].to_vec(),
        )?;
        return Ok(raster);
    }

    let mut raster = RasterMut::new(header.width, header.height, format)?;
    let mut cursor = Cursor::new(data, offset);
    let max = header.maxval.min(format.max_value());
    for y in 0..header.height {
        for x in 0..header.width {
            let val = match header.kind {
                PnmKind::BitmapAscii => cursor.read_bit()?,
                PnmKind::RgbAscii => {
                    let r = cursor.read_sample(max)?;
                    let g = cursor.read_sample(max)?;
                    let b = cursor.read_sample(max)?;
                    (r << 16) | (g << 8) | b
                }
                _ => cursor.read_sample(max)?,
            };
            raster.set_pixel_unchecked(x, y, val);
        }
    }
    Ok(raster.into())
}

/// Read a PNM image (P1-P6) from a reader.
///
/// # Returns
/// A `Bitmap` (P1/P4), `Gray8` or `Gray16` (P2/P5, depending on the max
/// value) or `Rgb888` (P3/P6) raster.
pub fn read_pnm<R: Read>(mut reader: R) -> IoResult<Raster> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    decode_pnm(&data)
}

fn header_for(raster: &Raster, encoding: Encoding) -> IoResult<(PnmKind, u32)> {
    let (ascii, maxval) = match raster.format() {
        PixelFormat::Bitmap => (PnmKind::BitmapAscii, 1),
        PixelFormat::Gray8 => (PnmKind::GrayAscii, 255),
        PixelFormat::Gray16 => (PnmKind::GrayAscii, 65535),
        PixelFormat::GrayFloat => {
            if encoding == Encoding::Binary {
                return Err(IoError::EncodeError(
                    "floating-point rasters can only be written as ASCII".to_string(),
                ));
            }
            (PnmKind::GrayAscii, 255)
        }
        PixelFormat::Rgb888 => (PnmKind::RgbAscii, 255),
    };
    let kind = match encoding {
        Encoding::Ascii => ascii,
        Encoding::Binary => PnmKind::from_digit(ascii.digit() + 3).unwrap_or(ascii),
    };
    Ok((kind, maxval))
}

/// Write a raster as binary PNM (P4 / P5 / P6) to a writer.
///
/// # Errors
/// `GrayFloat` rasters have no binary PNM form and yield
/// [`IoError::EncodeError`].
pub fn write_pnm<W: Write>(raster: &Raster, writer: W) -> IoResult<()> {
    write_pnm_with(raster, writer, Encoding::Binary)
}

/// Write a raster as ASCII PNM (P1 / P2 / P3) to a writer.
///
/// Float samples are clamped to 0.0..=1.0 and scaled to 0..=255.
pub fn write_pnm_ascii<W: Write>(raster: &Raster, writer: W) -> IoResult<()> {
    write_pnm_with(raster, writer, Encoding::Ascii)
}

/// Write a raster as PNM with the given encoding.
pub fn write_pnm_with<W: Write>(raster: &Raster, mut writer: W, encoding: Encoding) -> IoResult<()> {
    let (kind, maxval) = header_for(raster, encoding)?;
    write!(writer, "P{}\n{} {}\n", kind.digit(), raster.width(), raster.height())?;
    if kind.has_maxval() {
        writeln!(writer, "{maxval}")?;
    }

    if encoding == Encoding::Binary {
        writer.write_all(raster.data())?;
        writer.flush()?;
        return Ok(());
    }

    for y in 0..raster.height() {
        let mut line = String::new();
        for x in 0..raster.width() {
            if x > 0 {
                line.push(' ');
            }
            let val = raster.get_pixel_unchecked(x, y);
            match raster.format() {
                PixelFormat::Rgb888 => {
                    line.push_str(&format!(
                        "{} {} {}",
                        (val >> 16) & 0xff,
                        (val >> 8) & 0xff,
                        val & 0xff
                    ));
                }
                PixelFormat::GrayFloat => {
                    let level = (f32::from_bits(val).clamp(0.0, 1.0) * 255.0).round() as u32;
                    line.push_str(&level.to_string());
                }
                _ => line.push_str(&val.to_string()),
            }
        }
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;
    Ok(())
}
