//! Image format detection
//!
//! Detects NetPBM variants by examining the magic number in the file header.
//!
//! | Extension | Format name     | ASCII | Binary |
//! |-----------|-----------------|-------|--------|
//! | pbm       | Portable Bitmap | P1    | P4     |
//! | pgm       | Portable Graymap| P2    | P5     |
//! | ppm       | Portable Pixmap | P3    | P6     |

use crate::{IoError, IoResult};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// NetPBM file variant, numbered after its magic digit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PnmKind {
    /// P1
    BitmapAscii = 1,
    /// P2
    GrayAscii = 2,
    /// P3
    RgbAscii = 3,
    /// P4
    BitmapBinary = 4,
    /// P5
    GrayBinary = 5,
    /// P6
    RgbBinary = 6,
}

impl PnmKind {
    /// Map a magic digit (1-6) to its variant.
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            1 => Some(Self::BitmapAscii),
            2 => Some(Self::GrayAscii),
            3 => Some(Self::RgbAscii),
            4 => Some(Self::BitmapBinary),
            5 => Some(Self::GrayBinary),
            6 => Some(Self::RgbBinary),
            _ => None,
        }
    }

    /// The magic digit of this variant.
    pub fn digit(self) -> u8 {
        self as u8
    }

    /// Whether pixel data is a raw binary block.
    pub fn is_binary(self) -> bool {
        self.digit() > 3
    }

    /// Whether the header carries a max-value field.
    pub fn has_maxval(self) -> bool {
        !matches!(self, Self::BitmapAscii | Self::BitmapBinary)
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::BitmapAscii | Self::BitmapBinary => "pbm",
            Self::GrayAscii | Self::GrayBinary => "pgm",
            Self::RgbAscii | Self::RgbBinary => "ppm",
        }
    }
}

/// Detect the NetPBM variant of a file
pub fn detect_format<P: AsRef<Path>>(path: P) -> IoResult<PnmKind> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 2];
    let bytes_read = file.read(&mut header)?;
    detect_format_from_bytes(&header[..bytes_read])
}

/// Detect the NetPBM variant from leading bytes
pub fn detect_format_from_bytes(data: &[u8]) -> IoResult<PnmKind> {
    if data.len() < 2 {
        return Err(IoError::InvalidData(
            "not enough data to detect format".to_string(),
        ));
    }
    if data[0] != b'P' {
        return Err(IoError::UnsupportedFormat("not a Netpbm file".to_string()));
    }
    data[1]
        .checked_sub(b'0')
        .and_then(PnmKind::from_digit)
        .ok_or_else(|| {
            IoError::UnsupportedFormat(format!(
                "unknown Netpbm magic P{}",
                char::from(data[1]).escape_default()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"P1\n", PnmKind::BitmapAscii)]
    #[case(b"P2 ", PnmKind::GrayAscii)]
    #[case(b"P3", PnmKind::RgbAscii)]
    #[case(b"P4\n", PnmKind::BitmapBinary)]
    #[case(b"P5\n", PnmKind::GrayBinary)]
    #[case(b"P6\n", PnmKind::RgbBinary)]
    fn test_detect_known_magic(#[case] data: &[u8], #[case] expected: PnmKind) {
        assert_eq!(detect_format_from_bytes(data).unwrap(), expected);
    }

    #[rstest]
    #[case(b"P")]
    #[case(b"P0")]
    #[case(b"P7")]
    #[case(b"BM")]
    fn test_detect_rejects(#[case] data: &[u8]) {
        assert!(detect_format_from_bytes(data).is_err());
    }

    #[test]
    fn test_kind_properties() {
        assert!(PnmKind::BitmapBinary.is_binary());
        assert!(!PnmKind::GrayAscii.is_binary());
        assert!(!PnmKind::BitmapAscii.has_maxval());
        assert!(PnmKind::RgbBinary.has_maxval());
        assert_eq!(PnmKind::GrayBinary.extension(), "pgm");
    }
}
