//! pixlabel-io - NetPBM image I/O
//!
//! Reads P1-P6 files into [`Raster`]s and writes rasters back out in binary
//! or ASCII NetPBM form.
//!
//! # Examples
//!
//! ```
//! use pixlabel_core::PixelFormat;
//! use pixlabel_io::{pnm, read_pnm};
//!
//! let raster = read_pnm(&b"P1\n3 1\n1 0 1\n"[..]).unwrap();
//! assert_eq!(raster.format(), PixelFormat::Bitmap);
//!
//! let mut out = Vec::new();
//! pnm::write_pnm(&raster, &mut out).unwrap();
//! assert_eq!(out, b"P4\n3 1\n\xa0");
//! ```

mod error;
pub mod format;
pub mod pnm;

pub use error::{IoError, IoResult};
pub use format::{PnmKind, detect_format, detect_format_from_bytes};
pub use pnm::{Encoding, PnmHeader, decode_pnm, read_pnm, write_pnm, write_pnm_ascii};

use pixlabel_core::Raster;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

/// Read an image from a file path.
///
/// # Errors
///
/// Returns [`IoError::Io`] if the file cannot be opened, or a decode error
/// if its header or payload is malformed.
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<Raster> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let raster = decode_pnm(&data)?;
    debug!(
        path = %path.display(),
        width = raster.width(),
        height = raster.height(),
        format = raster.format().name(),
        "read image"
    );
    Ok(raster)
}

/// Write an image to a file path.
pub fn write_image<P: AsRef<Path>>(raster: &Raster, path: P, encoding: Encoding) -> IoResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    pnm::write_pnm_with(raster, BufWriter::new(file), encoding)?;
    debug!(path = %path.display(), ?encoding, "wrote image");
    Ok(())
}
