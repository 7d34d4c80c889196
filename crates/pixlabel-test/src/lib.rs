//! pixlabel-test - Regression test framework for pixlabel
//!
//! A [`RegParams`] tracks numbered checks for one regression test and
//! reports every failure at [`RegParams::cleanup`] time. Two modes are supported:
//!
//! - **Compare**: run the checks (default)
//! - **Display**: additionally dump intermediate rasters to `tests/regout`
//!
//! # Usage
//!
//! ```ignore
//! use pixlabel_test::RegParams;
//!
//! let mut rp = RegParams::new("label");
//! rp.compare_values(2.0, count as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" or "display"

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use pixlabel_core::{PixelFormat, Raster, RasterMut};

/// Load a test image from the test data directory
///
/// # Arguments
///
/// * `name` - Image filename (e.g., "blobs.pbm")
pub fn load_test_image(name: &str) -> TestResult<Raster> {
    let path = test_data_path(name);
    pixlabel_io::read_image(&path).map_err(|e| TestError::ImageLoad {
        path: path.clone(),
        message: e.to_string(),
    })
}

/// Build a bitmap from a picture, one string per row.
///
/// `#` and `1` mark set pixels, `.`, `0` and space mark clear ones.
///
/// ```
/// let raster = pixlabel_test::bitmap_from_rows(&["#..", ".##"]).unwrap();
/// assert_eq!(raster.get_pixel(0, 0), Some(1));
/// assert_eq!(raster.get_pixel(1, 0), Some(0));
/// ```
pub fn bitmap_from_rows(rows: &[&str]) -> TestResult<Raster> {
    let height = rows.len() as u32;
    let width = rows.first().map_or(0, |r| r.chars().count()) as u32;
    let mut raster = RasterMut::new(width, height, PixelFormat::Bitmap)
        .map_err(|e| TestError::BadPicture(e.to_string()))?;
    for (y, row) in rows.iter().enumerate() {
        if row.chars().count() as u32 != width {
            return Err(TestError::BadPicture(format!(
                "row {y} has {} columns, expected {width}",
                row.chars().count()
            )));
        }
        for (x, c) in row.chars().enumerate() {
            let val = match c {
                '#' | '1' => 1,
                '.' | '0' | ' ' => 0,
                other => {
                    return Err(TestError::BadPicture(format!(
                        "unexpected {other:?} at ({x}, {y})"
                    )));
                }
            };
            raster.set_pixel_unchecked(x as u32, y as u32, val);
        }
    }
    Ok(raster.into())
}

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // pixlabel-test is at crates/pixlabel-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to a test data file
pub fn test_data_path(name: &str) -> String {
    format!("{}/tests/data/images/{}", workspace_root(), name)
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
