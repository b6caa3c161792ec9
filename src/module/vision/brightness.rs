//! Scene brightness estimation.
//!
//! Brightness is the mean grayscale intensity of a frame, 0 (black) to 255 (white).

use image::{io::Reader, GrayImage};
use std::path::Path;

use crate::module::error::{Result, TimelapseError};

/// Measure the brightness of the image stored at `path`.
///
/// The format is guessed from the file contents, not the extension.
pub fn measure(path: &Path) -> Result<f64> {
    let img = Reader::open(path)?.with_guessed_format()?.decode()?;
    mean(&img.to_luma8())
        .ok_or_else(|| TimelapseError::EmptyImage(path.to_string_lossy().into_owned()))
}

/// Average pixel brightness of a grayscale image, `None` when it has no pixels.
pub fn mean(img: &GrayImage) -> Option<f64> {
    let count = img.as_raw().len();
    if count == 0 {
        return None;
    }
    let sum: u64 = img.as_raw().iter().map(|&p| p as u64).sum();
    Some(sum as f64 / count as f64)
}
