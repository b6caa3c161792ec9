//! Provide Camera Control.
//!
pub mod libcamera;
#[cfg(test)]
pub mod mock;
pub mod v4l2;

use serde::Deserialize;
use std::path::Path;

use crate::module::error::{Result, TimelapseError};
use crate::module::util::conf::Config;

/// Autofocus modes understood by every backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AfMode {
    Manual, // lens stays where it is put
    Auto,   // single focus sweep before capture
}

/// One set of controls to apply before a capture.
///
/// `None` leaves the control to the camera's own algorithms.
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    pub ae_enable: bool,
    pub af_mode: AfMode,
    pub lens_position: Option<f64>, // dioptres
    pub exposure_time: Option<u64>, // microseconds
    pub analogue_gain: Option<f64>,
}

impl Controls {
    /// Autoexposure with a single autofocus sweep.
    pub fn auto() -> Self {
        Self {
            ae_enable: true,
            af_mode: AfMode::Auto,
            lens_position: None,
            exposure_time: None,
            analogue_gain: None,
        }
    }

    /// Manual focus and manual exposure.
    pub fn fixed(lens_position: f64, exposure_time: u64, analogue_gain: f64) -> Self {
        Self {
            ae_enable: false,
            af_mode: AfMode::Manual,
            lens_position: Some(lens_position),
            exposure_time: Some(exposure_time),
            analogue_gain: Some(analogue_gain),
        }
    }
}

/// Values the camera reports back after a capture.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CaptureMetadata {
    #[serde(rename = "ExposureTime")]
    pub exposure_time: Option<u64>,
    #[serde(rename = "AnalogueGain")]
    pub analogue_gain: Option<f64>,
    #[serde(rename = "LensPosition")]
    pub lens_position: Option<f64>,
}

/// Camera control surface used by the capture loop.
///
pub trait Camera {
    /// Queue controls for the next capture.
    fn apply(&mut self, controls: &Controls) -> Result<()>;
    /// Start streaming.
    fn start(&mut self) -> Result<()>;
    /// Write one still frame to `path` and report the applied values.
    fn capture_file(&mut self, path: &Path) -> Result<CaptureMetadata>;
    /// Stop streaming.
    fn stop(&mut self) -> Result<()>;
}

/// Open the camera backend named in the config.
///
pub fn open(conf: &Config) -> Result<Box<dyn Camera>> {
    match conf.camera.backend.as_str() {
        "libcamera" => Ok(Box::new(libcamera::RpiCam::new(
            conf.camera.clone(),
            conf.timelapse.settle_secs,
        ))),
        "v4l2" => Ok(Box::new(v4l2::V4l2Camera::new(conf.camera.clone())?)),
        other => Err(TimelapseError::InvalidConfig(format!(
            "unknown camera backend: {}",
            other
        ))),
    }
}
