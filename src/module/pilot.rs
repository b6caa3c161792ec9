//! This module decides how each shot is taken.

// Import the submodules for exposure controllers
pub mod multiplicative; // Step exposure and gain by fixed factors
pub mod proportional; // Proportional exposure controller

use crate::module::error::{Result, TimelapseError};
use crate::module::util::conf::Config;

/// Focus and exposure modes.
#[derive(Debug, Clone, PartialEq, Copy)]
pub enum FocusMode {
    Auto,  // Daylight: autoexposure and single-shot autofocus
    Fixed, // Night: fixed lens position, manual exposure
}

impl FocusMode {
    /// Pick the mode for a brightness reading.
    pub fn select(brightness: f64, conf: &Config) -> FocusMode {
        if is_daytime(brightness, day_threshold(conf)) {
            FocusMode::Auto
        } else {
            FocusMode::Fixed
        }
    }

    /// Label written to the capture log.
    pub fn label(&self) -> &'static str {
        match self {
            FocusMode::Auto => "auto",
            FocusMode::Fixed => "fixed",
        }
    }
}

/// Whether a brightness reading counts as daytime.
pub fn is_daytime(brightness: f64, threshold: f64) -> bool {
    brightness > threshold
}

/// Brightness above which the scene counts as daytime.
pub fn day_threshold(conf: &Config) -> f64 {
    conf.exposure.target_brightness - conf.exposure.tolerance
}

/// Exposure controllers.
#[derive(Debug, Clone, PartialEq, Copy)]
pub enum Controllers {
    Proportional,
    Multiplicative,
    Unknown,
}

impl Controllers {
    /// Convert a string to a controller.
    pub fn from_string(s: &str) -> Controllers {
        match s {
            "proportional" => Controllers::Proportional,
            "multiplicative" => Controllers::Multiplicative,
            _ => Controllers::Unknown,
        }
    }
}

/// This struct represents the state carried from one shot to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelapseState {
    pub exposure_time: u64,   // Exposure time for fixed mode (microseconds)
    pub gain: f64,            // Analogue gain for fixed mode
    pub last_brightness: f64, // Brightness of the previous shot (0-255)
}

impl TimelapseState {
    /// Create a new TimelapseState with configured initial values.
    pub fn new(conf: &Config) -> Self {
        Self {
            exposure_time: conf.exposure.initial_exposure_time,
            gain: conf.exposure.initial_gain,
            last_brightness: conf.exposure.initial_brightness,
        }
    }
}

/// Computes the exposure for the next shot from the brightness of the last one.
pub trait ExposureController {
    fn adjust(&self, state: &mut TimelapseState, brightness: f64);
}

/// Build the controller named in the config.
pub fn build_controller(conf: &Config) -> Result<Box<dyn ExposureController>> {
    match Controllers::from_string(&conf.exposure.controller) {
        Controllers::Proportional => Ok(Box::new(proportional::Proportional::new(conf))),
        Controllers::Multiplicative => Ok(Box::new(multiplicative::Multiplicative::new(conf))),
        Controllers::Unknown => Err(TimelapseError::InvalidConfig(format!(
            "unknown exposure controller: {}",
            conf.exposure.controller
        ))),
    }
}
