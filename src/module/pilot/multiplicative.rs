//! Step exposure and gain by fixed factors.
//!
//! Too dark: exposure and gain go up one step. Too bright: down one step.
//! Inside `target ± tolerance` nothing changes.

use super::{ExposureController, TimelapseState};
use crate::module::util::conf::Config;

pub struct Multiplicative {
    target: f64,
    tolerance: f64,
    exposure_factor: f64,
    gain_factor: f64,
    min_gain: f64,
    max_gain: f64,
    min_exposure_time: u64,
    max_exposure_time: u64,
}

impl Multiplicative {
    pub fn new(conf: &Config) -> Self {
        Self {
            target: conf.exposure.target_brightness,
            tolerance: conf.exposure.tolerance,
            exposure_factor: conf.multiplicative.exposure_factor,
            gain_factor: conf.multiplicative.gain_factor,
            min_gain: conf.multiplicative.min_gain,
            max_gain: conf.multiplicative.max_gain,
            min_exposure_time: conf.exposure.min_exposure_time,
            max_exposure_time: conf.multiplicative.max_exposure_time,
        }
    }

    /// Next `(exposure_time, gain)` for `brightness`.
    pub fn next(&self, brightness: f64, exposure_time: u64, gain: f64) -> (u64, f64) {
        let (mut exposure_time, mut gain) = (exposure_time, gain);
        if brightness < self.target - self.tolerance && exposure_time < self.max_exposure_time {
            exposure_time = (exposure_time as f64 * self.exposure_factor) as u64;
            gain = (gain * self.gain_factor).min(self.max_gain);
        } else if brightness > self.target + self.tolerance
            && exposure_time > self.min_exposure_time
        {
            exposure_time = (exposure_time as f64 / self.exposure_factor) as u64;
            gain = (gain / self.gain_factor).max(self.min_gain);
        }
        (
            exposure_time.clamp(self.min_exposure_time, self.max_exposure_time),
            gain,
        )
    }
}

impl ExposureController for Multiplicative {
    fn adjust(&self, state: &mut TimelapseState, brightness: f64) {
        let (exposure_time, gain) = self.next(brightness, state.exposure_time, state.gain);
        log::debug!(
            "Multiplicative: brightness {:.1}, exposure {} -> {}, gain {:.2} -> {:.2}",
            brightness,
            state.exposure_time,
            exposure_time,
            state.gain,
            gain
        );
        state.exposure_time = exposure_time;
        state.gain = gain;
    }
}
