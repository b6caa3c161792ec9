//! Proportional exposure control.
//!
//! The exposure moves by `k * (target - brightness) / target` microseconds
//! per shot. Gain is left to the camera's autoexposure.

use super::{ExposureController, TimelapseState};
use crate::module::util::conf::Config;

pub struct Proportional {
    target: f64,
    k: f64,
    min_exposure_time: u64,
    max_exposure_time: u64,
}

impl Proportional {
    pub fn new(conf: &Config) -> Self {
        Self {
            target: conf.exposure.target_brightness,
            k: conf.proportional.k,
            min_exposure_time: conf.exposure.min_exposure_time,
            max_exposure_time: conf.proportional.max_exposure_time,
        }
    }

    /// Next exposure time for `brightness` measured at `current` microseconds.
    pub fn next_exposure(&self, brightness: f64, current: u64) -> u64 {
        let error = self.target - brightness;
        let adjustment = self.k * (error / self.target);
        let next = current as f64 + adjustment;
        next.clamp(self.min_exposure_time as f64, self.max_exposure_time as f64) as u64
    }
}

impl ExposureController for Proportional {
    fn adjust(&self, state: &mut TimelapseState, brightness: f64) {
        let next = self.next_exposure(brightness, state.exposure_time);
        log::debug!(
            "Proportional: brightness {:.1}, exposure {} -> {}",
            brightness,
            state.exposure_time,
            next
        );
        state.exposure_time = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> Proportional {
        Proportional::new(&Config::default())
    }

    #[test]
    fn black_frame_adds_full_k() {
        assert_eq!(controller().next_exposure(0.0, 100_000), 1_100_000);
    }

    #[test]
    fn on_target_keeps_exposure() {
        assert_eq!(controller().next_exposure(100.0, 250_000), 250_000);
    }

    #[test]
    fn bright_frame_shortens_exposure() {
        // error -50 -> -500000
        assert_eq!(controller().next_exposure(150.0, 800_000), 300_000);
    }

    #[test]
    fn clamps_to_limits() {
        assert_eq!(controller().next_exposure(255.0, 100_000), 10_000);
        assert_eq!(controller().next_exposure(0.0, 110_500_000), 111_000_000);
    }

    #[test]
    fn adjust_leaves_gain_alone() {
        let mut state = TimelapseState {
            exposure_time: 100_000,
            gain: 6.5,
            last_brightness: 0.0,
        };
        controller().adjust(&mut state, 0.0);
        assert_eq!(state.exposure_time, 1_100_000);
        assert_eq!(state.gain, 6.5);
    }
}
