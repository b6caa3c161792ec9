//! V4L2 Camera Functions
//!
//! Frames come from `rscam`, controls go through `v4l2-ctl` using the
//! control names of current kernels.

use rscam::Config;
use std::fs;
use std::path::Path;
use std::process::Command;

use super::{AfMode, Camera, CaptureMetadata, Controls};
use crate::module::error::{Result, TimelapseError};
use crate::module::util::conf;

// V4L2 exposure units are 100 microseconds.
const EXPOSURE_UNIT_US: u64 = 100;
// focus_absolute steps per dioptre.
const FOCUS_STEPS: f64 = 100.0;
// auto_exposure menu entries.
const EXPOSURE_MANUAL: u8 = 1;
const EXPOSURE_APERTURE_PRIORITY: u8 = 3;
// Used when the config leaves the resolution to the sensor.
const DEFAULT_RESOLUTION: (u32, u32) = (1280, 720);

/// Represents a V4L2 camera configuration and capture functionality.
///
pub struct V4l2Camera {
    cap: Option<rscam::Camera>, // Open while streaming.
    conf: conf::Camera,
}

impl V4l2Camera {
    /// Creates a new V4L2 camera for the configured device node.
    ///
    pub fn new(conf: conf::Camera) -> Result<Self> {
        if !Path::new(&conf.device).exists() {
            return Err(TimelapseError::Camera(format!(
                "no such device: {}",
                conf.device
            )));
        }
        Ok(Self { cap: None, conf })
    }

    /// `--set-ctrl` value for a set of controls.
    pub fn control_list(controls: &Controls) -> String {
        let mut ctrls = vec![];
        if controls.ae_enable {
            ctrls.push(format!("auto_exposure={}", EXPOSURE_APERTURE_PRIORITY));
        } else {
            ctrls.push(format!("auto_exposure={}", EXPOSURE_MANUAL));
            if let Some(exposure) = controls.exposure_time {
                let units = (exposure / EXPOSURE_UNIT_US).max(1);
                ctrls.push(format!("exposure_time_absolute={}", units));
            }
            if let Some(gain) = controls.analogue_gain {
                ctrls.push(format!("gain={}", gain.round() as i64));
            }
        }
        match controls.af_mode {
            AfMode::Auto => ctrls.push("focus_automatic_continuous=1".to_string()),
            AfMode::Manual => {
                ctrls.push("focus_automatic_continuous=0".to_string());
                if let Some(lens) = controls.lens_position {
                    ctrls.push(format!("focus_absolute={}", (lens * FOCUS_STEPS).round() as i64));
                }
            }
        }
        ctrls.join(",")
    }

    /// Parse `v4l2-ctl --get-ctrl` output (`name: value` per line).
    pub fn parse_controls(output: &str) -> CaptureMetadata {
        let mut meta = CaptureMetadata::default();
        for line in output.lines() {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let Ok(value) = value.trim().parse::<i64>() else {
                continue;
            };
            match name.trim() {
                "exposure_time_absolute" => {
                    meta.exposure_time = Some(value.max(0) as u64 * EXPOSURE_UNIT_US)
                }
                "gain" => meta.analogue_gain = Some(value as f64),
                "focus_absolute" => meta.lens_position = Some(value as f64 / FOCUS_STEPS),
                _ => (),
            }
        }
        meta
    }

    fn v4l2_ctl(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("v4l2-ctl")
            .arg("-d")
            .arg(&self.conf.device)
            .args(args)
            .output()?;
        if !output.status.success() {
            return Err(TimelapseError::Camera(format!(
                "v4l2-ctl {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn resolution(&self) -> (u32, u32) {
        match (self.conf.width, self.conf.height) {
            (0, _) | (_, 0) => DEFAULT_RESOLUTION,
            (w, h) => (w, h),
        }
    }
}

impl Camera for V4l2Camera {
    fn apply(&mut self, controls: &Controls) -> Result<()> {
        let list = Self::control_list(controls);
        log::debug!("v4l2 controls: {}", list);
        self.v4l2_ctl(&["--set-ctrl", &list])?;
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        let mut cap = rscam::Camera::new(&self.conf.device)?;
        cap.start(&Config {
            interval: (1, 30), // 30 fps.
            resolution: self.resolution(),
            format: b"MJPG",
            nbuffers: 1,
            ..Default::default()
        })
        .map_err(|e| TimelapseError::Camera(format!("{:?}", e)))?;
        self.cap = Some(cap);
        Ok(())
    }

    fn capture_file(&mut self, path: &Path) -> Result<CaptureMetadata> {
        let Some(cap) = self.cap.as_ref() else {
            return Err(TimelapseError::Camera("capture before start".to_string()));
        };
        let _ = cap.capture(); // Grab a frame to reduce delay.
        let frame = cap.capture()?;
        fs::write(path, &frame[..])?;

        // Controls that cannot be read fall back to the commanded ones.
        let metadata = match self.v4l2_ctl(&[
            "--get-ctrl",
            "exposure_time_absolute,gain,focus_absolute",
        ]) {
            Ok(out) => Self::parse_controls(&out),
            Err(e) => {
                log::warn!("No capture metadata: {}", e);
                CaptureMetadata::default()
            }
        };
        log::debug!("v4l2 metadata: {:?}", metadata);
        Ok(metadata)
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(mut cap) = self.cap.take() {
            cap.stop()
                .map_err(|e| TimelapseError::Camera(format!("{:?}", e)))?;
        }
        Ok(())
    }
}
