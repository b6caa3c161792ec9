//! libcamera still capture through `rpicam-still`.
//!
//! Every capture is one run of the command; the controls queued with
//! [`Camera::apply`] become its arguments and the JSON metadata sidecar it
//! writes is read back and removed.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{AfMode, Camera, CaptureMetadata, Controls};
use crate::module::define;
use crate::module::error::{Result, TimelapseError};
use crate::module::util::conf;

/// libcamera backend.
pub struct RpiCam {
    conf: conf::Camera,
    settle_ms: u64, // Preview time for AE/AF before an auto capture.
    controls: Controls,
    streaming: bool,
}

impl RpiCam {
    pub fn new(conf: conf::Camera, settle_secs: f64) -> Self {
        Self {
            conf,
            // `-t 0` would preview forever.
            settle_ms: ((settle_secs * 1000.0).round() as u64).max(1),
            controls: Controls::auto(),
            streaming: false,
        }
    }

    /// Sidecar file the metadata of `image` is written to.
    pub fn metadata_path(image: &Path) -> PathBuf {
        image.with_extension(define::path::METADATA_EXT)
    }

    /// Command line arguments for one capture.
    pub fn build_args(&self, image: &Path, metadata: &Path) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-n".into(),
            "-o".into(),
            image.to_string_lossy().into_owned(),
            "--metadata".into(),
            metadata.to_string_lossy().into_owned(),
            "--metadata-format".into(),
            "json".into(),
            "-q".into(),
            self.conf.quality.to_string(),
        ];
        // Auto algorithms converge during the preview; fixed shots skip it.
        if self.controls.ae_enable || self.controls.af_mode == AfMode::Auto {
            args.extend(["-t".to_string(), self.settle_ms.to_string()]);
        } else {
            args.push("--immediate".to_string());
        }
        if self.conf.width > 0 && self.conf.height > 0 {
            args.extend([
                "--width".to_string(),
                self.conf.width.to_string(),
                "--height".to_string(),
                self.conf.height.to_string(),
            ]);
        }
        match self.controls.af_mode {
            AfMode::Auto => {
                args.extend(["--autofocus-mode".to_string(), "auto".to_string()]);
                args.push("--autofocus-on-capture".to_string());
            }
            AfMode::Manual => {
                args.extend(["--autofocus-mode".to_string(), "manual".to_string()]);
                if let Some(lens) = self.controls.lens_position {
                    args.extend(["--lens-position".to_string(), lens.to_string()]);
                }
            }
        }
        // Leaving these out keeps the AE/AGC algorithm in charge.
        if !self.controls.ae_enable {
            if let Some(exposure) = self.controls.exposure_time {
                args.extend(["--shutter".to_string(), exposure.to_string()]);
            }
            if let Some(gain) = self.controls.analogue_gain {
                args.extend(["--gain".to_string(), gain.to_string()]);
            }
        }
        args
    }

    /// Parse the metadata sidecar written by `rpicam-still`.
    pub fn parse_metadata(json: &str) -> Result<CaptureMetadata> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Camera for RpiCam {
    fn apply(&mut self, controls: &Controls) -> Result<()> {
        log::debug!("libcamera controls: {:?}", controls);
        self.controls = controls.clone();
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        self.streaming = true;
        Ok(())
    }

    fn capture_file(&mut self, path: &Path) -> Result<CaptureMetadata> {
        if !self.streaming {
            return Err(TimelapseError::Camera("capture before start".to_string()));
        }
        let metadata_path = Self::metadata_path(path);
        let args = self.build_args(path, &metadata_path);
        log::debug!("{} {}", self.conf.command, args.join(" "));

        let output = Command::new(&self.conf.command).args(&args).output()?;
        if !output.status.success() {
            return Err(TimelapseError::Camera(format!(
                "{} exited with {}: {}",
                self.conf.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        // No sidecar means no metadata, the caller falls back to what it asked for.
        let metadata = match fs::read_to_string(&metadata_path) {
            Ok(json) => {
                fs::remove_file(&metadata_path)?;
                Self::parse_metadata(&json)?
            }
            Err(e) => {
                log::warn!("No capture metadata: {}", e);
                CaptureMetadata::default()
            }
        };
        log::debug!("libcamera metadata: {:?}", metadata);
        Ok(metadata)
    }

    fn stop(&mut self) -> Result<()> {
        self.streaming = false;
        Ok(())
    }
}
