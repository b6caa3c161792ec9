//! Config Handler.

use serde::{Deserialize, Serialize};

use crate::module::error::{Result, TimelapseError};

/// Provides TOML config file handling.
pub mod toml {

    use super::DEFAULT_CONFIG;
    use crate::module::define;
    use crate::module::error::Result;
    use std::fs::File;
    use std::io::prelude::*;
    use std::path::Path;

    /// Loads a configuration file from the given directory.
    /// If not found, generates a default config file.
    ///
    /// # Arguments
    ///
    /// * `dir` - The directory where the configuration file is located or should be created.
    ///
    pub fn load(dir: &str) -> Result<super::Config> {
        // Check if the config file exists
        let path = Path::new(dir).join(define::path::CONF_FILE);

        if !path.is_file() {
            // Create the default config if it doesn't exist
            let config: super::Config = toml::from_str(DEFAULT_CONFIG)?;
            save(dir, &config)?;
            log::info!("Default config written to {}", path.display());
        }

        // Load the config
        let conf_str: String = std::fs::read_to_string(&path)?;
        let conf: super::Config = toml::from_str(&conf_str)?;
        Ok(conf)
    }

    /// Saves a configuration file to the given directory.
    ///
    /// # Arguments
    ///
    /// * `dir` - The directory where the configuration file should be saved.
    /// * `conf` - The configuration data to be saved.
    ///
    pub fn save(dir: &str, conf: &super::Config) -> Result<()> {
        let toml_str = toml::to_string(conf)?;
        let path = crate::module::util::path::join(&[dir, define::path::CONF_FILE]);
        let mut file = File::create(path)?;
        file.write_all(toml_str.as_bytes())?;
        Ok(())
    }
}

/// Represents the configuration data structure.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub system: System,
    pub camera: Camera,
    pub exposure: Exposure,
    pub proportional: Proportional,
    pub multiplicative: Multiplicative,
    pub focus: Focus,
    pub timelapse: Timelapse,
}

impl Config {
    /// Reject values the capture loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        let t = &self.timelapse;
        for (name, secs) in [
            ("timelapse.settle_secs", t.settle_secs),
            ("timelapse.exposure_buffer_secs", t.exposure_buffer_secs),
        ] {
            if !secs.is_finite() || secs < 0.0 {
                return invalid(format!("{} must be a non-negative number, got {}", name, secs));
            }
        }

        let e = &self.exposure;
        if !(e.target_brightness.is_finite() && e.target_brightness > 0.0) {
            return invalid(format!(
                "exposure.target_brightness must be positive, got {}",
                e.target_brightness
            ));
        }
        if !(e.tolerance.is_finite() && e.tolerance >= 0.0) {
            return invalid(format!(
                "exposure.tolerance must be non-negative, got {}",
                e.tolerance
            ));
        }
        for (name, max) in [
            ("proportional", self.proportional.max_exposure_time),
            ("multiplicative", self.multiplicative.max_exposure_time),
        ] {
            if e.min_exposure_time > max {
                return invalid(format!(
                    "exposure.min_exposure_time {} exceeds {}.max_exposure_time {}",
                    e.min_exposure_time, name, max
                ));
            }
        }
        if !self.proportional.k.is_finite() {
            return invalid(format!("proportional.k must be finite, got {}", self.proportional.k));
        }

        let m = &self.multiplicative;
        if !(m.min_gain.is_finite() && m.max_gain.is_finite() && m.min_gain <= m.max_gain) {
            return invalid(format!(
                "multiplicative.min_gain {} exceeds max_gain {}",
                m.min_gain, m.max_gain
            ));
        }
        if !(m.exposure_factor.is_finite() && m.exposure_factor > 0.0)
            || !(m.gain_factor.is_finite() && m.gain_factor > 0.0)
        {
            return invalid("multiplicative factors must be positive".to_string());
        }
        Ok(())
    }
}

fn invalid(msg: String) -> Result<()> {
    Err(TimelapseError::InvalidConfig(msg))
}

impl Default for Config {
    fn default() -> Self {
        // The embedded document is covered by tests.
        match ::toml::from_str(DEFAULT_CONFIG) {
            Ok(conf) => conf,
            Err(e) => panic!("Embedded default config is invalid: {}", e),
        }
    }
}

/// Represents system-related configuration parameters.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct System {
    pub output_dir: String,
    pub log_level: String,
}

/// Represents camera-related configuration parameters.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Camera {
    pub backend: String,
    pub command: String,
    pub device: String,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

/// Represents parameters shared by both exposure controllers.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Exposure {
    pub controller: String,
    pub initial_exposure_time: u64,
    pub initial_gain: f64,
    pub initial_brightness: f64,
    pub target_brightness: f64,
    pub tolerance: f64,
    pub min_exposure_time: u64,
}

/// Represents proportional controller parameters.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Proportional {
    pub k: f64,
    pub max_exposure_time: u64,
}

/// Represents multiplicative controller parameters.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Multiplicative {
    pub max_exposure_time: u64,
    pub exposure_factor: f64,
    pub gain_factor: f64,
    pub min_gain: f64,
    pub max_gain: f64,
}

/// Represents focus-related configuration parameters.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Focus {
    pub lens_position: f64,
}

/// Represents loop pacing parameters.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Timelapse {
    pub interval_secs: u64,
    pub settle_secs: f64,
    pub exposure_buffer_secs: f64,
    pub max_cycles: u64,
}

// Default configuration data in TOML format
const DEFAULT_CONFIG: &str = r#"
[system]
  output_dir = '.' # Directory for images, the capture log and log/
  log_level = 'INFO' # Log level ('DEBUG', 'INFO', 'WARN', 'ERROR')

[camera]
  backend = 'libcamera' # Camera backend ('libcamera', 'v4l2')
  command = 'rpicam-still' # Still capture command for the libcamera backend
  device = '/dev/video0' # Device node for the v4l2 backend
  width = 0 # Image width (0 for sensor default)
  height = 0 # Image height (0 for sensor default)
  quality = 93 # JPEG quality

[exposure]
  controller = 'proportional' # Exposure controller ('proportional', 'multiplicative')
  initial_exposure_time = 100000 # Initial exposure time in microseconds (0.1 s)
  initial_gain = 1.0 # Initial analogue gain
  initial_brightness = 100.0 # Brightness assumed before the first capture
  target_brightness = 100.0 # Ideal mean brightness (0-255)
  tolerance = 10.0 # Allowable range around the target
  min_exposure_time = 10000 # Shortest exposure time in microseconds

[proportional]
  k = 1000000.0 # Microseconds added per unit of normalized error
  max_exposure_time = 111000000 # Longest exposure time in microseconds

[multiplicative]
  max_exposure_time = 8000000 # Longest exposure time in microseconds
  exposure_factor = 1.5 # Exposure step per cycle
  gain_factor = 1.2 # Gain step per cycle
  min_gain = 1.0 # Lowest analogue gain
  max_gain = 8.0 # Highest analogue gain

[focus]
  lens_position = 0.47 # Fixed lens position for night shots (dioptres)

[timelapse]
  interval_secs = 300 # Wait between shots
  settle_secs = 2.0 # Settle delay for autoexposure and autofocus
  exposure_buffer_secs = 1.0 # Extra wait after a fixed exposure
  max_cycles = 0 # Number of shots to take (0 for forever)
"#;
