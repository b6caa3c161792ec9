//! Module for Constants and Paths Definitions
//!
//! This module defines various constants and paths used throughout the application.

/// System Constants
pub mod system {
    /// Name of the system
    pub const NAME: &str = "timelapse";
}

/// File Paths
pub mod path {

    // Working Directory (configuration lives here)
    pub const WORK_DIR: &str = ".";

    // Log Directory
    pub const LOG_DIR: &str = "log";

    // Configuration File
    pub const CONF_FILE: &str = "conf.toml";

    // Capture Log
    pub const PHOTO_LOG: &str = "photo_log.csv";

    // Captured Image Extension
    pub const IMG_EXT: &str = "jpg";

    // Metadata Sidecar Extension
    pub const METADATA_EXT: &str = "json";
}

/// Capture Log Format
pub mod record {
    /// Timestamp format used for file names and log rows.
    pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

    /// Header row of the capture log.
    pub const HEADER: [&str; 7] = [
        "timestamp",
        "filename",
        "brightness",
        "exposure_time",
        "gain",
        "focus_mode",
        "lens_position",
    ];

    /// Placeholder written when the lens position is unknown.
    pub const NA: &str = "NA";
}
