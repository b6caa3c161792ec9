//! Path Operations Module
//!
//! This module handles path operations for directories and files.

use std::path::{Path, PathBuf};

/// Join Paths
///
/// This function takes a slice of strings as input and joins them into a single path string.
/// It uses the PathBuf type to handle platform-specific separators and conversions.
pub fn join(paths: &[&str]) -> String {
    let mut path: PathBuf = PathBuf::new();
    for p in paths {
        path.push(p);
    }
    path.to_string_lossy().into_owned()
}

pub mod dir {
    //! Directory Operations Submodule
    //!
    //! This submodule provides functions for directory operations.

    use std::fs;
    use std::path::Path;

    use super::{TimelapseDir, TimelapseFile, TimelapsePath};
    use crate::module::define;
    use crate::module::error::Result;

    /// Create Directory from Path List
    ///
    /// This function takes a slice of strings as input and creates a directory with the joined path.
    /// It returns the joined path once the directory exists.
    pub fn create_dir_from_path_list(paths: &[&str]) -> Result<String> {
        let path = super::join(paths);
        fs::create_dir_all(Path::new(&path))?;
        Ok(path)
    }

    /// Create Application Directories and Paths
    ///
    /// Creates the output directory and its `log` subdirectory and
    /// returns the paths of everything the capture loop writes.
    pub fn create_app_sub_dir(output_dir: &str) -> Result<TimelapsePath> {
        let out_dir = create_dir_from_path_list(&[output_dir])?;
        let log_dir = create_dir_from_path_list(&[&out_dir, define::path::LOG_DIR])?;
        let photo_log = super::join(&[&out_dir, define::path::PHOTO_LOG]);
        Ok(TimelapsePath {
            dir: TimelapseDir {
                out: out_dir,
                log: log_dir,
            },
            file: TimelapseFile { photo_log },
        })
    }
}

/// Paths of Resources
///
/// This struct represents the paths of the resources used by the application.
#[derive(Debug, Clone)]
pub struct TimelapsePath {
    /// Directories Paths
    pub dir: TimelapseDir,
    /// Files Paths
    pub file: TimelapseFile,
}

impl TimelapsePath {
    /// File name of the capture taken at `timestamp`.
    pub fn image_name(timestamp: &str) -> String {
        format!("{}.{}", timestamp, crate::module::define::path::IMG_EXT)
    }

    /// Full path of the capture taken at `timestamp`.
    pub fn image_path(&self, timestamp: &str) -> PathBuf {
        Path::new(&self.dir.out).join(Self::image_name(timestamp))
    }
}

/// Paths of Directories
#[derive(Debug, Clone)]
pub struct TimelapseDir {
    /// Output Directory Path (images and capture log)
    pub out: String,
    /// Log Directory Path
    pub log: String,
}

/// Paths of Files
#[derive(Debug, Clone)]
pub struct TimelapseFile {
    /// Capture Log Path
    pub photo_log: String,
}
