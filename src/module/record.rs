//! Append-only CSV capture log.
//!
//! One row per captured image. The header is written only when the file
//! is created.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::module::define::record::{HEADER, NA};
use crate::module::error::Result;

/// One row of the capture log.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRecord {
    pub timestamp: String,
    pub filename: String,
    pub brightness: f64,
    pub exposure_time: u64,
    pub gain: f64,
    pub focus_mode: &'static str,
    pub lens_position: Option<f64>,
}

impl CaptureRecord {
    /// Render as one CSV line without the line break.
    pub fn to_row(&self) -> String {
        let lens = match self.lens_position {
            Some(lens) => format!("{:.2}", lens),
            None => NA.to_string(),
        };
        format!(
            "{},{},{:.1},{},{:.2},{},{}",
            self.timestamp,
            self.filename,
            self.brightness,
            self.exposure_time,
            self.gain,
            self.focus_mode,
            lens
        )
    }
}

/// Handle on the capture log file.
pub struct PhotoLog {
    path: PathBuf,
}

impl PhotoLog {
    /// Open the log at `path`, creating it with a header if it does not exist.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
            writeln!(file, "{}", HEADER.join(","))?;
            log::info!("Created capture log {}", path.display());
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Append one row.
    pub fn append(&self, record: &CaptureRecord) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "{}", record.to_row())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn record() -> CaptureRecord {
        CaptureRecord {
            timestamp: "2025-04-21_21-35-00".to_string(),
            filename: "2025-04-21_21-35-00.jpg".to_string(),
            brightness: 42.349,
            exposure_time: 1_100_000,
            gain: 2.456,
            focus_mode: "fixed",
            lens_position: Some(0.4712),
        }
    }

    #[test]
    fn row_format() {
        assert_eq!(
            record().to_row(),
            "2025-04-21_21-35-00,2025-04-21_21-35-00.jpg,42.3,1100000,2.46,fixed,0.47"
        );
    }

    #[test]
    fn missing_lens_is_na() {
        let mut rec = record();
        rec.lens_position = None;
        assert!(rec.to_row().ends_with(",fixed,NA"));
    }

    #[test]
    fn header_written_once() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("photo_log.csv");

        PhotoLog::open(&path).unwrap();
        let log = PhotoLog::open(&path).unwrap();
        log.append(&record()).unwrap();
        log.append(&record()).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "timestamp,filename,brightness,exposure_time,gain,focus_mode,lens_position"
        );
        assert_eq!(contents.matches("timestamp,filename").count(), 1);
    }

    #[test]
    fn existing_log_is_appended() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("photo_log.csv");
        fs::write(&path, "timestamp,filename\nold,row\n").unwrap();

        PhotoLog::open(&path).unwrap().append(&record()).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("timestamp,filename\nold,row\n"));
        assert_eq!(contents.lines().count(), 3);
    }
}
