//! Mock camera for running the capture loop without hardware.

use image::{GrayImage, Luma};
use std::path::Path;

use super::{Camera, CaptureMetadata, Controls};
use crate::module::error::{Result, TimelapseError};

/// Writes flat gray frames and records everything it was told.
pub struct MockCamera {
    /// Gray level of each following capture; the last one repeats.
    pub levels: Vec<u8>,
    /// Metadata returned by every capture.
    pub metadata: CaptureMetadata,
    /// Controls in the order they were applied.
    pub applied: Vec<Controls>,
    /// Files written.
    pub captured: Vec<String>,
    streaming: bool,
}

impl MockCamera {
    pub fn new(levels: &[u8]) -> Self {
        Self {
            levels: levels.to_vec(),
            metadata: CaptureMetadata::default(),
            applied: vec![],
            captured: vec![],
            streaming: false,
        }
    }

    /// Report `metadata` after each capture.
    pub fn with_metadata(mut self, metadata: CaptureMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl Camera for MockCamera {
    fn apply(&mut self, controls: &Controls) -> Result<()> {
        self.applied.push(controls.clone());
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
        let idx = self.captured.len().min(self.levels.len().saturating_sub(1));
        let level = self.levels.get(idx).copied().unwrap_or(0);
        GrayImage::from_pixel(32, 24, Luma([level])).save(path)?;
        self.captured.push(path.to_string_lossy().into_owned());
        Ok(self.metadata.clone())
    }

    fn stop(&mut self) -> Result<()> {
        self.streaming = false;
        Ok(())
    }
}
