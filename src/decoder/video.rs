use anyhow::{anyhow, Result};
use opencv::{prelude::*, videoio};
use std::path::Path;

use crate::utils::file_utils::path_str;

/// Sequential reader over a video file.
pub struct VideoSource {
    capture: videoio::VideoCapture,
    fps: f64,
    frame_count: u64,
}

impl VideoSource {
    pub fn open(path: &Path) -> Result<Self> {
        // CAP_ANY lets OpenCV pick the backend (FFmpeg/GStreamer on Linux)
        let capture = videoio::VideoCapture::from_file(path_str(path)?, videoio::CAP_ANY)?;

        if !capture.is_opened()? {
            return Err(anyhow!("Failed to open video file: {}", path.display()));
        }

        let fps = capture.get(videoio::CAP_PROP_FPS)?;
        if !(fps.is_finite() && fps > 0.0) {
            return Err(anyhow!(
                "Video {} reports an unusable frame rate: {}",
                path.display(),
                fps
            ));
        }
        let frame_count = capture.get(videoio::CAP_PROP_FRAME_COUNT)?.max(0.0) as u64;

        Ok(Self {
            capture,
            fps,
            frame_count,
        })
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Container-reported frame count; may be approximate for some formats.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn duration_secs(&self) -> f64 {
        self.frame_count as f64 / self.fps
    }

    /// Position the reader so the next `read_frame` returns frame `index`.
    pub fn seek_frame(&mut self, index: u64) -> Result<()> {
        if index == 0 {
            return Ok(());
        }
        if !self.capture.set(videoio::CAP_PROP_POS_FRAMES, index as f64)? {
            return Err(anyhow!("Seeking to frame {} is not supported by this backend", index));
        }
        Ok(())
    }

    /// Next decoded frame (BGR), or `None` at end of stream.
    pub fn read_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? {
            return Ok(None);
        }
        if frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }
}
