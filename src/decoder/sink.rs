use anyhow::{anyhow, bail, Result};
use opencv::{core, prelude::*, videoio};
use std::path::Path;

use super::codec::Fourcc;
use crate::utils::file_utils::path_str;

/// Video file writer. Every frame must match the size given at creation.
pub struct VideoSink {
    writer: videoio::VideoWriter,
    size: core::Size,
    frames_written: u64,
}

impl VideoSink {
    pub fn create(path: &Path, fourcc: Fourcc, fps: f64, size: core::Size) -> Result<Self> {
        let writer = videoio::VideoWriter::new(path_str(path)?, fourcc.code()?, fps, size, true)?;
        if !writer.is_opened()? {
            return Err(anyhow!(
                "Failed to open video writer for {} (codec {}, {}x{} @ {} fps)",
                path.display(),
                fourcc,
                size.width,
                size.height,
                fps
            ));
        }
        Ok(Self {
            writer,
            size,
            frames_written: 0,
        })
    }

    pub fn write(&mut self, frame: &Mat) -> Result<()> {
        let frame_size = frame.size()?;
        if frame_size != self.size {
            bail!(
                "Frame {} is {}x{} but the video is {}x{}",
                self.frames_written,
                frame_size.width,
                frame_size.height,
                self.size.width,
                self.size.height
            );
        }
        self.writer.write(frame)?;
        self.frames_written += 1;
        Ok(())
    }

    /// Flush and close the file, returning the number of frames written.
    pub fn finish(mut self) -> Result<u64> {
        self.writer.release()?;
        Ok(self.frames_written)
    }
}
