use anyhow::{bail, Context, Result};
use opencv::prelude::*;
use std::path::PathBuf;

use super::soundtrack::{self, video_only_path, Soundtrack};
use super::timing::{CropRect, Interval};
use crate::decoder::{Fourcc, VideoSink, VideoSource};
use crate::shared::constants;
use crate::utils::logger::Logger;

#[derive(Debug, Clone, PartialEq)]
pub struct CutRequest {
    pub source: PathBuf,
    pub target: PathBuf,
    pub interval: Interval,
    pub rect: CropRect,
}

impl CutRequest {
    /// The source's own audio over the cut interval.
    pub fn soundtrack(&self) -> Soundtrack {
        Soundtrack {
            source: self.source.clone(),
            interval: self.interval,
        }
    }
}

/// Copy the frames of `interval`, cropped to `rect`, into `target` at the
/// source frame rate, keeping the source's audio for the same interval when
/// it has any. Returns the number of frames written.
pub fn cut(request: &CutRequest, logger: &Logger) -> Result<u64> {
    let mut source = VideoSource::open(&request.source)?;
    let fps = source.fps();
    let frames = request.interval.frame_range(fps);

    if source.frame_count() > 0 && frames.start >= source.frame_count() {
        bail!(
            "Interval starts at {}s but {} is only {:.2}s long",
            request.interval.start_secs(),
            request.source.display(),
            source.duration_secs()
        );
    }

    let rect = request.rect.to_rect();
    let fourcc = Fourcc::for_target(&request.target)?;
    logger.info(&format!(
        "Cutting {} frames {}..{} of {} to {}x{}+{}+{}",
        frames.end - frames.start,
        frames.start,
        frames.end,
        request.source.display(),
        rect.width,
        rect.height,
        rect.x,
        rect.y
    ));

    let video_path = video_only_path(&request.target);
    source.seek_frame(frames.start)?;
    let mut sink = VideoSink::create(&video_path, fourcc, fps, rect.size())?;
    for _ in frames.clone() {
        let Some(frame) = source.read_frame()? else {
            logger.debug("Source ended before the interval did");
            break;
        };
        let mut cropped = Mat::default();
        Mat::roi(&frame, rect)?.copy_to(&mut cropped)?;
        sink.write(&cropped)?;
    }

    let written = sink.finish()?;

    let with_audio = match soundtrack::has_audio(&request.source) {
        Ok(found) => found,
        Err(e) => {
            logger.warning(&format!("Keeping the picture track only: {:#}", e));
            false
        }
    };
    if with_audio {
        logger.info(&format!(
            "Attaching audio {}s..{}s of {} ({})",
            request.interval.start_secs(),
            request.interval.end_secs(),
            request.source.display(),
            constants::DEFAULT_AUDIO_CODEC
        ));
        let muxed = soundtrack::attach(
            &video_path,
            &request.soundtrack(),
            constants::DEFAULT_AUDIO_CODEC,
            &request.target,
        );
        let _ = std::fs::remove_file(&video_path);
        muxed?;
    } else {
        logger.debug("Source has no audio stream");
        std::fs::rename(&video_path, &request.target)
            .with_context(|| format!("Failed to move {:?} to {:?}", video_path, request.target))?;
    }

    logger.info(&format!("Wrote {} frames to {}", written, request.target.display()));
    Ok(written)
}
