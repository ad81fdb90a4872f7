use anyhow::{bail, Context, Result};
use opencv::{imgcodecs, prelude::*};
use std::path::{Path, PathBuf};

use super::soundtrack::{self, video_only_path, Soundtrack};
use crate::decoder::{Fourcc, VideoSink};
use crate::shared::constants;
use crate::utils::file_utils::{list_files, path_str};
use crate::utils::logger::Logger;

#[derive(Debug, Clone, PartialEq)]
pub struct AssembleRequest {
    pub target: PathBuf,
    pub from_dir: PathBuf,
    pub codec: Option<String>,
    pub audio_codec: Option<String>,
    pub fps: Option<u32>,
    pub soundtrack: Option<Soundtrack>,
}

fn read_image(path: &Path) -> Result<Mat> {
    let image = imgcodecs::imread(path_str(path)?, imgcodecs::IMREAD_COLOR)?;
    if image.empty() {
        bail!("Failed to decode image: {}", path.display());
    }
    Ok(image)
}

/// Assemble every image in `from_dir` (lexical order) into a video, then
/// attach the soundtrack if one was requested. Returns the frame count.
pub fn generate_videos(request: &AssembleRequest, logger: &Logger) -> Result<u64> {
    let frames = list_files(&request.from_dir)?;
    let fps = request
        .fps
        .map(f64::from)
        .unwrap_or(constants::DEFAULT_ASSEMBLY_FPS);
    let fourcc = Fourcc::resolve(request.codec.as_deref(), &request.target)?;

    let video_path = match request.soundtrack {
        Some(_) => video_only_path(&request.target),
        None => request.target.clone(),
    };

    logger.info(&format!(
        "Assembling {} images from {} at {} fps ({})",
        frames.len(),
        request.from_dir.display(),
        fps,
        fourcc
    ));

    let first = read_image(&frames[0])?;
    let mut sink = VideoSink::create(&video_path, fourcc, fps, first.size()?)?;
    sink.write(&first)?;
    for path in &frames[1..] {
        let image = read_image(path)?;
        sink.write(&image)
            .with_context(|| format!("While adding {}", path.display()))?;
    }
    let written = sink.finish()?;

    if let Some(soundtrack) = &request.soundtrack {
        let audio_codec = request
            .audio_codec
            .as_deref()
            .unwrap_or(constants::DEFAULT_AUDIO_CODEC);
        logger.info(&format!(
            "Attaching audio {}s..{}s of {} ({})",
            soundtrack.interval.start_secs(),
            soundtrack.interval.end_secs(),
            soundtrack.source.display(),
            audio_codec
        ));
        let muxed = soundtrack::attach(&video_path, soundtrack, audio_codec, &request.target);
        let _ = std::fs::remove_file(&video_path);
        muxed?;
    }

    logger.info(&format!("Wrote {} frames to {}", written, request.target.display()));
    Ok(written)
}
