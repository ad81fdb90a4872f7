use anyhow::{bail, Result};
use opencv::{core, imgcodecs};
use std::path::PathBuf;

use super::timing::FrameSampler;
use crate::decoder::VideoSource;
use crate::shared::constants;
use crate::utils::file_utils::{ensure_dir, path_str};
use crate::utils::logger::Logger;

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractRequest {
    pub source: PathBuf,
    pub target_dir: PathBuf,
    pub fps: Option<u32>,
}

/// Decode `source` into `target_dir/frame%05d.png`, resampled to `fps`
/// when given. Returns the number of images written.
pub fn generate_images(request: &ExtractRequest, logger: &Logger) -> Result<u64> {
    let mut source = VideoSource::open(&request.source)?;
    ensure_dir(&request.target_dir)?;

    let sampler = FrameSampler::new(source.fps(), request.fps.map(f64::from));
    logger.info(&format!(
        "Extracting frames from {} ({:.2} fps) at {} fps into {}",
        request.source.display(),
        source.fps(),
        request
            .fps
            .map(|fps| fps.to_string())
            .unwrap_or_else(|| "source".to_string()),
        request.target_dir.display()
    ));

    let params = core::Vector::<i32>::new();
    let mut written: u64 = 0;
    let mut source_index: u64 = 0;
    while let Some(frame) = source.read_frame()? {
        for _ in 0..sampler.copies_of(source_index) {
            let path = request
                .target_dir
                .join(constants::frame_file_name(written as usize));
            if !imgcodecs::imwrite(path_str(&path)?, &frame, &params)? {
                bail!("Failed to write image: {}", path.display());
            }
            written += 1;
        }
        source_index += 1;
    }

    logger.info(&format!(
        "Wrote {} images from {} decoded frames",
        written, source_index
    ));
    Ok(written)
}
