use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::timing::Interval;

/// Audio to lay under an assembled video: `interval` of `source`'s audio.
#[derive(Debug, Clone, PartialEq)]
pub struct Soundtrack {
    pub source: PathBuf,
    pub interval: Interval,
}

/// Path the picture-only video is written to before the soundtrack is muxed
/// in: `out.mp4` becomes `out.video-only.mp4`.
pub fn video_only_path(target: &Path) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = match target.extension() {
        Some(ext) => format!("{}.video-only.{}", stem, ext.to_string_lossy()),
        None => format!("{}.video-only", stem),
    };
    target.with_file_name(name)
}

/// `ffprobe` arguments listing the audio streams of `source`, one index per line.
pub fn probe_args(source: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-select_streams".to_string(),
        "a".to_string(),
        "-show_entries".to_string(),
        "stream=index".to_string(),
        "-of".to_string(),
        "csv=p=0".to_string(),
        source.to_string_lossy().to_string(),
    ]
}

/// Whether `source` carries at least one audio stream, asked of the system
/// `ffprobe`.
pub fn has_audio(source: &Path) -> Result<bool> {
    let output = Command::new("ffprobe")
        .args(probe_args(source))
        .stdin(Stdio::null())
        .output()
        .context("Failed to run ffprobe; is it installed and on PATH?")?;

    if !output.status.success() {
        bail!(
            "ffprobe failed with exit code {:?}: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
}

/// Arguments for muxing `video` (picture only) with the soundtrack into
/// `target`. The video stream is copied; audio is encoded with `audio_codec`.
pub fn mux_args(video: &Path, soundtrack: &Soundtrack, audio_codec: &str, target: &Path) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-y".to_string(),
        "-i".to_string(),
        video.to_string_lossy().to_string(),
        "-ss".to_string(),
        format!("{}", soundtrack.interval.start_secs()),
        "-t".to_string(),
        format!("{}", soundtrack.interval.duration_secs()),
        "-i".to_string(),
        soundtrack.source.to_string_lossy().to_string(),
        "-map".to_string(),
        "0:v:0".to_string(),
        "-map".to_string(),
        "1:a:0".to_string(),
        "-c:v".to_string(),
        "copy".to_string(),
        "-c:a".to_string(),
        audio_codec.to_string(),
        "-shortest".to_string(),
        target.to_string_lossy().to_string(),
    ]
}

/// Runs the system `ffmpeg` to attach the soundtrack.
pub fn attach(video: &Path, soundtrack: &Soundtrack, audio_codec: &str, target: &Path) -> Result<()> {
    if !soundtrack.source.exists() {
        bail!("Audio source not found: {}", soundtrack.source.display());
    }

    let output = Command::new("ffmpeg")
        .args(mux_args(video, soundtrack, audio_codec, target))
        .stdin(Stdio::null())
        .output()
        .context("Failed to run ffmpeg; is it installed and on PATH?")?;

    if !output.status.success() {
        bail!(
            "ffmpeg failed with exit code {:?}: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}
