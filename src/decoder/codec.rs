use anyhow::{bail, Result};
use opencv::videoio;
use std::fmt;
use std::path::Path;

/// Four-character codec code understood by `VideoWriter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fourcc([char; 4]);

impl Fourcc {
    pub const MP4V: Fourcc = Fourcc(['m', 'p', '4', 'v']);
    pub const AVC1: Fourcc = Fourcc(['a', 'v', 'c', '1']);
    pub const MJPG: Fourcc = Fourcc(['M', 'J', 'P', 'G']);
    pub const VP80: Fourcc = Fourcc(['V', 'P', '8', '0']);
    pub const VP90: Fourcc = Fourcc(['V', 'P', '9', '0']);
    pub const THEO: Fourcc = Fourcc(['T', 'H', 'E', 'O']);
    pub const PNG: Fourcc = Fourcc(['p', 'n', 'g', ' ']);
    // uncompressed planar YUV
    pub const RAW: Fourcc = Fourcc(['I', '4', '2', '0']);

    pub fn code(&self) -> Result<i32> {
        let [a, b, c, d] = self.0;
        Ok(videoio::VideoWriter::fourcc(a, b, c, d)?)
    }

    /// Resolve an encoder name (ffmpeg style, e.g. `libx264`) or a literal
    /// four-character code.
    pub fn from_codec_name(name: &str) -> Result<Self> {
        let fourcc = match name.to_ascii_lowercase().as_str() {
            "libx264" | "h264" | "x264" | "avc1" => Fourcc::AVC1,
            "mpeg4" | "mp4v" => Fourcc::MP4V,
            "libvpx" | "vp8" => Fourcc::VP80,
            "libvpx-vp9" | "vp9" => Fourcc::VP90,
            "mjpeg" | "mjpg" => Fourcc::MJPG,
            "libtheora" | "theora" => Fourcc::THEO,
            "png" => Fourcc::PNG,
            "rawvideo" => Fourcc::RAW,
            _ => {
                let chars: Vec<char> = name.chars().collect();
                match chars.as_slice() {
                    [a, b, c, d] if chars.iter().all(|c| c.is_ascii()) => Fourcc([*a, *b, *c, *d]),
                    _ => bail!("Unknown codec '{}'", name),
                }
            }
        };
        Ok(fourcc)
    }

    /// Codec picked from the container extension when none is given.
    pub fn for_target(target: &Path) -> Result<Self> {
        let ext = target
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let fourcc = match ext.as_str() {
            "mp4" | "m4v" | "mov" | "mkv" => Fourcc::MP4V,
            "avi" => Fourcc::MJPG,
            "webm" => Fourcc::VP80,
            "ogv" => Fourcc::THEO,
            "" => bail!(
                "Cannot pick a codec for '{}': the target has no extension",
                target.display()
            ),
            other => bail!("Cannot pick a codec for extension '.{}'", other),
        };
        Ok(fourcc)
    }

    pub fn resolve(codec: Option<&str>, target: &Path) -> Result<Self> {
        match codec {
            Some(name) => Self::from_codec_name(name),
            None => Self::for_target(target),
        }
    }
}

impl fmt::Display for Fourcc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{}{}{}{}", a, b, c, d)
    }
}
