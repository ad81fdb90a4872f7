use anyhow::{anyhow, bail, Context, Result};
use opencv::core::Rect;
use std::ops::Range;
use std::str::FromStr;

// Absorbs float noise when converting seconds to frame indices.
const FRAME_EPSILON: f64 = 1e-9;

/// A `(minutes, seconds)` point in a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub minutes: u32,
    pub seconds: u32,
}

impl Timestamp {
    pub fn as_secs(&self) -> f64 {
        self.minutes as f64 * 60.0 + self.seconds as f64
    }
}

impl FromStr for Timestamp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (minutes, seconds) = s
            .split_once(',')
            .ok_or_else(|| anyhow!("expected 'minutes,seconds', got '{}'", s))?;
        Ok(Self {
            minutes: minutes
                .trim()
                .parse()
                .with_context(|| format!("bad minutes in '{}'", s))?,
            seconds: seconds
                .trim()
                .parse()
                .with_context(|| format!("bad seconds in '{}'", s))?,
        })
    }
}

/// Clip interval written as `m0,s0:m1,s1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Interval {
    pub fn start_secs(&self) -> f64 {
        self.start.as_secs()
    }

    pub fn end_secs(&self) -> f64 {
        self.end.as_secs()
    }

    pub fn duration_secs(&self) -> f64 {
        self.end_secs() - self.start_secs()
    }

    /// Source frame indices whose timestamps fall in `[start, end)`.
    pub fn frame_range(&self, fps: f64) -> Range<u64> {
        let first = (self.start_secs() * fps - FRAME_EPSILON).ceil().max(0.0) as u64;
        let last = (self.end_secs() * fps - FRAME_EPSILON).ceil().max(0.0) as u64;
        first..last.max(first)
    }
}

impl FromStr for Interval {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (start, end) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("expected 'm0,s0:m1,s1', got '{}'", s))?;
        let interval = Self {
            start: start.parse()?,
            end: end.parse()?,
        };
        if interval.end_secs() <= interval.start_secs() {
            bail!("interval '{}' ends before it starts", s);
        }
        Ok(interval)
    }
}

/// Crop rectangle written as `x1,y1:x2,y2` (top-left, bottom-right).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl CropRect {
    /// Pixel rectangle. No bounds checking: OpenCV rejects rectangles that
    /// are empty or leave the frame.
    pub fn to_rect(&self) -> Rect {
        let x = self.x1 as i32;
        let y = self.y1 as i32;
        Rect::new(x, y, self.x2 as i32 - x, self.y2 as i32 - y)
    }
}

fn parse_point(s: &str) -> Result<(f64, f64)> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| anyhow!("expected 'x,y', got '{}'", s))?;
    Ok((
        x.trim().parse().with_context(|| format!("bad x in '{}'", s))?,
        y.trim().parse().with_context(|| format!("bad y in '{}'", s))?,
    ))
}

impl FromStr for CropRect {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (top_left, bottom_right) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("expected 'x1,y1:x2,y2', got '{}'", s))?;
        let (x1, y1) = parse_point(top_left)?;
        let (x2, y2) = parse_point(bottom_right)?;
        Ok(Self { x1, y1, x2, y2 })
    }
}

/// Maps a source frame stream onto an output frame rate.
///
/// Output frame `i` shows the source frame on screen at `t = i / out_fps`,
/// so downsampling drops frames and upsampling repeats them.
#[derive(Debug, Clone, Copy)]
pub struct FrameSampler {
    ratio: f64,
}

impl FrameSampler {
    pub fn new(source_fps: f64, output_fps: Option<f64>) -> Self {
        let ratio = match output_fps {
            Some(out) => out / source_fps,
            None => 1.0,
        };
        Self { ratio }
    }

    fn outputs_before(&self, source_index: u64) -> u64 {
        (source_index as f64 * self.ratio - FRAME_EPSILON).ceil().max(0.0) as u64
    }

    /// How many output frames source frame `source_index` becomes.
    pub fn copies_of(&self, source_index: u64) -> u64 {
        self.outputs_before(source_index + 1) - self.outputs_before(source_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval() {
        let interval: Interval = "0,10:1,20".parse().unwrap();
        assert_eq!(interval.start, Timestamp { minutes: 0, seconds: 10 });
        assert_eq!(interval.end_secs(), 80.0);
        assert_eq!(interval.duration_secs(), 70.0);
    }

    #[test]
    fn test_parse_interval_rejects_garbage() {
        assert!("0,10".parse::<Interval>().is_err());
        assert!("0,10:x,20".parse::<Interval>().is_err());
        assert!("0,20:0,10".parse::<Interval>().is_err());
        assert!("0,10:0,10".parse::<Interval>().is_err());
    }

    #[test]
    fn test_frame_range() {
        let interval: Interval = "0,10:0,20".parse().unwrap();
        assert_eq!(interval.frame_range(30.0), 300..600);
        // 29.97 fps: frame 300 sits at 10.01s, the first one inside
        assert_eq!(interval.frame_range(29.97), 300..600);
        assert_eq!(interval.frame_range(25.0).count(), 250);
    }

    #[test]
    fn test_parse_crop_rect() {
        let rect: CropRect = "0,0:100.5,50".parse().unwrap();
        assert_eq!(rect.to_rect(), Rect::new(0, 0, 100, 50));
        let rect: CropRect = "10,20:110,70".parse().unwrap();
        assert_eq!(rect.to_rect(), Rect::new(10, 20, 100, 50));
        assert!("10,20".parse::<CropRect>().is_err());
    }

    #[test]
    fn test_sampler_identity() {
        let sampler = FrameSampler::new(30.0, None);
        assert!((0..100).all(|k| sampler.copies_of(k) == 1));
        let sampler = FrameSampler::new(25.0, Some(25.0));
        assert!((0..100).all(|k| sampler.copies_of(k) == 1));
    }

    #[test]
    fn test_sampler_downsamples() {
        let sampler = FrameSampler::new(30.0, Some(10.0));
        let copies: Vec<u64> = (0..6).map(|k| sampler.copies_of(k)).collect();
        assert_eq!(copies, vec![1, 0, 0, 1, 0, 0]);
        let total: u64 = (0..300).map(|k| sampler.copies_of(k)).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn test_sampler_upsamples() {
        let sampler = FrameSampler::new(10.0, Some(30.0));
        assert!((0..10).all(|k| sampler.copies_of(k) == 3));
    }
}
