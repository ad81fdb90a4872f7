use std::path::PathBuf;
use std::str::FromStr;

use super::args::{ArgsError, FlagMap};
use crate::core::{AssembleRequest, CropRect, CutRequest, ExtractRequest, Interval, Soundtrack};

/// A validated handler invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Cut(CutRequest),
    GenerateImages(ExtractRequest),
    GenerateVideos(AssembleRequest),
    Examples,
    Unsupported(String),
}

fn parse_value<T>(flag: &'static str, value: &str) -> Result<T, ArgsError>
where
    T: FromStr<Err = anyhow::Error>,
{
    value.parse().map_err(|e: anyhow::Error| ArgsError::InvalidValue {
        flag,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// `--interval`, or the legacy `--internal` spelling.
fn interval(flags: &FlagMap) -> Result<Interval, ArgsError> {
    match flags.get("interval") {
        Some(value) => parse_value("interval", value),
        None => parse_value("internal", flags.require("internal")?),
    }
}

impl Task {
    /// Validate the flag list, then build the request for `task`.
    ///
    /// Flag validation runs before the task name is looked at, so a bad
    /// argument list is reported even for an unknown task.
    pub fn from_args<S: AsRef<str>>(task: &str, tokens: &[S]) -> Result<Self, ArgsError> {
        let flags = FlagMap::parse(tokens)?;
        let fps = flags.fps()?;

        let task = match task {
            "cut" => Task::Cut(CutRequest {
                source: PathBuf::from(flags.require("source")?),
                target: PathBuf::from(flags.require("target")?),
                interval: interval(&flags)?,
                rect: parse_value::<CropRect>("coordinates", flags.require("coordinates")?)?,
            }),
            "generate_images" => Task::GenerateImages(ExtractRequest {
                source: PathBuf::from(flags.require("source")?),
                target_dir: PathBuf::from(flags.require("target_dir")?),
                fps,
            }),
            "generate_videos" => {
                let soundtrack = if flags.audio() {
                    Some(Soundtrack {
                        source: PathBuf::from(flags.require("source")?),
                        interval: interval(&flags)?,
                    })
                } else {
                    None
                };
                Task::GenerateVideos(AssembleRequest {
                    target: PathBuf::from(flags.require("target")?),
                    from_dir: PathBuf::from(flags.require("from_dir")?),
                    codec: flags.get("codec").map(String::from),
                    audio_codec: flags.get("audio_codec").map(String::from),
                    fps,
                    soundtrack,
                })
            }
            "examples" => Task::Examples,
            other => Task::Unsupported(other.to_string()),
        };
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_cut_task() {
        let task = Task::from_args(
            "cut",
            &tokens("--source a.mp4 --target b.mp4 --internal 0,10:0,20 --coordinates 0,0:100,100"),
        )
        .unwrap();
        let Task::Cut(request) = task else {
            panic!("expected a cut task");
        };
        assert_eq!(request.source, PathBuf::from("a.mp4"));
        assert_eq!(request.interval.start_secs(), 10.0);
        assert_eq!(request.rect.x2, 100.0);
    }

    #[test]
    fn test_interval_spelling_preferred_over_legacy() {
        let task = Task::from_args(
            "cut",
            &tokens("--source a --target b.mp4 --internal 0,1:0,2 --interval 0,3:0,4 --coordinates 0,0:1,1"),
        )
        .unwrap();
        let Task::Cut(request) = task else {
            panic!("expected a cut task");
        };
        assert_eq!(request.interval.start_secs(), 3.0);
    }

    #[test]
    fn test_generate_images_fps_truncated() {
        let task = Task::from_args(
            "generate_images",
            &tokens("--source a.mp4 --target_dir out --fps 29.7"),
        )
        .unwrap();
        assert_eq!(
            task,
            Task::GenerateImages(ExtractRequest {
                source: PathBuf::from("a.mp4"),
                target_dir: PathBuf::from("out"),
                fps: Some(29),
            })
        );
    }

    #[test]
    fn test_generate_videos_silent_ignores_audio_flags() {
        let task = Task::from_args(
            "generate_videos",
            &tokens("--target out.mp4 --from_dir frames --codec libx264 --audio false"),
        )
        .unwrap();
        let Task::GenerateVideos(request) = task else {
            panic!("expected a generate_videos task");
        };
        assert_eq!(request.soundtrack, None);
        assert_eq!(request.codec.as_deref(), Some("libx264"));
        assert_eq!(request.fps, None);
    }

    #[test]
    fn test_generate_videos_with_audio_needs_source() {
        let err = Task::from_args(
            "generate_videos",
            &tokens("--target out.mp4 --from_dir frames --audio True --internal 0,1:0,2"),
        )
        .unwrap_err();
        assert_eq!(err, ArgsError::MissingFlag("source"));

        let task = Task::from_args(
            "generate_videos",
            &tokens("--target out.mp4 --from_dir frames --audio True --source a.mp4 --internal 0,1:0,2"),
        )
        .unwrap();
        let Task::GenerateVideos(request) = task else {
            panic!("expected a generate_videos task");
        };
        assert_eq!(request.soundtrack.unwrap().source, PathBuf::from("a.mp4"));
    }

    #[test]
    fn test_unknown_task_is_not_an_error() {
        let task = Task::from_args("transcode", &tokens("--source a.mp4")).unwrap();
        assert_eq!(task, Task::Unsupported("transcode".to_string()));
    }

    #[test]
    fn test_arguments_validated_before_task_lookup() {
        assert_eq!(
            Task::from_args("transcode", &tokens("--source")),
            Err(ArgsError::OddLength(1))
        );
        assert_eq!(
            Task::from_args("examples", &tokens("source a.mp4")),
            Err(ArgsError::MalformedFlag("source".to_string()))
        );
    }

    #[test]
    fn test_bad_interval_reported_with_flag() {
        let err = Task::from_args(
            "cut",
            &tokens("--source a --target b.mp4 --internal 10:20 --coordinates 0,0:1,1"),
        )
        .unwrap_err();
        assert!(matches!(err, ArgsError::InvalidValue { flag: "internal", .. }));
    }
}
