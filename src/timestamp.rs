//! Wall-clock timestamps checked against the actual length of a video.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::audio::MediaProbe;
use crate::error::ValidationError;

fn timestamp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<h>[0-9]{2}):(?P<m>[0-9]{2}):(?P<s>[0-9]{2})$")
            .expect("timestamp regex is valid")
    })
}

/// A `HH:MM:SS` point in time known to lie within a specific video.
#[derive(Debug, Clone, PartialEq)]
pub struct Timestamp {
    raw: String,
    seconds: u32,
    video: PathBuf,
}

impl Timestamp {
    /// Validate `raw` against the video at `video`.
    ///
    /// The shape and field ranges are checked before the video is probed, so
    /// `24:00:00` is rejected without touching the file.
    pub fn parse(
        raw: &str,
        video: &Path,
        probe: &dyn MediaProbe,
    ) -> Result<Self, ValidationError> {
        let caps = timestamp_regex()
            .captures(raw)
            .ok_or(ValidationError::PatternMismatch)?;

        // Two ASCII digits each, so these cannot fail.
        let field = |name: &str| caps[name].parse::<u32>().unwrap_or(u32::MAX);
        let (hours, minutes, seconds) = (field("h"), field("m"), field("s"));

        if hours > 23 || minutes > 59 || seconds > 59 {
            return Err(ValidationError::OutOfRange);
        }

        let total = hours * 3600 + minutes * 60 + seconds;

        let duration = probe
            .duration(video)
            .map_err(|e| ValidationError::VideoRead(e.to_string()))?;

        if f64::from(total) > duration {
            return Err(ValidationError::ExceedsDuration {
                seconds: total,
                duration,
            });
        }

        debug!("Timestamp {raw} = {total}s within {duration:.2}s");

        Ok(Self {
            raw: raw.to_string(),
            seconds: total,
            video: video.to_path_buf(),
        })
    }

    /// The text exactly as the user typed it, suitable for ffmpeg `-ss`/`-to`.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn video(&self) -> &Path {
        &self.video
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Portion of a video to extract.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimRange {
    start: Timestamp,
    end: Timestamp,
}

impl TrimRange {
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, ValidationError> {
        if start.video != end.video {
            return Err(ValidationError::VideoMismatch);
        }
        if start.seconds >= end.seconds {
            return Err(ValidationError::InvertedRange {
                start: start.raw,
                end: end.raw,
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> &Timestamp {
        &self.start
    }

    pub fn end(&self) -> &Timestamp {
        &self.end
    }

    /// Length of the range in seconds.
    pub fn len_seconds(&self) -> u32 {
        self.end.seconds - self.start.seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RipscribeError;
    use std::cell::Cell;

    struct FixedProbe {
        duration: f64,
        calls: Cell<usize>,
    }

    impl FixedProbe {
        fn new(duration: f64) -> Self {
            Self {
                duration,
                calls: Cell::new(0),
            }
        }
    }

    impl MediaProbe for FixedProbe {
        fn duration(&self, _path: &Path) -> crate::Result<f64> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.duration)
        }
    }

    struct BrokenProbe;

    impl MediaProbe for BrokenProbe {
        fn duration(&self, _path: &Path) -> crate::Result<f64> {
            Err(RipscribeError::MediaProbe("moov atom not found".to_string()))
        }
    }

    fn video() -> PathBuf {
        PathBuf::from("/videos/lecture.mp4")
    }

    #[test]
    fn test_valid_timestamp_seconds() {
        let probe = FixedProbe::new(86_399.0);
        let ts = Timestamp::parse("01:02:03", &video(), &probe).unwrap();
        assert_eq!(ts.seconds(), 3723);
        assert_eq!(ts.as_str(), "01:02:03");
        assert_eq!(ts.video(), video().as_path());

        let ts = Timestamp::parse("23:59:59", &video(), &probe).unwrap();
        assert_eq!(ts.seconds(), 23 * 3600 + 59 * 60 + 59);

        let ts = Timestamp::parse("00:00:00", &video(), &probe).unwrap();
        assert_eq!(ts.seconds(), 0);
    }

    #[test]
    fn test_pattern_mismatch() {
        let probe = FixedProbe::new(1000.0);
        for raw in [
            "", "1:02:03", "01:2:03", "01-02-03", "010203", "01:02", "aa:bb:cc", "01:02:03 ",
            " 01:02:03", "001:02:03", "01:02:03:04",
        ] {
            assert!(
                matches!(
                    Timestamp::parse(raw, &video(), &probe),
                    Err(ValidationError::PatternMismatch)
                ),
                "{raw:?} should not match"
            );
        }
        assert_eq!(probe.calls.get(), 0);
    }

    #[test]
    fn test_range_check_fires_before_duration_check() {
        let probe = FixedProbe::new(f64::MAX);
        for raw in ["24:00:00", "00:60:00", "00:00:60", "99:99:99"] {
            assert!(matches!(
                Timestamp::parse(raw, &video(), &probe),
                Err(ValidationError::OutOfRange)
            ));
        }
        assert_eq!(probe.calls.get(), 0);

        // The broken probe would report a read error if it were consulted.
        assert!(matches!(
            Timestamp::parse("24:00:00", &video(), &BrokenProbe),
            Err(ValidationError::OutOfRange)
        ));
    }

    #[test]
    fn test_duration_boundary_is_inclusive() {
        let probe = FixedProbe::new(100.0);
        assert_eq!(
            Timestamp::parse("00:01:40", &video(), &probe)
                .unwrap()
                .seconds(),
            100
        );
        match Timestamp::parse("00:01:41", &video(), &probe) {
            Err(ValidationError::ExceedsDuration { seconds, duration }) => {
                assert_eq!(seconds, 101);
                assert_eq!(duration, 100.0);
            }
            other => panic!("Expected ExceedsDuration, got: {other:?}"),
        }
    }

    #[test]
    fn test_fractional_duration() {
        let probe = FixedProbe::new(100.4);
        assert!(Timestamp::parse("00:01:40", &video(), &probe).is_ok());
        assert!(Timestamp::parse("00:01:41", &video(), &probe).is_err());
    }

    #[test]
    fn test_probe_failure_is_video_read_error() {
        let err = Timestamp::parse("00:00:10", &video(), &BrokenProbe).unwrap_err();
        assert!(matches!(err, ValidationError::VideoRead(_)));
        let message = err.to_string();
        assert!(message.starts_with("Error reading video file"));
        assert!(message.contains("moov atom not found"));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::PatternMismatch.to_string(),
            "Timestamp inputted does not match hh:mm:ss pattern."
        );
        assert_eq!(
            ValidationError::OutOfRange.to_string(),
            "Timestamp inputted is incorrect."
        );
    }

    #[test]
    fn test_trim_range() {
        let probe = FixedProbe::new(600.0);
        let start = Timestamp::parse("00:01:00", &video(), &probe).unwrap();
        let end = Timestamp::parse("00:05:30", &video(), &probe).unwrap();

        let range = TrimRange::new(start.clone(), end.clone()).unwrap();
        assert_eq!(range.start().as_str(), "00:01:00");
        assert_eq!(range.end().as_str(), "00:05:30");
        assert_eq!(range.len_seconds(), 270);

        assert!(matches!(
            TrimRange::new(end, start.clone()),
            Err(ValidationError::InvertedRange { .. })
        ));
        assert!(matches!(
            TrimRange::new(start.clone(), start),
            Err(ValidationError::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_trim_range_rejects_mixed_videos() {
        let probe = FixedProbe::new(600.0);
        let start = Timestamp::parse("00:01:00", &video(), &probe).unwrap();
        let end = Timestamp::parse("00:02:00", Path::new("/videos/other.mp4"), &probe).unwrap();

        assert!(matches!(
            TrimRange::new(start, end),
            Err(ValidationError::VideoMismatch)
        ));
    }
}
