use std::path::{Path, PathBuf};
use std::process::Command;

use hound::WavReader;
use tracing::debug;

use crate::error::{RipscribeError, Result};

/// Something that can tell how long a media file is, in seconds.
pub trait MediaProbe {
    fn duration(&self, path: &Path) -> Result<f64>;
}

/// Container-level duration lookup through `ffprobe`.
#[derive(Debug, Clone)]
pub struct Ffprobe {
    program: PathBuf,
}

impl Default for Ffprobe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl Ffprobe {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl MediaProbe for Ffprobe {
    fn duration(&self, path: &Path) -> Result<f64> {
        if !path.is_file() {
            return Err(RipscribeError::MediaProbe(format!(
                "No such file: {}",
                path.display()
            )));
        }

        let output = Command::new(&self.program)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output()
            .map_err(|e| RipscribeError::MediaProbe(format!("Failed to run FFprobe: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RipscribeError::MediaProbe(format!(
                "FFprobe failed: {}",
                stderr.trim()
            )));
        }

        let duration = parse_duration_output(&String::from_utf8_lossy(&output.stdout))?;
        debug!("{} lasts {:.2}s", path.display(), duration);
        Ok(duration)
    }
}

/// Parse the single value ffprobe prints for `format=duration`.
///
/// Containers without duration metadata make ffprobe print `N/A`.
fn parse_duration_output(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    let seconds: f64 = trimmed.parse().map_err(|_| {
        RipscribeError::MediaProbe(format!("No usable duration metadata: '{trimmed}'"))
    })?;

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(RipscribeError::MediaProbe(format!(
            "Invalid duration: {seconds}"
        )));
    }

    Ok(seconds)
}

/// Duration of a WAV file from its header: frame count over sample rate.
pub fn wav_duration(path: &Path) -> Result<f64> {
    let reader = WavReader::open(path)?;
    let rate = reader.spec().sample_rate;
    if rate == 0 {
        return Err(RipscribeError::MediaProbe(format!(
            "{} reports a zero sample rate",
            path.display()
        )));
    }

    let duration = reader.duration() as f64 / rate as f64;
    debug!("Track duration is {duration} seconds.");
    Ok(duration)
}
