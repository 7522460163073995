use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{RipscribeError, Result};
use crate::timestamp::TrimRange;

use super::tool::MediaTool;
use super::{AudioAsset, OverwritePolicy, WAV_EXTENSION};

/// Knobs for a single extraction run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    pub overwrite: OverwritePolicy,
    /// Ask ffmpeg to write its `-report` log file into the working directory.
    pub report: bool,
}

/// Where the whole-track audio of `video` is written: same directory and stem, `.wav`.
pub fn whole_audio_path(video: &Path) -> PathBuf {
    video.with_extension(WAV_EXTENSION)
}

/// Arguments for ripping the audio track of `video` into `output`.
///
/// The trim flags go right after the input file so ffmpeg applies them as
/// output options.
pub fn extraction_args(
    video: &Path,
    output: &Path,
    trim: Option<&TrimRange>,
    options: &ExtractOptions,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![options.overwrite.ffmpeg_flag().into()];
    if options.report {
        args.push("-report".into());
    }
    args.push("-i".into());
    args.push(video.as_os_str().to_owned());

    if let Some(range) = trim {
        args.extend(
            ["-ss", range.start().as_str(), "-to", range.end().as_str()].map(OsString::from),
        );
    }

    args.push("-vn".into());
    args.push(output.as_os_str().to_owned());
    args
}

/// Extract the audio track of `video` to `<video_dir>/<video_stem>.wav`.
///
/// Any tool failure is returned as [`RipscribeError::AudioExtraction`]; the
/// caller is expected to abort the run.
pub fn extract_audio(
    tool: &dyn MediaTool,
    video: &Path,
    trim: Option<&TrimRange>,
    options: &ExtractOptions,
) -> Result<AudioAsset> {
    if !video.is_file() {
        return Err(RipscribeError::FileNotFound(video.display().to_string()));
    }

    let output = whole_audio_path(video);
    if output == video {
        return Err(RipscribeError::AudioExtraction(format!(
            "Input {} is already a .{WAV_EXTENSION} file and would be overwritten",
            video.display()
        )));
    }

    match trim {
        Some(range) => info!(
            "Extracting audio from {} ({} to {}, {}s)",
            video.display(),
            range.start(),
            range.end(),
            range.len_seconds()
        ),
        None => info!("Extracting audio from {}", video.display()),
    }

    let args = extraction_args(video, &output, trim, options);
    debug!("{} {:?}", tool.name(), args);

    tool.run(&args)
        .map_err(|e| RipscribeError::AudioExtraction(e.to_string()))?;

    if !output.exists() {
        return Err(RipscribeError::AudioExtraction(
            "Output file was not created".to_string(),
        ));
    }

    let asset = AudioAsset::open(&output)?;
    info!(
        "Audio extracted to {} ({} bytes)",
        asset.path.display(),
        asset.size_bytes
    );

    Ok(asset)
}
