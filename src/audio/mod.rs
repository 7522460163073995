pub mod chunk;
pub mod extract;
pub mod probe;
pub mod split;
pub mod tool;

pub use chunk::{
    chunk_count, chunk_path, needs_split, plan_chunks, plan_for_asset, ChunkPlan, ChunkSpec,
    DEFAULT_SIZE_LIMIT,
};
pub use extract::{extract_audio, extraction_args, whole_audio_path, ExtractOptions};
pub use probe::{wav_duration, Ffprobe, MediaProbe};
pub use split::{split_args, split_audio};
pub use tool::{Ffmpeg, MediaTool};

use std::path::{Path, PathBuf};

use crate::error::{RipscribeError, Result};

/// Extension of every audio file this crate writes.
pub const WAV_EXTENSION: &str = "wav";

/// What to do when an output file is already on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    /// Replace it silently (`ffmpeg -y`).
    #[default]
    Overwrite,
    /// Leave it alone and fail the step (`ffmpeg -n`).
    Keep,
}

impl OverwritePolicy {
    pub(crate) fn ffmpeg_flag(self) -> &'static str {
        match self {
            OverwritePolicy::Overwrite => "-y",
            OverwritePolicy::Keep => "-n",
        }
    }
}

/// An audio file on disk: the whole extracted track or one chunk of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioAsset {
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl AudioAsset {
    /// Record an existing audio file and its current size.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let metadata = std::fs::metadata(&path)
            .map_err(|_| RipscribeError::FileNotFound(path.display().to_string()))?;

        Ok(Self {
            path,
            size_bytes: metadata.len(),
        })
    }

    /// Waveform duration in seconds, read from the WAV header.
    pub fn duration(&self) -> Result<f64> {
        wav_duration(&self.path)
    }

    /// The transcript that belongs to this asset: same directory and stem, `.txt`.
    pub fn transcript_path(&self) -> PathBuf {
        transcript_path_for(&self.path)
    }
}

pub(crate) fn transcript_path_for(audio: &Path) -> PathBuf {
    audio.with_extension("txt")
}
