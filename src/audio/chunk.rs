use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;

use super::{AudioAsset, WAV_EXTENSION};

/// Upload ceiling of the transcription service, in bytes.
pub const DEFAULT_SIZE_LIMIT: u64 = 25_000_000;

/// One planned cut of the whole track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpec {
    /// 1-based position in the plan, also used in the chunk file name.
    pub index: usize,
    pub offset_secs: u64,
    pub duration_secs: u64,
}

/// Ordered cuts covering the whole track with no gaps.
///
/// The last chunk's nominal duration may run past the end of the stream;
/// ffmpeg stops at end-of-stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    chunks: Vec<ChunkSpec>,
}

impl ChunkPlan {
    pub fn chunks(&self) -> &[ChunkSpec] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChunkSpec> {
        self.chunks.iter()
    }

    /// Sum of the nominal durations.
    pub fn total_secs(&self) -> u64 {
        self.chunks.iter().map(|c| c.duration_secs).sum()
    }
}

/// Number of pieces needed so that each stays under `limit` bytes.
pub fn chunk_count(size_bytes: u64, limit: u64) -> u64 {
    size_bytes.div_ceil(limit.max(1))
}

/// Whether a file of `size_bytes` must be split. A file exactly at the limit is not.
pub fn needs_split(size_bytes: u64, limit: u64) -> bool {
    chunk_count(size_bytes, limit) > 1
}

/// Plan `count` equal-duration chunks over `total_secs` of audio.
///
/// Durations are whole seconds rounded up, so the plan may overshoot the
/// track but never leaves a gap.
pub fn plan_chunks(total_secs: f64, count: u64) -> ChunkPlan {
    if count == 0 {
        return ChunkPlan { chunks: Vec::new() };
    }

    let chunk_duration = ((total_secs.max(0.0) / count as f64).ceil() as u64).max(1);

    let chunks = (0..count)
        .map(|i| ChunkSpec {
            index: i as usize + 1,
            offset_secs: i * chunk_duration,
            duration_secs: chunk_duration,
        })
        .collect();

    ChunkPlan { chunks }
}

/// Path of chunk `index` of `whole`: the whole-track stem with the index appended.
pub fn chunk_path(whole: &Path, index: usize) -> PathBuf {
    let stem = whole.file_stem().unwrap_or_default().to_string_lossy();
    whole.with_file_name(format!("{stem}{index}.{WAV_EXTENSION}"))
}

/// Decide whether `asset` must be split and, if so, plan the cuts.
///
/// Returns `None` when the asset already fits under `limit`.
pub fn plan_for_asset(asset: &AudioAsset, limit: u64) -> Result<Option<ChunkPlan>> {
    if !needs_split(asset.size_bytes, limit) {
        debug!(
            "{} is {} bytes, within the {} byte limit",
            asset.path.display(),
            asset.size_bytes,
            limit
        );
        return Ok(None);
    }

    let count = chunk_count(asset.size_bytes, limit);

    let total_secs = asset.duration()?;
    let plan = plan_chunks(total_secs, count);

    info!(
        "{} bytes over a {} byte limit: planned {} chunks of {}s ({}s) for {:.1}s of audio",
        asset.size_bytes,
        limit,
        plan.len(),
        plan.chunks().first().map(|c| c.duration_secs).unwrap_or(0),
        plan.total_secs(),
        total_secs
    );

    Ok(Some(plan))
}
