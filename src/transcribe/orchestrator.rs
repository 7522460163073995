use crate::error::Result;
use crate::transcribe::Transcriber;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How the transcript file is treated at the start of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranscriptMode {
    /// Keep whatever an earlier run wrote and add to the end.
    #[default]
    Append,
    /// Empty the file before the first segment is written.
    Truncate,
}

/// A segment whose text did not make it into the transcript.
#[derive(Debug, Clone)]
pub struct SegmentFailure {
    pub index: usize,
    pub path: PathBuf,
    pub error: String,
}

/// Statistics from the transcription process.
#[derive(Debug, Clone, Default)]
pub struct TranscriptionStats {
    pub total_segments: usize,
    pub successful_segments: usize,
    pub failures: Vec<SegmentFailure>,
    pub total_time: Duration,
}

impl TranscriptionStats {
    pub fn failed_segments(&self) -> usize {
        self.failures.len()
    }
}

/// Feeds segments to a transcriber one at a time and appends each result,
/// in order, to a single transcript file.
pub struct TranscriptionOrchestrator {
    transcriber: Arc<dyn Transcriber>,
    mode: TranscriptMode,
    show_progress: bool,
}

impl TranscriptionOrchestrator {
    /// Create a new orchestrator around an explicit service handle.
    pub fn new(transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            transcriber,
            mode: TranscriptMode::default(),
            show_progress: true,
        }
    }

    pub fn with_mode(mut self, mode: TranscriptMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable or disable progress bar display.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Transcribe `segments` in order, appending each text to `transcript`.
    ///
    /// A segment that fails (service error or failed append) is logged and
    /// skipped; the remaining segments are still processed. The only error
    /// returned is a failure to truncate the transcript in
    /// [`TranscriptMode::Truncate`], which happens before any segment is sent.
    pub async fn process_segments(
        &self,
        segments: &[PathBuf],
        transcript: &Path,
    ) -> Result<TranscriptionStats> {
        let start_time = Instant::now();

        if self.mode == TranscriptMode::Truncate && transcript.exists() {
            debug!("Truncating {}", transcript.display());
            std::fs::File::create(transcript)?;
        }

        info!(
            "Transcribing {} segment(s) with {} into {}",
            segments.len(),
            self.transcriber.name(),
            transcript.display()
        );

        let progress_bar = if self.show_progress && !segments.is_empty() {
            let pb = ProgressBar::new(segments.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let mut stats = TranscriptionStats {
            total_segments: segments.len(),
            ..Default::default()
        };

        for (i, segment) in segments.iter().enumerate() {
            let index = i + 1;
            debug!("Starting transcription of segment {}", index);

            let outcome = match self.transcriber.transcribe(segment).await {
                Ok(text) => {
                    info!("Now appending transcription of {}", segment.display());
                    append_text(transcript, &text).map_err(|e| {
                        format!("transcribed but could not append to {}: {e}", transcript.display())
                    })
                }
                Err(e) => Err(e.to_string()),
            };

            match outcome {
                Ok(()) => stats.successful_segments += 1,
                Err(error) => {
                    warn!("Couldn't transcribe {}: {}", segment.display(), error);
                    stats.failures.push(SegmentFailure {
                        index,
                        path: segment.clone(),
                        error,
                    });
                }
            }

            if let Some(ref pb) = progress_bar {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress_bar {
            pb.finish_with_message("Transcription complete");
        }

        stats.total_time = start_time.elapsed();

        info!(
            "Transcription complete: {}/{} segments successful in {:.2}s",
            stats.successful_segments,
            stats.total_segments,
            stats.total_time.as_secs_f64()
        );

        Ok(stats)
    }
}

/// Open `path` for appending (creating it if needed), write `text`, close.
fn append_text(path: &Path, text: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(text.as_bytes())?;
    file.flush()
}
