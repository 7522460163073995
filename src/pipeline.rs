use crate::audio::{
    extract_audio, plan_for_asset, split_audio, AudioAsset, ExtractOptions, MediaTool,
    OverwritePolicy, DEFAULT_SIZE_LIMIT,
};
use crate::config::Config;
use crate::error::Result;
use crate::timestamp::TrimRange;
use crate::transcribe::{
    TranscriptMode, Transcriber, TranscriptionOrchestrator, TranscriptionStats,
};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Configuration for one video-to-transcript run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Whole-track size above which the audio is split, in bytes. Values
    /// above the transcriber's upload limit are lowered to that limit.
    pub size_limit: u64,
    /// Policy for `.wav` outputs that already exist.
    pub overwrite: OverwritePolicy,
    /// Policy for a transcript left by an earlier run.
    pub transcript_mode: TranscriptMode,
    /// Pass `-report` to ffmpeg during extraction.
    pub report: bool,
    /// Show progress bars.
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            size_limit: DEFAULT_SIZE_LIMIT,
            overwrite: OverwritePolicy::default(),
            transcript_mode: TranscriptMode::default(),
            report: false,
            show_progress: true,
        }
    }
}

impl PipelineConfig {
    /// Pipeline settings taken from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            size_limit: config.size_limit,
            report: config.ffmpeg_report,
            ..Default::default()
        }
    }
}

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extracting,
    SizeChecked,
    Splitting,
    Transcribing,
    Done,
    AbortedFatal,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extracting => "extracting",
            Stage::SizeChecked => "size checked",
            Stage::Splitting => "splitting",
            Stage::Transcribing => "transcribing",
            Stage::Done => "done",
            Stage::AbortedFatal => "aborted",
        };
        f.write_str(name)
    }
}

/// Statistics from the pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineStats {
    pub total_time: Duration,
    pub extraction_time: Duration,
    pub split_time: Duration,
    pub transcription: TranscriptionStats,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct PipelineResult {
    /// The whole-track audio ripped from the video.
    pub audio: AudioAsset,
    /// Files sent to the service, in transcript order.
    pub segments: Vec<PathBuf>,
    /// Whether the whole track had to be split.
    pub split: bool,
    pub transcript_path: PathBuf,
    pub stats: PipelineStats,
}

/// The split threshold actually used: never above what the service accepts.
fn effective_size_limit(configured: u64, service_max: u64) -> u64 {
    if configured > service_max {
        warn!(
            "Size limit of {} bytes is above the {} byte upload limit of the service, using {}",
            configured, service_max, service_max
        );
        service_max
    } else {
        configured
    }
}

fn enter(stage: Stage) {
    debug!("Pipeline stage: {}", stage);
}

fn abort<E: fmt::Display>(stage: Stage, err: E) -> E {
    error!("Fatal error while {}: {}", stage, err);
    enter(Stage::AbortedFatal);
    err
}

/// Turn `video` into a transcript next to it.
///
/// Extraction and splitting failures abort the run and are returned as
/// errors; nothing is transcribed in that case. Per-segment transcription
/// failures are only recorded in the returned stats.
pub async fn transcribe_video(
    video: &Path,
    trim: Option<&TrimRange>,
    tool: &dyn MediaTool,
    transcriber: Arc<dyn Transcriber>,
    config: &PipelineConfig,
) -> Result<PipelineResult> {
    let start_time = Instant::now();

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 1: Audio Extraction
    // ═══════════════════════════════════════════════════════════════════════
    enter(Stage::Extracting);
    info!("Will run on {}", video.display());

    let extract_options = ExtractOptions {
        overwrite: config.overwrite,
        report: config.report,
    };
    let audio = extract_audio(tool, video, trim, &extract_options)
        .map_err(|e| abort(Stage::Extracting, e))?;
    let extraction_time = start_time.elapsed();

    info!(
        "Ripped audio file is {} Mb.",
        (audio.size_bytes as f64 / 1_000_000.0).round()
    );

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 2: Size Check
    // ═══════════════════════════════════════════════════════════════════════
    enter(Stage::SizeChecked);
    let size_limit = effective_size_limit(config.size_limit, transcriber.max_file_size());
    let plan = plan_for_asset(&audio, size_limit)
        .map_err(|e| abort(Stage::SizeChecked, e))?;

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 3: Splitting (only for oversized audio)
    // ═══════════════════════════════════════════════════════════════════════
    let split_start = Instant::now();
    let (segments, split) = match plan {
        Some(plan) => {
            enter(Stage::Splitting);
            let paths = split_audio(tool, &audio, &plan, config.overwrite)
                .map_err(|e| abort(Stage::Splitting, e))?;
            (paths, true)
        }
        None => {
            debug!("Audio fits under {} bytes, no split", size_limit);
            (vec![audio.path.clone()], false)
        }
    };
    let split_time = split_start.elapsed();

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 4: Transcription
    // ═══════════════════════════════════════════════════════════════════════
    enter(Stage::Transcribing);
    let transcript_path = audio.transcript_path();

    let orchestrator = TranscriptionOrchestrator::new(transcriber)
        .with_mode(config.transcript_mode)
        .with_progress(config.show_progress);

    let transcription = orchestrator
        .process_segments(&segments, &transcript_path)
        .await
        .map_err(|e| abort(Stage::Transcribing, e))?;

    enter(Stage::Done);

    Ok(PipelineResult {
        audio,
        segments,
        split,
        transcript_path,
        stats: PipelineStats {
            total_time: start_time.elapsed(),
            extraction_time,
            split_time,
            transcription,
        },
    })
}

/// Print a summary of the pipeline results.
pub fn print_summary(result: &PipelineResult) {
    let t = &result.stats.transcription;

    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                      Transcription Complete                    ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  Transcript: {}", result.transcript_path.display());
    println!(
        "  Audio:      {} ({:.1} MB)",
        result.audio.path.display(),
        result.audio.size_bytes as f64 / 1_000_000.0
    );
    if result.split {
        println!("  Chunks:     {}", result.segments.len());
    }
    println!(
        "  Segments:   {}/{} transcribed",
        t.successful_segments, t.total_segments
    );
    println!();
    println!("  Timing:");
    println!(
        "    Extract:     {:.2}s",
        result.stats.extraction_time.as_secs_f64()
    );
    if result.split {
        println!(
            "    Split:       {:.2}s",
            result.stats.split_time.as_secs_f64()
        );
    }
    println!("    Transcribe:  {:.2}s", t.total_time.as_secs_f64());
    println!(
        "    Total:       {:.2}s",
        result.stats.total_time.as_secs_f64()
    );
    if !t.failures.is_empty() {
        println!();
        println!("  Missing from transcript:");
        for failure in &t.failures {
            println!("    #{} {}: {}", failure.index, failure.path.display(), failure.error);
        }
    }
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}
