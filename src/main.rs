use anyhow::{Context, Result};
use clap::Parser;
use ripscribe::audio::{Ffmpeg, Ffprobe, OverwritePolicy};
use ripscribe::config::Config;
use ripscribe::interactive::run_interactive_wizard;
use ripscribe::transcribe::{create_transcriber, TranscriptMode, WhisperModel};
use ripscribe::{print_summary, transcribe_video, PipelineConfig, Timestamp, TrimRange};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "ripscribe")]
#[command(version, about = "Transcribe the audio track of a video")]
#[command(
    long_about = "Rip the audio track out of a video with ffmpeg, split it when it is too large to upload, \
and transcribe it with the OpenAI speech-to-text API into <video>.txt. \
Run without arguments for an interactive prompt."
)]
struct Cli {
    /// Input video file (prompted for when omitted)
    input: Option<PathBuf>,

    /// Start of the portion to transcribe (HH:MM:SS)
    #[arg(long, requires = "end", requires = "input")]
    start: Option<String>,

    /// End of the portion to transcribe (HH:MM:SS)
    #[arg(long, requires = "start")]
    end: Option<String>,

    /// Transcription model: whisper-1, gpt-4o-transcribe, gpt-4o-mini-transcribe
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., en, ja, es)
    #[arg(short, long)]
    language: Option<String>,

    /// Vocabulary hint for the service (names, jargon)
    #[arg(short, long)]
    prompt: Option<String>,

    /// Split the extracted audio when it is larger than this many bytes
    #[arg(long)]
    size_limit: Option<u64>,

    /// Fail instead of overwriting existing .wav files
    #[arg(long)]
    keep_existing: bool,

    /// Start a new transcript instead of appending to an existing one
    #[arg(long)]
    fresh_transcript: bool,

    /// Ask ffmpeg to write a report log during extraction
    #[arg(long)]
    report: bool,

    /// Hide progress bars
    #[arg(long)]
    no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Load and validate configuration, CLI flags win over file and environment
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(ref model) = cli.model {
        config.model = model
            .parse::<WhisperModel>()
            .map_err(|e: String| anyhow::anyhow!(e))?;
    }
    if let Some(ref language) = cli.language {
        config.language = Some(language.clone());
    }
    if let Some(ref prompt) = cli.prompt {
        config.prompt = Some(prompt.clone());
    }
    if let Some(limit) = cli.size_limit {
        config.size_limit = limit;
    }
    config.validate().context("Configuration validation failed")?;

    let ffmpeg = Ffmpeg::new(&config.ffmpeg);
    ffmpeg.check()?;
    let ffprobe = Ffprobe::new(&config.ffprobe);

    let (video, trim) = match cli.input {
        Some(ref input) => {
            if !input.is_file() {
                anyhow::bail!("Input file not found: {}", input.display());
            }
            let trim = match (&cli.start, &cli.end) {
                (Some(start), Some(end)) => {
                    let start = Timestamp::parse(start, input, &ffprobe)
                        .context("Invalid --start")?;
                    let end = Timestamp::parse(end, input, &ffprobe).context("Invalid --end")?;
                    Some(TrimRange::new(start, end)?)
                }
                _ => None,
            };
            (input.clone(), trim)
        }
        None => {
            let answers = run_interactive_wizard(&ffprobe)?;
            (answers.video, answers.trim)
        }
    };

    let mut pipeline_config = PipelineConfig::from_config(&config);
    pipeline_config.report |= cli.report;
    pipeline_config.show_progress = !cli.no_progress;
    if cli.keep_existing {
        pipeline_config.overwrite = OverwritePolicy::Keep;
    }
    if cli.fresh_transcript {
        pipeline_config.transcript_mode = TranscriptMode::Truncate;
    }

    info!("Model:    {}", config.model);
    if let Some(ref language) = config.language {
        info!("Language: {}", language);
    }

    // One service handle for the whole run
    let transcriber = create_transcriber(&config)?;

    let result = transcribe_video(
        &video,
        trim.as_ref(),
        &ffmpeg,
        transcriber,
        &pipeline_config,
    )
    .await
    .with_context(|| format!("Could not transcribe {}", video.display()))?;

    print_summary(&result);

    Ok(())
}
