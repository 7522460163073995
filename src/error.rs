use thiserror::Error;

#[derive(Error, Debug)]
pub enum RipscribeError {
    #[error("Invalid timestamp: {0}")]
    Validation(#[from] ValidationError),

    #[error("Could not read media duration: {0}")]
    MediaProbe(String),

    #[error("Audio extraction failed: {0}")]
    AudioExtraction(String),

    #[error("Audio splitting failed: {0}")]
    AudioSplit(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

/// Why a timestamp (or a pair of them) was rejected.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Timestamp inputted does not match hh:mm:ss pattern.")]
    PatternMismatch,

    #[error("Timestamp inputted is incorrect.")]
    OutOfRange,

    #[error("Timestamp inputted is incorrect.")]
    ExceedsDuration { seconds: u32, duration: f64 },

    #[error("Error reading video file: {0}")]
    VideoRead(String),

    #[error("Start timestamp {start} must come before end timestamp {end}.")]
    InvertedRange { start: String, end: String },

    #[error("Start and end timestamps refer to different videos.")]
    VideoMismatch,
}

/// Failure of an external media tool invocation.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}{}", reason(.stderr))]
    Exit {
        program: String,
        status: String,
        /// Last lines ffmpeg wrote to stderr, empty if it wrote nothing.
        stderr: String,
    },
}

fn reason(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

pub type Result<T> = std::result::Result<T, RipscribeError>;
