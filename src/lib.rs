pub mod audio;
pub mod config;
pub mod error;
pub mod interactive;
pub mod pipeline;
pub mod timestamp;
pub mod transcribe;

pub use config::Config;
pub use error::{Result, RipscribeError, ToolError, ValidationError};
pub use pipeline::{
    print_summary, transcribe_video, PipelineConfig, PipelineResult, PipelineStats, Stage,
};
pub use timestamp::{Timestamp, TrimRange};
