pub mod orchestrator;
pub mod whisper;

pub use orchestrator::{
    SegmentFailure, TranscriptMode, TranscriptionOrchestrator, TranscriptionStats,
};
pub use whisper::{WhisperClient, WhisperModel};

use crate::config::Config;
use crate::error::{RipscribeError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// A speech-to-text service that turns one audio file into plain text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &Path) -> Result<String>;

    fn name(&self) -> &'static str;

    /// Largest file the service accepts, in bytes.
    fn max_file_size(&self) -> u64;
}

/// Build the service client described by `config`.
///
/// The returned handle is meant to be created once and shared for the whole run.
pub fn create_transcriber(config: &Config) -> Result<Arc<dyn Transcriber>> {
    let api_key = config.openai_api_key.as_ref().ok_or_else(|| {
        RipscribeError::Config(
            "OpenAI API key not set. Set OPENAI_API_KEY environment variable.".to_string(),
        )
    })?;

    let mut client = WhisperClient::new(api_key.clone())
        .with_model(config.model)
        .with_base_url(config.api_base.clone());

    if let Some(ref language) = config.language {
        client = client.with_language(language.clone());
    }

    if let Some(ref prompt) = config.prompt {
        client = client.with_prompt(prompt.clone());
    }

    Ok(Arc::new(client))
}
