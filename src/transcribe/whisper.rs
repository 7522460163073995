use crate::error::{RipscribeError, Result};
use crate::transcribe::Transcriber;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, warn};

/// Default OpenAI API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Maximum file size accepted by the transcription endpoint (25 MB).
const MAX_FILE_SIZE: u64 = 25 * 1024 * 1024;

/// Maximum attempts for one API call.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const BASE_DELAY_MS: u64 = 1000;

/// Transcription model variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WhisperModel {
    #[default]
    #[serde(rename = "whisper-1")]
    Whisper1,
    #[serde(rename = "gpt-4o-transcribe")]
    Gpt4oTranscribe,
    #[serde(rename = "gpt-4o-mini-transcribe")]
    Gpt4oMiniTranscribe,
}

impl WhisperModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            WhisperModel::Whisper1 => "whisper-1",
            WhisperModel::Gpt4oTranscribe => "gpt-4o-transcribe",
            WhisperModel::Gpt4oMiniTranscribe => "gpt-4o-mini-transcribe",
        }
    }
}

impl std::fmt::Display for WhisperModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WhisperModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "whisper-1" => Ok(WhisperModel::Whisper1),
            "gpt-4o-transcribe" => Ok(WhisperModel::Gpt4oTranscribe),
            "gpt-4o-mini-transcribe" => Ok(WhisperModel::Gpt4oMiniTranscribe),
            _ => Err(format!(
                "Unknown model: {}. Use 'whisper-1', 'gpt-4o-transcribe' or 'gpt-4o-mini-transcribe'",
                s
            )),
        }
    }
}

/// OpenAI audio transcription client, always asking for plain-text output.
pub struct WhisperClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: WhisperModel,
    language: Option<String>,
    prompt: Option<String>,
    max_retries: u32,
}

impl WhisperClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_API_BASE.to_string(),
            model: WhisperModel::default(),
            language: None,
            prompt: None,
            max_retries: MAX_RETRIES,
        }
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: WhisperModel) -> Self {
        self.model = model;
        self
    }

    /// Point the client at another API root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the source language (ISO 639-1 code).
    pub fn with_language(mut self, language: String) -> Self {
        self.language = Some(language);
        self
    }

    /// Set a prompt for vocabulary hints (max 224 tokens).
    pub fn with_prompt(mut self, prompt: String) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Total attempts per file, including the first one. Zero is treated as one.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url)
    }

    /// Build the multipart form for the API request.
    async fn build_form(&self, audio_path: &Path) -> Result<Form> {
        let file_bytes = fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let mime_type = match audio_path.extension().and_then(|e| e.to_str()) {
            Some("wav") => "audio/wav",
            Some("mp3") => "audio/mpeg",
            Some("m4a") => "audio/mp4",
            Some("flac") => "audio/flac",
            Some("ogg") => "audio/ogg",
            Some("webm") => "audio/webm",
            _ => "application/octet-stream",
        };

        let file_part = Part::bytes(file_bytes)
            .file_name(file_name)
            .mime_str(mime_type)?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("model", self.model.as_str())
            .text("response_format", "text");

        if let Some(ref lang) = self.language {
            form = form.text("language", lang.clone());
        }

        if let Some(ref prompt) = self.prompt {
            form = form.text("prompt", prompt.clone());
        }

        Ok(form)
    }

    /// Make the API request (form is consumed, so no retries at this level).
    async fn call_api(&self, form: Form) -> std::result::Result<String, CallError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| CallError::retryable(e.into()))?;

        let status = response.status();
        debug!("Transcription API response status: {}", status);

        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| CallError::retryable(e.into()))?;
            debug!("Transcription API returned {} bytes of text", body.len());
            return Ok(body);
        }

        let error_body = response.text().await.unwrap_or_default();
        let error = api_error(status, &error_body);

        if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
            Err(CallError::fatal(error))
        } else {
            Err(CallError::retryable(error))
        }
    }

    /// Transcribe with retry logic, rebuilding the form on each attempt.
    async fn transcribe_with_retry(&self, audio_path: &Path) -> Result<String> {
        let mut last_error = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = BASE_DELAY_MS * 2u64.pow(attempt - 1);
                debug!("Retry attempt {} after {}ms delay", attempt, delay);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            let form = self.build_form(audio_path).await?;

            match self.call_api(form).await {
                Ok(text) => return Ok(text),
                Err(CallError { error, retry: false }) => return Err(error),
                Err(CallError { error, retry: true }) => {
                    warn!("Attempt {} failed: {}", attempt + 1, error);
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| RipscribeError::Api("Unknown error".to_string())))
    }
}

#[async_trait]
impl Transcriber for WhisperClient {
    async fn transcribe(&self, audio: &Path) -> Result<String> {
        debug!("Transcribing {} with {}", audio.display(), self.model);

        let metadata = fs::metadata(audio).await?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(RipscribeError::Transcription(format!(
                "File too large for the transcription API: {} bytes (max {} bytes)",
                metadata.len(),
                MAX_FILE_SIZE
            )));
        }

        self.transcribe_with_retry(audio).await
    }

    fn name(&self) -> &'static str {
        "OpenAI Whisper"
    }

    fn max_file_size(&self) -> u64 {
        MAX_FILE_SIZE
    }
}

/// An API failure and whether another attempt could help.
struct CallError {
    error: RipscribeError,
    retry: bool,
}

impl CallError {
    fn retryable(error: RipscribeError) -> Self {
        Self { error, retry: true }
    }

    fn fatal(error: RipscribeError) -> Self {
        Self {
            error,
            retry: false,
        }
    }
}

fn api_error(status: StatusCode, body: &str) -> RipscribeError {
    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(body) {
        return RipscribeError::Api(format!(
            "{} ({}, HTTP {})",
            api_error.error.message,
            api_error.error.r#type,
            status.as_u16()
        ));
    }

    RipscribeError::Api(format!("HTTP {}: {}", status, body))
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    r#type: String,
    #[allow(dead_code)]
    code: Option<String>,
}
