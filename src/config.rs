use crate::audio::DEFAULT_SIZE_LIMIT;
use crate::error::{RipscribeError, Result};
use crate::transcribe::whisper::DEFAULT_API_BASE;
use crate::transcribe::WhisperModel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub model: WhisperModel,
    /// Source language hint passed to the service (ISO 639-1).
    pub language: Option<String>,
    /// Vocabulary hint sent with every segment (names, jargon).
    pub prompt: Option<String>,
    /// Whole-track size above which the audio is split, in bytes.
    pub size_limit: u64,
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub api_base: String,
    /// Pass `-report` to ffmpeg during extraction.
    pub ffmpeg_report: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            model: WhisperModel::default(),
            language: None,
            prompt: None,
            size_limit: DEFAULT_SIZE_LIMIT,
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            api_base: DEFAULT_API_BASE.to_string(),
            ffmpeg_report: false,
        }
    }
}

impl Config {
    /// Load the config file (if any), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_file_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a TOML config file. Unknown or malformed content falls back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        match toml::from_str::<Config>(&contents) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) => {
                warn!("Ignoring unreadable config {}: {}", path.display(), e);
                Ok(Self::default())
            }
        }
    }

    /// Override fields from environment-style variables looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
        if let Some(model) = lookup("RIPSCRIBE_MODEL") {
            if let Ok(m) = model.parse() {
                self.model = m;
            }
        }
        if let Some(language) = lookup("RIPSCRIBE_LANGUAGE") {
            self.language = Some(language);
        }
        if let Some(prompt) = lookup("RIPSCRIBE_PROMPT") {
            self.prompt = Some(prompt);
        }
        if let Some(limit) = lookup("RIPSCRIBE_SIZE_LIMIT") {
            if let Ok(l) = limit.parse() {
                self.size_limit = l;
            }
        }
        if let Some(ffmpeg) = lookup("RIPSCRIBE_FFMPEG") {
            self.ffmpeg = PathBuf::from(ffmpeg);
        }
        if let Some(ffprobe) = lookup("RIPSCRIBE_FFPROBE") {
            self.ffprobe = PathBuf::from(ffprobe);
        }
        if let Some(base) = lookup("RIPSCRIBE_API_BASE") {
            self.api_base = base;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.openai_api_key.as_deref().map_or(true, str::is_empty) {
            return Err(RipscribeError::Config(
                "OPENAI_API_KEY not set. Export it with: export OPENAI_API_KEY=sk-...".to_string(),
            ));
        }

        if self.size_limit == 0 {
            return Err(RipscribeError::Config(
                "Size limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ripscribe").join("config.toml"))
    }
}
