use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::compositor::Anchor;
use crate::language_utils;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Object store settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Speech recognition service settings
    #[serde(default)]
    pub recognition: RecognitionConfig,

    /// Caption appearance and timing policy
    #[serde(default)]
    pub captions: CaptionConfig,

    /// ffmpeg / ffprobe settings
    #[serde(default)]
    pub media: MediaConfig,

    /// Per-request scratch directories
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// HTTP server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address the server listens on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// Object store backend type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    // @backend: Supabase Storage REST API
    #[default]
    Supabase,
    // @backend: Directory on the local file system
    Local,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Supabase => write!(f, "supabase"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Object store configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    // @field: Backend type
    #[serde(default)]
    pub backend: StorageBackend,

    // @field: Project URL (Supabase)
    #[serde(default = "String::new")]
    pub url: String,

    // @field: Service key (Supabase)
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Root directory (local backend)
    #[serde(default = "default_local_storage_root")]
    pub local_root: PathBuf,

    // @field: Timeout seconds
    #[serde(default = "default_storage_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            url: String::new(),
            api_key: String::new(),
            local_root: default_local_storage_root(),
            timeout_secs: default_storage_timeout_secs(),
        }
    }
}

/// Recognition service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecognitionConfig {
    /// OpenAI-compatible API base URL
    #[serde(default = "default_recognition_endpoint")]
    pub endpoint: String,

    /// API key for the service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Model name (e.g., "whisper-1")
    #[serde(default = "default_recognition_model")]
    pub model: String,

    /// Spoken language (ISO code) or "auto"
    #[serde(default = "default_recognition_language")]
    pub language: String,

    /// Request timeout in seconds
    #[serde(default = "default_recognition_timeout_secs")]
    pub timeout_secs: u64,

    /// Send a 16 kHz mono WAV instead of the full video
    #[serde(default = "default_true")]
    pub extract_audio: bool,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_recognition_endpoint(),
            api_key: String::new(),
            model: default_recognition_model(),
            language: default_recognition_language(),
            timeout_secs: default_recognition_timeout_secs(),
            extract_audio: true,
        }
    }
}

/// What to do with captions whose duration is not positive
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DurationPolicy {
    /// Leave the caption out of the overlay set
    #[default]
    Reject,
    /// Show the caption for `min_duration_secs`
    Clamp,
}

/// Caption appearance and timing policy
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CaptionConfig {
    /// Font family resolved through fontconfig
    #[serde(default = "default_font")]
    pub font: String,

    /// Explicit font file, takes precedence over `font`
    #[serde(default)]
    pub font_file: Option<PathBuf>,

    /// Font size in pixels
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// ffmpeg color name or hex value
    #[serde(default = "default_font_color")]
    pub font_color: String,

    /// Screen position of captions
    #[serde(default)]
    pub anchor: Anchor,

    /// Distance between the caption and the anchored frame edge in pixels
    #[serde(default)]
    pub bottom_margin: u32,

    /// Tag of the produced caption track
    #[serde(default = "default_track_language")]
    pub track_language: String,

    /// Handling of non-positive durations
    #[serde(default)]
    pub duration_policy: DurationPolicy,

    /// Duration used by the clamp policy
    #[serde(default = "default_min_duration_secs")]
    pub min_duration_secs: f64,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            font: default_font(),
            font_file: None,
            font_size: default_font_size(),
            font_color: default_font_color(),
            anchor: Anchor::default(),
            bottom_margin: 0,
            track_language: default_track_language(),
            duration_policy: DurationPolicy::default(),
            min_duration_secs: default_min_duration_secs(),
        }
    }
}

/// External tool configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MediaConfig {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,

    /// Timeout for a single ffmpeg/ffprobe run
    #[serde(default = "default_media_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            timeout_secs: default_media_timeout_secs(),
        }
    }
}

/// Scratch directory configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WorkspaceConfig {
    /// Parent of all per-request directories
    #[serde(default = "default_workspace_root")]
    pub root: PathBuf,

    /// Also write the timestamped intermediate document
    #[serde(default)]
    pub keep_intermediate: bool,

    /// Leave request directories in place after the response
    #[serde(default)]
    pub keep_artifacts: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_workspace_root(),
            keep_intermediate: false,
            keep_artifacts: false,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_local_storage_root() -> PathBuf {
    PathBuf::from("storage")
}

fn default_storage_timeout_secs() -> u64 {
    120
}

fn default_recognition_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_recognition_model() -> String {
    "whisper-1".to_string()
}

fn default_recognition_language() -> String {
    language_utils::AUTO_LANGUAGE.to_string()
}

fn default_recognition_timeout_secs() -> u64 {
    600
}

fn default_font() -> String {
    "FreeMono".to_string()
}

fn default_font_size() -> u32 {
    24
}

fn default_font_color() -> String {
    "white".to_string()
}

fn default_track_language() -> String {
    crate::subtitle_track::DEFAULT_TRACK_LANGUAGE.to_string()
}

fn default_min_duration_secs() -> f64 {
    0.001
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

fn default_media_timeout_secs() -> u64 {
    1800 // 30 minutes, long videos take a while to re-encode
}

fn default_workspace_root() -> PathBuf {
    std::env::temp_dir().join("capsync")
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load a config file, creating it with defaults when missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<(Self, bool)> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok((config, false));
        }

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok((config, true))
    }

    /// Pick up secrets from the environment.
    ///
    /// `SUPABASE_URL`, `SUPABASE_KEY` and `OPENAI_API_KEY` override the file.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Same as [`Config::apply_env_overrides`] with an injectable lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("SUPABASE_URL") {
            self.storage.url = url;
        }
        if let Some(key) = non_empty("SUPABASE_KEY") {
            self.storage.api_key = key;
        }
        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.recognition.api_key = key;
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        language_utils::validate_recognition_language(&self.recognition.language)
            .context("Invalid recognition language")?;
        language_utils::normalize_to_part2t(&self.captions.track_language)
            .context("Invalid caption track language")?;

        if self.recognition.endpoint.trim().is_empty() {
            return Err(anyhow!("Recognition endpoint must not be empty"));
        }
        if self.recognition.model.trim().is_empty() {
            return Err(anyhow!("Recognition model must not be empty"));
        }
        if self.captions.font_size == 0 {
            return Err(anyhow!("Caption font size must be positive"));
        }
        if !(self.captions.min_duration_secs > 0.0 && self.captions.min_duration_secs.is_finite()) {
            return Err(anyhow!("Minimum caption duration must be a positive number of seconds"));
        }
        if self.media.timeout_secs == 0 {
            return Err(anyhow!("Media timeout must be positive"));
        }

        Ok(())
    }

    /// Extra checks before talking to the recognition service
    pub fn validate_for_processing(&self) -> Result<()> {
        self.validate()?;

        // Self-hosted compatible servers usually run without a key
        if self.recognition.endpoint.contains("api.openai.com")
            && self.recognition.api_key.trim().is_empty()
        {
            return Err(anyhow!("Recognition API key is required for OpenAI (set OPENAI_API_KEY)"));
        }

        Ok(())
    }

    /// Extra checks for running the HTTP service
    pub fn validate_for_server(&self) -> Result<()> {
        self.validate_for_processing()?;

        if self.storage.backend == StorageBackend::Supabase {
            if self.storage.url.trim().is_empty() {
                return Err(anyhow!("Storage URL is required for the Supabase backend (set SUPABASE_URL)"));
            }
            if self.storage.api_key.trim().is_empty() {
                return Err(anyhow!("Storage API key is required for the Supabase backend (set SUPABASE_KEY)"));
            }
        }
        self.server
            .bind_address
            .parse::<std::net::SocketAddr>()
            .with_context(|| format!("Invalid bind address: {}", self.server.bind_address))?;

        Ok(())
    }
}
