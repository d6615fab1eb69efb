/*!
 * Error types for the capsync application.
 *
 * This module contains custom error types for different parts of the pipeline,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::fmt;
use thiserror::Error;

/// Errors that can occur while converting or parsing subtitle text
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubtitleError {
    /// A time value was negative, not finite, or not a number
    #[error("Invalid time value '{value}': {reason}")]
    InvalidTime {
        /// The offending raw value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// A line carrying the `-->` marker did not have the `[start --> end] text` shape
    #[error("Malformed segment line {line:?}: {reason}")]
    MalformedSegment {
        /// The full offending line
        line: String,
        /// What was wrong with it
        reason: String,
    },

    /// A block of an SRT track was structurally invalid
    #[error("Malformed subtitle block {block}: {reason} (content: {content:?})")]
    MalformedTrack {
        /// 1-based position of the block in the file
        block: usize,
        /// What was wrong with it
        reason: String,
        /// Raw block text
        content: String,
    },
}

impl SubtitleError {
    pub(crate) fn invalid_time(value: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::InvalidTime {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by the media backend (ffmpeg / ffprobe)
#[derive(Error, Debug)]
pub enum MediaError {
    /// The base video could not be decoded or probed
    #[error("Source media could not be decoded ({path}): {reason}")]
    SourceMedia {
        /// Path of the source video
        path: String,
        /// Decoder / probe output
        reason: String,
    },

    /// The composite encode failed
    #[error("Video encode failed: {0}")]
    EncodeFailed(String),

    /// The external tool could not be started
    #[error("Failed to run {tool}: {reason}")]
    ToolUnavailable {
        /// Tool name (ffmpeg, ffprobe)
        tool: String,
        /// Spawn error
        reason: String,
    },

    /// The external tool did not finish in time
    #[error("{tool} timed out after {secs} seconds")]
    Timeout {
        /// Tool name
        tool: String,
        /// Configured timeout
        secs: u64,
    },
}

/// Errors returned by external collaborators (object store, recognition service)
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Download from the object store failed
    #[error("Download of '{key}' from bucket '{bucket}' failed: {reason}")]
    Download {
        bucket: String,
        key: String,
        reason: String,
    },

    /// Upload to the object store failed
    #[error("Upload of '{key}' to bucket '{bucket}' failed: {reason}")]
    Upload {
        bucket: String,
        key: String,
        reason: String,
    },

    /// The recognition service failed or returned an unusable response
    #[error("Recognition service error: {0}")]
    Recognition(String),

    /// The incoming request is missing required fields
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Per-caption problems that are logged and skipped, never propagated
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OverlayWarning {
    /// end <= start after conversion to seconds
    #[error("Caption {index} has a non-positive duration ({duration_seconds:.3}s)")]
    NonPositiveDuration { index: usize, duration_seconds: f64 },

    /// The caption text cannot be drawn
    #[error("Caption {index} could not be rendered: {reason}")]
    Unrenderable { index: usize, reason: String },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from ffmpeg / ffprobe
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Error from an external service
    #[error("Upstream service error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(format!("{:#}", error))
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

/// Pipeline step a request failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Request,
    Workspace,
    Download,
    AudioExtraction,
    Recognition,
    SubtitleBuild,
    Transcript,
    Compositing,
    Packaging,
    Upload,
}

impl Stage {
    /// Short stage identifier used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Workspace => "workspace",
            Self::Download => "download",
            Self::AudioExtraction => "audio extraction",
            Self::Recognition => "recognition",
            Self::SubtitleBuild => "subtitle build",
            Self::Transcript => "transcript",
            Self::Compositing => "compositing",
            Self::Packaging => "packaging",
            Self::Upload => "upload",
        }
    }

    /// Message returned to HTTP callers
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Request => "Invalid request",
            Self::Workspace => "Error preparing request workspace",
            Self::Download => "Error downloading file",
            Self::AudioExtraction => "Error extracting audio",
            Self::Recognition => "Error transcribing file",
            Self::SubtitleBuild => "Error building subtitle track",
            Self::Transcript => "Error writing transcript",
            Self::Compositing => "Error rendering captioned video",
            Self::Packaging => "Error creating zip archive",
            Self::Upload => "Error uploading zip file",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An error tagged with the pipeline stage it happened in
#[derive(Error, Debug)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: AppError,
}

impl PipelineError {
    pub fn new(stage: Stage, source: impl Into<AppError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }

    /// Plain-text body for HTTP error responses
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.stage.user_message(), self.source)
    }
}

/// Attach a stage to any error convertible into [`AppError`]
pub trait StageContext<T> {
    fn stage(self, stage: Stage) -> Result<T, PipelineError>;
}

impl<T, E: Into<AppError>> StageContext<T> for Result<T, E> {
    fn stage(self, stage: Stage) -> Result<T, PipelineError> {
        self.map_err(|e| PipelineError::new(stage, e))
    }
}
