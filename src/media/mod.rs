/*!
 * Media backend abstraction.
 *
 * The compositor and controller never spawn processes themselves; they talk
 * to a [`MediaBackend`]. The production backend drives the ffmpeg and ffprobe
 * command line tools, tests substitute a stub.
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use crate::errors::MediaError;

pub mod ffmpeg;

pub use ffmpeg::FfmpegBackend;

/// Stream properties of a source video
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Frame rate as reported by the container, e.g. `30000/1001`
    pub frame_rate: String,
    /// Whether at least one audio stream is present
    pub has_audio: bool,
    /// Container duration in seconds, when known
    pub duration_seconds: Option<f64>,
}

/// One composite encode
#[derive(Debug, Clone)]
pub struct RenderJob {
    /// Base video
    pub source: PathBuf,
    /// Captioned output
    pub output: PathBuf,
    /// File holding the video filter chain
    pub filter_script: PathBuf,
    /// Probed properties of the source, preserved in the output
    pub media: MediaInfo,
}

/// Operations the pipeline needs from a media toolkit
#[async_trait]
pub trait MediaBackend: Send + Sync + Debug {
    /// Inspect a video; failure means the source cannot be decoded
    async fn probe(&self, source: &Path) -> Result<MediaInfo, MediaError>;

    /// Encode `job.source` through the filter script into `job.output`
    async fn render(&self, job: &RenderJob) -> Result<(), MediaError>;

    /// Extract a 16 kHz mono WAV track for speech recognition
    async fn extract_audio(&self, source: &Path, output: &Path) -> Result<(), MediaError>;
}
