/*!
 * Speech recognition providers.
 *
 * The pipeline treats the recognizer as an opaque service that turns an audio
 * or video file into timestamped segments:
 * - WhisperApi: OpenAI-compatible `/audio/transcriptions` endpoint
 * - MockRecognizer: canned segments for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;

use crate::errors::UpstreamError;
use crate::transcript_formatter::Segment;

/// Result of transcribing one file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcription {
    /// Timestamped segments in playback order
    pub segments: Vec<Segment>,
    /// Full transcript text
    pub text: String,
    /// Language reported by the service, if any
    pub language: Option<String>,
}

impl Transcription {
    /// Build a transcription whose text is the concatenation of its segments
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let text = segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            segments,
            text,
            language: None,
        }
    }
}

/// Common trait for speech recognition services
///
/// Implementations are constructed once at startup and shared between
/// requests behind an `Arc`.
#[async_trait]
pub trait Recognizer: Send + Sync + Debug {
    /// Transcribe an audio or video file
    ///
    /// # Arguments
    /// * `media` - Path of the file to transcribe
    ///
    /// # Returns
    /// * `Result<Transcription, UpstreamError>` - Segments and text, or a recognition error
    async fn transcribe(&self, media: &Path) -> Result<Transcription, UpstreamError>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

pub mod mock;
pub mod whisper_api;

pub use mock::MockRecognizer;
pub use whisper_api::WhisperApi;
