/*!
 * Mock recognizer for testing.
 *
 * - `MockRecognizer::working()` - returns two short segments
 * - `MockRecognizer::with_segments(..)` - returns the given segments
 * - `MockRecognizer::failing()` - always fails with a recognition error
 */

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::errors::UpstreamError;
use crate::providers::{Recognizer, Transcription};
use crate::transcript_formatter::Segment;

/// Behavior mode for the mock recognizer
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Succeeds with the given segments
    Segments(Vec<Segment>),
    /// Always fails
    Failing,
}

/// Mock recognizer recording which files it was asked to transcribe
#[derive(Debug, Clone)]
pub struct MockRecognizer {
    behavior: MockBehavior,
    calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockRecognizer {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Two segments: `[0.0, 1.0) "a"` and `[1.5, 3.2) "b"`
    pub fn working() -> Self {
        Self::with_segments(vec![Segment::new(0.0, 1.0, "a"), Segment::new(1.5, 3.2, "b")])
    }

    pub fn with_segments(segments: Vec<Segment>) -> Self {
        Self::new(MockBehavior::Segments(segments))
    }

    /// Recognizer that hears nothing
    pub fn silent() -> Self {
        Self::with_segments(Vec::new())
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Files passed to `transcribe` so far
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Recognizer for MockRecognizer {
    async fn transcribe(&self, media: &Path) -> Result<Transcription, UpstreamError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(media.to_path_buf());
        }

        match &self.behavior {
            MockBehavior::Segments(segments) => Ok(Transcription::from_segments(segments.clone())),
            MockBehavior::Failing => Err(UpstreamError::Recognition(
                "Simulated recognition failure".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
