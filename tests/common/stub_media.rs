/*!
 * Media backend stand-in that never spawns ffmpeg.
 *
 * - `probe` accepts any existing file not starting with `CORRUPT`
 * - `render` writes the source bytes followed by the filter script
 * - `extract_audio` writes a tiny WAV header
 */

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};

use capsync::errors::MediaError;
use capsync::media::{MediaBackend, MediaInfo, RenderJob};

/// Separator between the copied source and the filter script in rendered output
pub const RENDER_MARKER: &[u8] = b"\n--captions--\n";

/// Recorded render call
#[derive(Debug, Clone)]
pub struct RenderedJob {
    pub job: RenderJob,
    pub filter_script: String,
}

#[derive(Debug, Clone, Default)]
pub struct StubMediaBackend {
    renders: Arc<Mutex<Vec<RenderedJob>>>,
    audio_extractions: Arc<Mutex<usize>>,
    fail_render: bool,
}

impl StubMediaBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose encoder always fails
    pub fn failing_render() -> Self {
        Self {
            fail_render: true,
            ..Self::default()
        }
    }

    pub fn renders(&self) -> Vec<RenderedJob> {
        self.renders.lock().unwrap().clone()
    }

    pub fn audio_extractions(&self) -> usize {
        *self.audio_extractions.lock().unwrap()
    }
}

#[async_trait]
impl MediaBackend for StubMediaBackend {
    async fn probe(&self, source: &Path) -> Result<MediaInfo, MediaError> {
        let data = tokio::fs::read(source).await.map_err(|e| MediaError::SourceMedia {
            path: source.display().to_string(),
            reason: e.to_string(),
        })?;
        if data.starts_with(b"CORRUPT") {
            return Err(MediaError::SourceMedia {
                path: source.display().to_string(),
                reason: "Invalid data found when processing input".to_string(),
            });
        }

        Ok(MediaInfo {
            width: 1280,
            height: 720,
            frame_rate: "25/1".to_string(),
            has_audio: true,
            duration_seconds: Some(10.0),
        })
    }

    async fn render(&self, job: &RenderJob) -> Result<(), MediaError> {
        if self.fail_render {
            return Err(MediaError::EncodeFailed("Conversion failed!".to_string()));
        }

        let filter_script = tokio::fs::read_to_string(&job.filter_script)
            .await
            .map_err(|e| MediaError::EncodeFailed(e.to_string()))?;
        let mut output = tokio::fs::read(&job.source)
            .await
            .map_err(|e| MediaError::EncodeFailed(e.to_string()))?;
        output.extend_from_slice(RENDER_MARKER);
        output.extend_from_slice(filter_script.as_bytes());
        tokio::fs::write(&job.output, output)
            .await
            .map_err(|e| MediaError::EncodeFailed(e.to_string()))?;

        self.renders.lock().unwrap().push(RenderedJob {
            job: job.clone(),
            filter_script,
        });
        Ok(())
    }

    async fn extract_audio(&self, source: &Path, output: &Path) -> Result<(), MediaError> {
        self.probe(source).await?;
        tokio::fs::write(output, b"RIFF\x24\x00\x00\x00WAVEfmt ")
            .await
            .map_err(|e| MediaError::EncodeFailed(e.to_string()))?;
        *self.audio_extractions.lock().unwrap() += 1;
        Ok(())
    }
}
