use async_trait::async_trait;
use log::{debug, error};
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::errors::UpstreamError;
use crate::language_utils;
use crate::providers::{Recognizer, Transcription};
use crate::transcript_formatter::Segment;

/// Client for an OpenAI-compatible speech-to-text endpoint
#[derive(Debug)]
pub struct WhisperApi {
    /// HTTP client for making requests
    client: Client,
    /// Base URL, e.g. `https://api.openai.com/v1`
    endpoint: String,
    /// Bearer token, may be empty for self-hosted servers
    api_key: String,
    /// Model name
    model: String,
    /// ISO 639-1 hint or `auto`
    language: String,
}

/// `verbose_json` response body
#[derive(Debug, Deserialize)]
pub struct VerboseTranscription {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub segments: Vec<VerboseSegment>,
}

/// One segment of a `verbose_json` response; extra fields are ignored
#[derive(Debug, Deserialize)]
pub struct VerboseSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl WhisperApi {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        language: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            language: language.into(),
        }
    }

    fn transcriptions_url(&self) -> String {
        format!("{}/audio/transcriptions", self.endpoint.trim_end_matches('/'))
    }

    /// Convert a response body into segments, leading whitespace trimmed
    pub fn parse_response(body: &str) -> Result<Transcription, UpstreamError> {
        let parsed: VerboseTranscription = serde_json::from_str(body).map_err(|e| {
            UpstreamError::Recognition(format!("unexpected response body: {}", e))
        })?;

        let segments = parsed
            .segments
            .into_iter()
            .map(|s| Segment::new(s.start, s.end, s.text.trim()))
            .collect();

        Ok(Transcription {
            segments,
            text: parsed.text.trim().to_string(),
            language: parsed.language,
        })
    }
}

#[async_trait]
impl Recognizer for WhisperApi {
    async fn transcribe(&self, media: &Path) -> Result<Transcription, UpstreamError> {
        let content = tokio::fs::read(media).await.map_err(|e| {
            UpstreamError::Recognition(format!("cannot read {}: {}", media.display(), e))
        })?;
        let file_name = media
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();

        let mut form = Form::new()
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .part("file", Part::bytes(content).file_name(file_name));
        if !self.language.eq_ignore_ascii_case(language_utils::AUTO_LANGUAGE) {
            // The API expects ISO 639-1 codes
            let code = language_utils::normalize_to_part1_or_part2t(&self.language)
                .unwrap_or_else(|_| self.language.clone());
            form = form.text("language", code);
        }

        debug!("Sending {} to {} ({})", media.display(), self.transcriptions_url(), self.model);

        let mut request = self.client.post(self.transcriptions_url()).multipart(form);
        if !self.api_key.is_empty() {
            request = request.header(AUTHORIZATION, format!("Bearer {}", self.api_key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::Recognition(format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Recognition(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            error!("Recognition service returned {}: {}", status, body);
            return Err(UpstreamError::Recognition(format!("HTTP {}: {}", status, body)));
        }

        Self::parse_response(&body)
    }

    fn name(&self) -> &str {
        "whisper-api"
    }
}
