use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, error};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::errors::UpstreamError;
use crate::storage::{check_key, ObjectStore};

/// Supabase Storage client (`/storage/v1/object/{bucket}/{key}`)
#[derive(Debug)]
pub struct SupabaseStore {
    /// HTTP client for making requests
    client: Client,
    /// Project URL, e.g. `https://xyz.supabase.co`
    base_url: String,
    /// Service role key, sent as bearer token and `apikey` header
    api_key: String,
}

impl SupabaseStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// URL of an object, each key segment percent-encoded
    pub fn object_url(&self, bucket: &str, key: &str) -> Result<Url, String> {
        check_key(key)?;
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| format!("invalid storage URL {:?}: {}", self.base_url, e))?;
        url.path_segments_mut()
            .map_err(|_| format!("storage URL {:?} cannot be a base", self.base_url))?
            .pop_if_empty()
            .extend(["storage", "v1", "object", bucket])
            .extend(key.split('/'));
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header("apikey", &self.api_key)
    }
}

fn content_type_for(key: &str) -> &'static str {
    match key.rsplit('.').next().map(|e| e.to_ascii_lowercase()).as_deref() {
        Some("zip") => "application/zip",
        Some("mp4") => "video/mp4",
        Some("srt") => "application/x-subrip",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl ObjectStore for SupabaseStore {
    async fn download(&self, bucket: &str, key: &str) -> Result<Bytes, UpstreamError> {
        let failed = |reason: String| UpstreamError::Download {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason,
        };

        let url = self.object_url(bucket, key).map_err(failed)?;
        debug!("GET {}", url);

        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|e| failed(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Storage download of {}/{} returned {}: {}", bucket, key, status, body);
            return Err(failed(format!("HTTP {}: {}", status, body)));
        }

        response
            .bytes()
            .await
            .map_err(|e| failed(format!("failed to read body: {}", e)))
    }

    async fn upload(&self, bucket: &str, key: &str, data: Bytes) -> Result<(), UpstreamError> {
        let failed = |reason: String| UpstreamError::Upload {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason,
        };

        let url = self.object_url(bucket, key).map_err(failed)?;
        debug!("POST {} ({} bytes)", url, data.len());

        let response = self
            .request(reqwest::Method::POST, url)
            .header(CONTENT_TYPE, content_type_for(key))
            .header("x-upsert", "true")
            .body(data)
            .send()
            .await
            .map_err(|e| failed(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Storage upload of {}/{} returned {}: {}", bucket, key, status, body);
            return Err(failed(format!("HTTP {}: {}", status, body)));
        }

        Ok(())
    }
}
