use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use std::path::PathBuf;

use crate::errors::UpstreamError;
use crate::storage::{check_key, ObjectStore};

/// Store keeping each bucket as a directory below `root`
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File backing an object
    pub fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, String> {
        check_key(bucket)?;
        check_key(key)?;
        Ok(self.root.join(bucket).join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn download(&self, bucket: &str, key: &str) -> Result<Bytes, UpstreamError> {
        let failed = |reason: String| UpstreamError::Download {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason,
        };

        let path = self.object_path(bucket, key).map_err(failed)?;
        debug!("Reading object {}", path.display());
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| failed(format!("{}: {}", path.display(), e)))?;
        Ok(Bytes::from(data))
    }

    async fn upload(&self, bucket: &str, key: &str, data: Bytes) -> Result<(), UpstreamError> {
        let failed = |reason: String| UpstreamError::Upload {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason,
        };

        let path = self.object_path(bucket, key).map_err(failed)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| failed(format!("{}: {}", parent.display(), e)))?;
        }
        debug!("Writing object {} ({} bytes)", path.display(), data.len());
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| failed(format!("{}: {}", path.display(), e)))
    }
}
