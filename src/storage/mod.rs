/*!
 * Object store access.
 *
 * Source videos are fetched from, and finished archives pushed to, a bucketed
 * object store. Two backends exist:
 * - SupabaseStore: Supabase Storage REST API
 * - LocalStore: one directory per bucket on the local file system
 */

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{StorageBackend, StorageConfig};
use crate::errors::UpstreamError;

pub mod local;
pub mod supabase;

pub use local::LocalStore;
pub use supabase::SupabaseStore;

/// Bucketed blob storage
#[async_trait]
pub trait ObjectStore: Send + Sync + Debug {
    /// Fetch an object; failures are reported as [`UpstreamError::Download`]
    async fn download(&self, bucket: &str, key: &str) -> Result<Bytes, UpstreamError>;

    /// Store an object, replacing any existing one; failures are reported as [`UpstreamError::Upload`]
    async fn upload(&self, bucket: &str, key: &str, data: Bytes) -> Result<(), UpstreamError>;
}

/// Build the store selected by the configuration
pub fn from_config(config: &StorageConfig) -> Arc<dyn ObjectStore> {
    match config.backend {
        StorageBackend::Supabase => Arc::new(SupabaseStore::new(
            config.url.clone(),
            config.api_key.clone(),
            config.timeout_secs,
        )),
        StorageBackend::Local => Arc::new(LocalStore::new(config.local_root.clone())),
    }
}

/// Reject keys that would escape a bucket
pub(crate) fn check_key(key: &str) -> Result<(), String> {
    if key.trim().is_empty() {
        return Err("object key is empty".to_string());
    }
    if key.starts_with('/') || key.split('/').any(|part| part == "..") {
        return Err(format!("object key {:?} is not a relative path", key));
    }
    Ok(())
}
