/*!
 * Tests for the object store backends
 */

use anyhow::Result;
use bytes::Bytes;

use capsync::app_config::{StorageBackend, StorageConfig};
use capsync::errors::UpstreamError;
use capsync::storage::{self, LocalStore, ObjectStore, SupabaseStore};

use crate::common;

/// Test an upload followed by a download through the local backend
#[tokio::test]
async fn test_localStore_uploadThenDownload_shouldReturnSameBytes() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = LocalStore::new(temp_dir.path());

    store
        .upload("videos", "nested/user1_clip.mp4", Bytes::from_static(common::FAKE_VIDEO))
        .await?;
    let data = store.download("videos", "nested/user1_clip.mp4").await?;

    assert_eq!(data.as_ref(), common::FAKE_VIDEO);
    assert!(temp_dir.path().join("videos/nested/user1_clip.mp4").is_file());
    Ok(())
}

/// Test that a missing object is a download error
#[tokio::test]
async fn test_localStore_withMissingObject_shouldReturnDownloadError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = LocalStore::new(temp_dir.path());

    let error = store.download("videos", "missing.mp4").await.unwrap_err();
    match error {
        UpstreamError::Download { bucket, key, .. } => {
            assert_eq!(bucket, "videos");
            assert_eq!(key, "missing.mp4");
        }
        other => panic!("expected a download error, got {:?}", other),
    }
    Ok(())
}

/// Test that keys escaping the bucket are refused on both directions
#[tokio::test]
async fn test_localStore_withTraversalKey_shouldRefuse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = LocalStore::new(temp_dir.path().join("root"));

    let upload = store.upload("videos", "../escape.zip", Bytes::from_static(b"x")).await;
    assert!(matches!(upload, Err(UpstreamError::Upload { .. })));
    assert!(!temp_dir.path().join("escape.zip").exists());

    let download = store.download("..", "passwd").await;
    assert!(matches!(download, Err(UpstreamError::Download { .. })));
    Ok(())
}

/// Test Supabase object URLs
#[test]
fn test_supabaseStore_objectUrl_shouldEncodeKey() {
    let store = SupabaseStore::new("https://demo.supabase.co/".to_string(), "key".to_string(), 30);

    let url = store.object_url("videos", "user1 clip.mp4").unwrap();
    assert_eq!(
        url.as_str(),
        "https://demo.supabase.co/storage/v1/object/videos/user1%20clip.mp4"
    );
    assert!(store.object_url("videos", "../x").is_err());
}

/// Test that the configuration selects the backend
#[tokio::test]
async fn test_fromConfig_withLocalBackend_shouldUseLocalRoot() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = StorageConfig {
        backend: StorageBackend::Local,
        local_root: temp_dir.path().to_path_buf(),
        ..StorageConfig::default()
    };

    let store = storage::from_config(&config);
    store.upload("b", "k.txt", Bytes::from_static(b"data")).await?;
    assert_eq!(std::fs::read(temp_dir.path().join("b/k.txt"))?, b"data");
    Ok(())
}
