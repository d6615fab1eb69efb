/*!
 * Common test utilities for the capsync test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use capsync::app_config::{Config, StorageBackend};
use capsync::app_controller::Controller;
use capsync::providers::MockRecognizer;
use capsync::storage::LocalStore;

// Re-export the stub media backend module
pub mod stub_media;

pub use stub_media::StubMediaBackend;

/// Bytes standing in for a decodable video
pub const FAKE_VIDEO: &[u8] = b"FAKEVIDEO\x00\x01\x02 frames";

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    let content = "1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains multiple entries.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.
";
    create_test_file(dir, filename, content.as_bytes())
}

/// Config using a local store and workspace below `root`
pub fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.storage.backend = StorageBackend::Local;
    config.storage.local_root = root.join("store");
    config.workspace.root = root.join("work");
    config
}

/// Controller wired to the mock recognizer, a local store and the stub media backend
pub fn test_controller(
    config: Config,
    recognizer: MockRecognizer,
    media: StubMediaBackend,
) -> Controller {
    let store = Arc::new(LocalStore::new(config.storage.local_root.clone()));
    Controller::new(config, Arc::new(recognizer), store, Arc::new(media))
}

/// Number of entries in a workspace root (request directories left behind)
pub fn count_entries(dir: &Path) -> usize {
    fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}
