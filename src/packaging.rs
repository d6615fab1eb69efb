use anyhow::{anyhow, Context, Result};
use log::debug;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::file_utils::{file_stem, user_id_from};

// @module: Delivery archive

/// Name returned to HTTP callers in `Content-Disposition`
pub const DOWNLOAD_FILE_NAME: &str = "captioned_files.zip";

/// A file placed in the archive under `name`
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub name: String,
    pub path: PathBuf,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Entry stored under the file's own base name
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let name = path
            .file_name()
            .ok_or_else(|| anyhow!("Archive entry has no file name: {}", path.display()))?
            .to_string_lossy()
            .into_owned();
        Ok(Self { name, path })
    }
}

/// `<user id>_captioned_<source stem>_<timestamp>_<request id>.zip`
///
/// The archive is uploaded next to other users' and other requests' archives,
/// so the full stem and the request id keep the key unique per request.
pub fn archive_name(source_name: &str, timestamp: &str, request_id: &str) -> String {
    format!(
        "{}_captioned_{}_{}_{}.zip",
        user_id_from(source_name),
        file_stem(source_name),
        timestamp,
        request_id
    )
}

/// Write a deflate-compressed zip holding exactly `entries`, in order
pub fn write_archive(archive_path: &Path, entries: &[ArchiveEntry]) -> Result<u64> {
    let file = File::create(archive_path)
        .with_context(|| format!("Failed to create archive: {}", archive_path.display()))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        let source = File::open(&entry.path)
            .with_context(|| format!("Failed to open archive entry: {}", entry.path.display()))?;
        zip.start_file(entry.name.as_str(), options)
            .with_context(|| format!("Failed to add {} to archive", entry.name))?;
        let copied = std::io::copy(&mut BufReader::new(source), &mut zip)
            .with_context(|| format!("Failed to write {} to archive", entry.name))?;
        debug!("Archived {} ({} bytes)", entry.name, copied);
    }

    zip.finish().context("Failed to finalize archive")?;

    let size = std::fs::metadata(archive_path)
        .with_context(|| format!("Failed to stat archive: {}", archive_path.display()))?
        .len();
    Ok(size)
}

/// [`write_archive`] on the blocking thread pool
pub async fn write_archive_async(archive_path: PathBuf, entries: Vec<ArchiveEntry>) -> Result<u64> {
    tokio::task::spawn_blocking(move || write_archive(&archive_path, &entries))
        .await
        .context("Archive task panicked")?
}
