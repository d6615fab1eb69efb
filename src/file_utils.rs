use anyhow::{anyhow, Context, Result};
use chrono::Local;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

// @module: File, directory and per-request workspace utilities

// @const: Video containers ffmpeg handles out of the box
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "ogv", "ts", "mts", "m2ts",
];

// @const: First SRT block (index line followed by a time range)
static SRT_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+\s*\r?\n\d{2}:\d{2}:\d{2}[,.]\d{3}\s+-->\s+\d{2}:\d{2}:\d{2}[,.]\d{3}").unwrap()
});

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    /// Find all video files below a directory, sorted by path
    pub fn find_videos<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && has_video_extension(path) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Copy a file from one location to another, ensuring the target directory exists
    pub fn copy_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(anyhow!("Source file does not exist: {}", from.display()));
        }
        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        fs::copy(from, to)
            .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
        Ok(())
    }

    /// Detect if a file is a subtitle file (SRT) or a video file
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow!("File does not exist: {}", path.display()));
        }

        if let Some(ext) = path.extension() {
            if ext.to_string_lossy().eq_ignore_ascii_case("srt") {
                return Ok(FileType::Subtitle);
            }
        }
        if has_video_extension(path) {
            return Ok(FileType::Video);
        }

        // Extension-less subtitle files are still recognized by their content
        if let Ok(content) = fs::read_to_string(path) {
            if SRT_BLOCK_REGEX.is_match(&content) {
                return Ok(FileType::Subtitle);
            }
        }

        Ok(FileType::Unknown)
    }
}

fn has_video_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            VIDEO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Enum representing different file types
#[derive(Debug, PartialEq, Eq)]
pub enum FileType {
    /// Subtitle file (SRT)
    Subtitle,
    /// Video file supported by ffmpeg
    Video,
    /// Unknown file type
    Unknown,
}

/// Final path component of an object key or path, rejecting empty and dot names
pub fn source_file_name(source: &str) -> Result<String> {
    let name = source
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .unwrap_or_default();

    if name.is_empty() || name == "." || name == ".." {
        return Err(anyhow!("Source {:?} does not name a file", source));
    }
    Ok(name.to_string())
}

/// File name without its last extension
pub fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(pos) if pos > 0 => &name[..pos],
        _ => name,
    }
}

/// Owner prefix of a source name: the stem up to its first `_`
pub fn user_id_from(name: &str) -> &str {
    let stem = file_stem(name);
    stem.split('_').next().unwrap_or(stem)
}

/// Local timestamp used in workspace and archive names
pub fn timestamp_now() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Private directory holding every artifact of one request.
///
/// Named `<stem>_<YYYYmmdd_HHMMSS>_<random>` below the workspace root, so two
/// requests never share a path even for the same source at the same second.
/// The directory is removed on drop unless [`RequestWorkspace::keep`] is called.
#[derive(Debug)]
pub struct RequestWorkspace {
    dir: TempDir,
    source_name: String,
}

impl RequestWorkspace {
    /// Create a workspace for `source_name` below `root`
    pub fn create<P: AsRef<Path>>(root: P, source_name: &str) -> Result<Self> {
        let root = root.as_ref();
        FileManager::ensure_dir(root)?;

        let source_name = source_file_name(source_name)?;
        let prefix = format!("{}_{}_", sanitize_component(file_stem(&source_name)), timestamp_now());

        let dir = tempfile::Builder::new()
            .prefix(&prefix)
            .tempdir_in(root)
            .with_context(|| format!("Failed to create request workspace in {}", root.display()))?;
        debug!("Created request workspace {}", dir.path().display());

        Ok(Self { dir, source_name })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Base name of the source, e.g. `user1_clip.mp4`
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn stem(&self) -> &str {
        file_stem(&self.source_name)
    }

    /// Downloaded source video
    pub fn source_path(&self) -> PathBuf {
        self.path().join(&self.source_name)
    }

    /// Audio track extracted for recognition
    pub fn audio_path(&self) -> PathBuf {
        self.path().join(format!("{}_audio.wav", self.stem()))
    }

    /// Delivered subtitle file
    pub fn srt_path(&self) -> PathBuf {
        self.path().join(format!("{}.srt", self.stem()))
    }

    /// Delivered plain-text transcript
    pub fn transcript_path(&self) -> PathBuf {
        self.path().join(format!("{}.txt", self.stem()))
    }

    /// Timestamped transcript kept for inspection
    pub fn intermediate_path(&self) -> PathBuf {
        self.path().join(format!("{}_timestamped.txt", self.stem()))
    }

    /// Captioned output video
    pub fn captioned_path(&self) -> PathBuf {
        self.path().join(format!("captioned_{}", self.source_name))
    }

    /// Overlay text files and filter scripts
    pub fn scratch_dir(&self) -> PathBuf {
        self.path().join("scratch")
    }

    /// Leave the directory on disk and return its path
    pub fn keep(self) -> PathBuf {
        self.dir.into_path()
    }

    /// Remove the directory now, logging instead of failing
    pub fn cleanup(self) {
        let path = self.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!("Failed to remove request workspace {}: {}", path.display(), e);
        }
    }
}

/// Replace characters that are awkward in directory names
fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "source".to_string()
    } else {
        cleaned
    }
}
