use anyhow::{anyhow, Context, Result};
use bytes::Bytes;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::app_config::Config;
use crate::compositor::{CaptionOverlayCompositor, CompositeReport};
use crate::errors::{PipelineError, Stage, StageContext, UpstreamError};
use crate::file_utils::{self, FileManager, RequestWorkspace};
use crate::media::{FfmpegBackend, MediaBackend};
use crate::packaging::{self, ArchiveEntry};
use crate::providers::{Recognizer, WhisperApi};
use crate::storage::{self, ObjectStore};
use crate::subtitle_builder::SubtitleTrackBuilder;
use crate::subtitle_reader::SubtitleTrackReader;
use crate::transcript_formatter::TranscriptFormatter;

// @module: Application controller running the caption pipeline

/// A request to caption one video held in the object store
#[derive(Debug, Clone, PartialEq)]
pub struct TranscribeRequest {
    /// Bucket holding the source and receiving the archive
    pub bucket: String,
    /// Object key of the source video
    pub source: String,
}

impl TranscribeRequest {
    pub fn new(bucket: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            source: source.into(),
        }
    }

    /// Both fields must be present and non-blank
    pub fn validate(&self) -> Result<(), UpstreamError> {
        if self.bucket.trim().is_empty() {
            return Err(UpstreamError::InvalidRequest("bucketName is required".to_string()));
        }
        if self.source.trim().is_empty() {
            return Err(UpstreamError::InvalidRequest("source is required".to_string()));
        }
        Ok(())
    }
}

/// The archive produced for a request
#[derive(Debug, Clone)]
pub struct DeliveredArchive {
    /// Object key the archive was uploaded under
    pub name: String,
    /// Zip content
    pub data: Bytes,
    /// Entries in the caption track
    pub captions: usize,
    /// Captions actually drawn on the video
    pub rendered: usize,
}

/// Artifacts of one pipeline run inside a workspace
#[derive(Debug)]
struct PackagedArtifacts {
    archive_name: String,
    archive_path: PathBuf,
    captions: usize,
    report: CompositeReport,
}

/// Main application controller
///
/// Collaborators are built once and shared by every request.
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Speech recognition service
    recognizer: Arc<dyn Recognizer>,
    // @field: Source and archive storage
    store: Arc<dyn ObjectStore>,
    // @field: ffmpeg or a stand-in
    media: Arc<dyn MediaBackend>,
}

impl Controller {
    pub fn new(
        config: Config,
        recognizer: Arc<dyn Recognizer>,
        store: Arc<dyn ObjectStore>,
        media: Arc<dyn MediaBackend>,
    ) -> Self {
        Self {
            config,
            recognizer,
            store,
            media,
        }
    }

    // @method: Build the production collaborators from configuration
    pub fn with_config(config: Config) -> Self {
        let recognition = &config.recognition;
        let recognizer: Arc<dyn Recognizer> = Arc::new(WhisperApi::new(
            recognition.endpoint.clone(),
            recognition.api_key.clone(),
            recognition.model.clone(),
            recognition.language.clone(),
            recognition.timeout_secs,
        ));
        let store = storage::from_config(&config.storage);
        let media: Arc<dyn MediaBackend> = Arc::new(FfmpegBackend::new(
            config.media.ffmpeg_path.clone(),
            config.media.ffprobe_path.clone(),
            config.media.timeout_secs,
        ));

        Self::new(config, recognizer, store, media)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn compositor(&self) -> CaptionOverlayCompositor {
        CaptionOverlayCompositor::new(Arc::clone(&self.media), self.config.captions.clone())
    }

    /// Caption a stored video, upload the archive next to it and return it
    pub async fn handle_request(&self, request: &TranscribeRequest) -> Result<DeliveredArchive, PipelineError> {
        let request_id = short_request_id();
        let start_time = Instant::now();
        info!("[{}] Captioning {}/{}", request_id, request.bucket, request.source);

        request.validate().stage(Stage::Request)?;
        let source_name = file_utils::source_file_name(&request.source)
            .map_err(|e| UpstreamError::InvalidRequest(e.to_string()))
            .stage(Stage::Request)?;

        let workspace = RequestWorkspace::create(&self.config.workspace.root, &source_name).stage(Stage::Workspace)?;
        debug!("[{}] Workspace {}", request_id, workspace.path().display());

        let result = self.handle_in_workspace(&request_id, request, &workspace).await;

        if self.config.workspace.keep_artifacts {
            let kept = workspace.keep();
            info!("[{}] Artifacts kept in {}", request_id, kept.display());
        } else {
            workspace.cleanup();
        }

        match &result {
            Ok(archive) => info!(
                "[{}] Delivered {} ({} captions, {} drawn) in {}",
                request_id,
                archive.name,
                archive.captions,
                archive.rendered,
                format_duration(start_time.elapsed())
            ),
            Err(e) => error!("[{}] {}", request_id, e),
        }

        result
    }

    async fn handle_in_workspace(
        &self,
        request_id: &str,
        request: &TranscribeRequest,
        workspace: &RequestWorkspace,
    ) -> Result<DeliveredArchive, PipelineError> {
        let data = self
            .store
            .download(&request.bucket, &request.source)
            .await
            .stage(Stage::Download)?;
        tokio::fs::write(workspace.source_path(), &data).await.stage(Stage::Download)?;
        debug!("[{}] Downloaded {} bytes", request_id, data.len());

        let artifacts = self.caption_workspace(request_id, workspace).await?;

        let archive = Bytes::from(
            tokio::fs::read(&artifacts.archive_path)
                .await
                .stage(Stage::Packaging)?,
        );
        self.store
            .upload(&request.bucket, &artifacts.archive_name, archive.clone())
            .await
            .stage(Stage::Upload)?;
        info!("[{}] Uploaded {} to bucket {}", request_id, artifacts.archive_name, request.bucket);

        Ok(DeliveredArchive {
            name: artifacts.archive_name,
            data: archive,
            captions: artifacts.captions,
            rendered: artifacts.report.rendered,
        })
    }

    /// Recognize, caption and package the source already placed in `workspace`
    async fn caption_workspace(
        &self,
        request_id: &str,
        workspace: &RequestWorkspace,
    ) -> Result<PackagedArtifacts, PipelineError> {
        let source = workspace.source_path();

        let recognition_input = if self.config.recognition.extract_audio {
            let audio = workspace.audio_path();
            self.media.extract_audio(&source, &audio).await.stage(Stage::AudioExtraction)?;
            audio
        } else {
            source.clone()
        };

        let transcription = self
            .recognizer
            .transcribe(&recognition_input)
            .await
            .stage(Stage::Recognition)?;
        info!(
            "[{}] {} returned {} segment(s)",
            request_id,
            self.recognizer.name(),
            transcription.segments.len()
        );

        let document = TranscriptFormatter::new().format(&transcription.segments);
        if self.config.workspace.keep_intermediate {
            document
                .write_to_file(workspace.intermediate_path())
                .stage(Stage::Transcript)?;
        }

        let track = SubtitleTrackBuilder::for_language(self.config.captions.track_language.clone())
            .build(&document)
            .stage(Stage::SubtitleBuild)?;
        track.write_to_srt(workspace.srt_path()).stage(Stage::SubtitleBuild)?;

        tokio::fs::write(workspace.transcript_path(), transcription.text.as_bytes())
            .await
            .stage(Stage::Transcript)?;

        let report = self
            .compositor()
            .composite(&source, &track, &workspace.captioned_path(), &workspace.scratch_dir())
            .await
            .stage(Stage::Compositing)?;

        let archive_name =
            packaging::archive_name(workspace.source_name(), &file_utils::timestamp_now(), request_id);
        let archive_path = workspace.path().join(&archive_name);
        let entries = vec![
            ArchiveEntry::from_path(workspace.captioned_path()).stage(Stage::Packaging)?,
            ArchiveEntry::from_path(workspace.srt_path()).stage(Stage::Packaging)?,
            ArchiveEntry::from_path(workspace.transcript_path()).stage(Stage::Packaging)?,
        ];
        let size = packaging::write_archive_async(archive_path.clone(), entries)
            .await
            .stage(Stage::Packaging)?;
        debug!("[{}] Archive {} is {} bytes", request_id, archive_name, size);

        Ok(PackagedArtifacts {
            archive_name,
            archive_path,
            captions: track.len(),
            report,
        })
    }

    /// Caption a local video and copy the archive into `output_dir`
    pub async fn run_local(&self, input_file: &Path, output_dir: &Path) -> Result<PathBuf> {
        let start_time = Instant::now();
        let request_id = short_request_id();

        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {}", input_file.display()));
        }
        FileManager::ensure_dir(output_dir)?;

        let source_name = input_file
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("Input path has no file name: {}", input_file.display()))?;
        let workspace = RequestWorkspace::create(&self.config.workspace.root, &source_name)?;
        FileManager::copy_file(input_file, workspace.source_path())?;

        let result = self.caption_workspace(&request_id, &workspace).await;
        let delivered = result.and_then(|artifacts| {
            let destination = output_dir.join(&artifacts.archive_name);
            FileManager::copy_file(&artifacts.archive_path, &destination)
                .map(|_| destination)
                .stage(Stage::Packaging)
        });

        if self.config.workspace.keep_artifacts {
            info!("Artifacts kept in {}", workspace.keep().display());
        } else {
            workspace.cleanup();
        }

        let destination = delivered.map_err(|e| anyhow!(e.user_message()))?;
        info!(
            "Captioned {} in {} -> {}",
            input_file.display(),
            format_duration(start_time.elapsed()),
            destination.display()
        );
        Ok(destination)
    }

    /// Caption every video below `input_dir`, continuing past failures
    pub async fn run_folder(&self, input_dir: &Path, output_dir: &Path) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {}", input_dir.display()));
        }

        let video_files = FileManager::find_videos(input_dir)?;
        if video_files.is_empty() {
            return Err(anyhow!("No video files found in directory: {}", input_dir.display()));
        }

        let folder_pb = ProgressBar::new(video_files.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));

        let mut summary = FolderSummary::default();

        for video_file in &video_files {
            let file_name = video_file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            match self.run_local(video_file, output_dir).await {
                Ok(archive) => summary.archives.push(archive),
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.failed.push(video_file.clone());
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed: {} captioned, {} errors in {}",
            summary.archives.len(),
            summary.failed.len(),
            format_duration(start_time.elapsed())
        );

        Ok(summary)
    }

    /// Draw an existing SRT file onto a video
    pub async fn burn_subtitles(&self, video: &Path, subtitles: &Path, output: &Path) -> Result<CompositeReport> {
        let reader = SubtitleTrackReader::for_language(self.config.captions.track_language.clone());
        let set = reader.read_file(subtitles)?;
        let track = set
            .into_default_track()
            .ok_or_else(|| anyhow!("No caption track in {}", subtitles.display()))?;
        info!("Read {} from {}", track, subtitles.display());

        let scratch = tempfile::Builder::new()
            .prefix("capsync_burn_")
            .tempdir_in(&self.config.workspace.root)
            .or_else(|_| tempfile::tempdir())
            .context("Failed to create scratch directory")?;

        let report = self
            .compositor()
            .composite(video, &track, output, scratch.path())
            .await
            .with_context(|| format!("Failed to burn captions onto {}", video.display()))?;

        if !report.warnings.is_empty() {
            warn!("{} caption(s) were skipped or adjusted", report.warnings.len());
        }
        Ok(report)
    }
}

/// Result of a folder run
#[derive(Debug, Default)]
pub struct FolderSummary {
    /// Archives written to the output directory
    pub archives: Vec<PathBuf>,
    /// Inputs that failed
    pub failed: Vec<PathBuf>,
}

fn short_request_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Human friendly elapsed time
pub fn format_duration(duration: std::time::Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}.{:03}s", seconds, duration.subsec_millis())
    }
}
