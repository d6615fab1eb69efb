use async_trait::async_trait;
use log::{debug, error};
use serde_json::Value;
use std::path::Path;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

use crate::errors::MediaError;
use crate::media::{MediaBackend, MediaInfo, RenderJob};

// @module: ffmpeg / ffprobe command line backend

/// Backend running the ffmpeg and ffprobe executables
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    ffmpeg: String,
    ffprobe: String,
    timeout: Duration,
}

impl FfmpegBackend {
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Run a tool, enforcing the configured timeout
    async fn run(&self, program: &str, args: &[String]) -> Result<Output, MediaError> {
        debug!("Running {} {}", program, args.join(" "));

        let future = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output();

        tokio::select! {
            result = future => {
                result.map_err(|e| MediaError::ToolUnavailable {
                    tool: program.to_string(),
                    reason: e.to_string(),
                })
            },
            _ = tokio::time::sleep(self.timeout) => {
                Err(MediaError::Timeout {
                    tool: program.to_string(),
                    secs: self.timeout.as_secs(),
                })
            }
        }
    }

    /// Parse `ffprobe -show_streams -show_format -of json` output
    pub fn parse_probe_output(json: &str) -> Result<MediaInfo, String> {
        let json: Value = serde_json::from_str(json)
            .map_err(|e| format!("unreadable ffprobe output: {}", e))?;

        let streams = json
            .get("streams")
            .and_then(|s| s.as_array())
            .ok_or_else(|| "no streams reported".to_string())?;

        let video = streams
            .iter()
            .find(|s| s.get("codec_type").and_then(|t| t.as_str()) == Some("video"))
            .ok_or_else(|| "no video stream found".to_string())?;

        let dimension = |key: &str| {
            video
                .get(key)
                .and_then(|v| v.as_u64())
                .filter(|v| *v > 0)
                .map(|v| v as u32)
                .ok_or_else(|| format!("video stream has no {}", key))
        };
        let width = dimension("width")?;
        let height = dimension("height")?;

        let frame_rate = ["r_frame_rate", "avg_frame_rate"]
            .iter()
            .filter_map(|key| video.get(*key).and_then(|v| v.as_str()))
            .find(|rate| !rate.is_empty() && !rate.starts_with('0'))
            .ok_or_else(|| "video stream has no frame rate".to_string())?
            .to_string();

        let has_audio = streams
            .iter()
            .any(|s| s.get("codec_type").and_then(|t| t.as_str()) == Some("audio"));

        let duration_seconds = json
            .get("format")
            .and_then(|f| f.get("duration"))
            .and_then(|d| d.as_str())
            .and_then(|d| d.parse::<f64>().ok());

        Ok(MediaInfo {
            width,
            height,
            frame_rate,
            has_audio,
            duration_seconds,
        })
    }

    /// Filter ffmpeg stderr to only show meaningful error lines, stripping the
    /// version banner, build configuration, and stream metadata noise.
    ///
    /// Banner details (`built with`, `lib...` versions, stream metadata) are
    /// indented by ffmpeg, so those prefixes only match indented lines.
    pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
        let top_level_prefixes = [
            "ffmpeg version",
            "ffprobe version",
            "Input #",
            "Output #",
            "Stream mapping:",
            "Press [q]",
        ];
        let indented_prefixes = [
            "built with",
            "configuration:",
            "lib",
            "Metadata:",
            "Duration:",
            "Chapter",
            "Stream #",
        ];

        let meaningful: Vec<&str> = stderr
            .lines()
            .filter(|line| {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    return false;
                }
                let prefixes: &[&str] = if line.starts_with(char::is_whitespace) {
                    &indented_prefixes
                } else {
                    &top_level_prefixes
                };
                !prefixes.iter().any(|p| trimmed.starts_with(p))
            })
            .map(str::trim)
            .collect();

        if meaningful.is_empty() {
            "unknown ffmpeg error (stderr was empty after filtering)".to_string()
        } else {
            meaningful.join("\n")
        }
    }
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe", 600)
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[async_trait]
impl MediaBackend for FfmpegBackend {
    async fn probe(&self, source: &Path) -> Result<MediaInfo, MediaError> {
        let source_media = |reason: String| MediaError::SourceMedia {
            path: source.display().to_string(),
            reason,
        };

        if !source.is_file() {
            return Err(source_media("file does not exist".to_string()));
        }

        let args: Vec<String> = vec![
            "-v".into(),
            "error".into(),
            "-show_streams".into(),
            "-show_format".into(),
            "-of".into(),
            "json".into(),
            path_arg(source),
        ];
        let output = self.run(&self.ffprobe, &args).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(source_media(Self::filter_ffmpeg_stderr(&stderr)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_probe_output(&stdout).map_err(source_media)
    }

    async fn render(&self, job: &RenderJob) -> Result<(), MediaError> {
        let mut args: Vec<String> = vec![
            "-y".into(),
            "-hide_banner".into(),
            "-i".into(),
            path_arg(&job.source),
            "-filter_script:v".into(),
            path_arg(&job.filter_script),
            "-map".into(),
            "0:v:0".into(),
        ];
        if job.media.has_audio {
            args.extend(["-map", "0:a", "-c:a", "copy"].map(String::from));
        }
        args.extend([String::from("-r"), job.media.frame_rate.clone(), path_arg(&job.output)]);

        let output = self.run(&self.ffmpeg, &args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let filtered = Self::filter_ffmpeg_stderr(&stderr);
            error!("Caption render failed: {}", filtered);
            return Err(MediaError::EncodeFailed(filtered));
        }

        Ok(())
    }

    async fn extract_audio(&self, source: &Path, output: &Path) -> Result<(), MediaError> {
        let args: Vec<String> = vec![
            "-y".into(),
            "-hide_banner".into(),
            "-i".into(),
            path_arg(source),
            "-vn".into(),
            "-ac".into(),
            "1".into(),
            "-ar".into(),
            "16000".into(),
            "-f".into(),
            "wav".into(),
            path_arg(output),
        ];

        let result = self.run(&self.ffmpeg, &args).await?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(MediaError::SourceMedia {
                path: source.display().to_string(),
                reason: Self::filter_ffmpeg_stderr(&stderr),
            });
        }

        Ok(())
    }
}
