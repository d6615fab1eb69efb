/*!
 * Caption overlay compositing.
 *
 * A caption track is turned into a list of overlay elements (start offset,
 * duration, text, anchor) which are then drawn onto the base video by the
 * media backend in a single encode. Entries that cannot be shown are logged
 * and left out; they never fail the composite.
 */

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::{CaptionConfig, DurationPolicy};
use crate::errors::{MediaError, OverlayWarning};
use crate::media::{MediaBackend, MediaInfo, RenderJob};
use crate::subtitle_track::CaptionTrack;

pub mod drawtext;

/// Horizontal placement of a caption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Horizontal {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical placement of a caption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vertical {
    Top,
    Middle,
    #[default]
    Bottom,
}

/// Where on the frame a caption is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Anchor {
    #[serde(default)]
    pub horizontal: Horizontal,
    #[serde(default)]
    pub vertical: Vertical,
}

/// A caption ready to be drawn on the video
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayElement {
    /// Index of the caption entry this overlay comes from
    pub caption_index: usize,
    /// Seconds from the start of the video
    pub start_offset_seconds: f64,
    /// Seconds the caption stays visible (always > 0)
    pub duration_seconds: f64,
    pub rendered_text: String,
    pub anchor: Anchor,
}

impl OverlayElement {
    /// First instant the overlay is no longer visible
    pub fn end_offset_seconds(&self) -> f64 {
        self.start_offset_seconds + self.duration_seconds
    }
}

/// Overlays derived from a track plus the entries that were dropped or adjusted
#[derive(Debug, Clone, Default)]
pub struct OverlayPlan {
    pub overlays: Vec<OverlayElement>,
    pub warnings: Vec<OverlayWarning>,
}

/// Map every caption entry to an overlay element.
///
/// Entries whose duration is not positive are either skipped or stretched to
/// `min_duration` depending on `policy`. Either way a warning is recorded and
/// the remaining entries are unaffected.
pub fn plan_overlays(
    track: &CaptionTrack,
    anchor: Anchor,
    policy: DurationPolicy,
    min_duration: f64,
) -> OverlayPlan {
    let mut plan = OverlayPlan::default();

    for entry in &track.entries {
        let start = entry.start_seconds();
        let mut duration = entry.end_seconds() - start;

        if duration <= 0.0 {
            let warning = OverlayWarning::NonPositiveDuration {
                index: entry.index,
                duration_seconds: duration,
            };
            match policy {
                DurationPolicy::Reject => {
                    warn!("{}; caption skipped", warning);
                    plan.warnings.push(warning);
                    continue;
                }
                DurationPolicy::Clamp => {
                    warn!("{}; clamped to {:.3}s", warning, min_duration);
                    plan.warnings.push(warning);
                    duration = min_duration;
                }
            }
        }

        plan.overlays.push(OverlayElement {
            caption_index: entry.index,
            start_offset_seconds: start,
            duration_seconds: duration,
            rendered_text: entry.text.clone(),
            anchor,
        });
    }

    plan
}

/// Outcome of one composite
#[derive(Debug, Clone)]
pub struct CompositeReport {
    /// Overlays drawn onto the video
    pub rendered: usize,
    /// Captions skipped or adjusted
    pub warnings: Vec<OverlayWarning>,
    /// Properties of the source video
    pub media: MediaInfo,
}

/// Burns a caption track onto a video through a [`MediaBackend`]
#[derive(Debug, Clone)]
pub struct CaptionOverlayCompositor {
    backend: Arc<dyn MediaBackend>,
    style: CaptionConfig,
}

impl CaptionOverlayCompositor {
    pub fn new(backend: Arc<dyn MediaBackend>, style: CaptionConfig) -> Self {
        Self { backend, style }
    }

    /// Overlay plan for `track` under the configured style and duration policy
    pub fn plan(&self, track: &CaptionTrack) -> OverlayPlan {
        plan_overlays(
            track,
            self.style.anchor,
            self.style.duration_policy,
            self.style.min_duration_secs,
        )
    }

    /// Draw every caption of `track` onto `source`, writing `output`.
    ///
    /// The source is probed first so an undecodable video fails before any
    /// overlay work. Per-overlay text files and the filter script are written
    /// below `scratch_dir`. When nothing is left to draw the output is a plain
    /// copy of the source.
    pub async fn composite(
        &self,
        source: &Path,
        track: &CaptionTrack,
        output: &Path,
        scratch_dir: &Path,
    ) -> Result<CompositeReport, MediaError> {
        let media = self.backend.probe(source).await?;
        debug!(
            "Source {}: {}x{} @ {} fps, audio: {}",
            source.display(),
            media.width,
            media.height,
            media.frame_rate,
            media.has_audio
        );

        let OverlayPlan { overlays, mut warnings } = self.plan(track);

        let overlay_dir = scratch_dir.join("overlays");
        let mut filters = Vec::with_capacity(overlays.len());

        for overlay in &overlays {
            match self.prepare_overlay(overlay, &overlay_dir).await {
                Ok(filter) => filters.push(filter),
                Err(reason) => {
                    let warning = OverlayWarning::Unrenderable {
                        index: overlay.caption_index,
                        reason,
                    };
                    warn!("{}; caption skipped", warning);
                    warnings.push(warning);
                }
            }
        }

        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| MediaError::EncodeFailed(format!("cannot create {}: {}", parent.display(), e)))?;
        }

        if filters.is_empty() {
            info!("No captions to draw, copying source video unchanged");
            tokio::fs::copy(source, output)
                .await
                .map_err(|e| MediaError::EncodeFailed(format!("cannot copy source video: {}", e)))?;
            return Ok(CompositeReport {
                rendered: 0,
                warnings,
                media,
            });
        }

        let filter_script = scratch_dir.join("captions.filter");
        tokio::fs::write(&filter_script, filters.join(",\n"))
            .await
            .map_err(|e| MediaError::EncodeFailed(format!("cannot write filter script: {}", e)))?;

        let job = RenderJob {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            filter_script,
            media: media.clone(),
        };
        self.backend.render(&job).await?;

        info!(
            "Rendered {} caption(s) onto {} ({} skipped or adjusted)",
            filters.len(),
            output.display(),
            warnings.len()
        );

        Ok(CompositeReport {
            rendered: filters.len(),
            warnings,
            media,
        })
    }

    async fn prepare_overlay(&self, overlay: &OverlayElement, overlay_dir: &Path) -> Result<String, String> {
        drawtext::check_renderable(&overlay.rendered_text)?;

        let text_file: PathBuf = overlay_dir.join(format!("caption_{:05}.txt", overlay.caption_index));
        tokio::fs::create_dir_all(overlay_dir)
            .await
            .map_err(|e| format!("cannot create overlay directory: {}", e))?;
        tokio::fs::write(&text_file, overlay.rendered_text.as_bytes())
            .await
            .map_err(|e| format!("cannot write caption text: {}", e))?;

        Ok(drawtext::build_drawtext_filter(overlay, &text_file, &self.style))
    }
}
