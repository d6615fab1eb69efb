use std::path::Path;

use crate::app_config::CaptionConfig;
use crate::compositor::{Anchor, Horizontal, OverlayElement, Vertical};

// @module: ffmpeg drawtext filter construction

fn escape_ffmpeg_filter_value(raw: &str) -> String {
    // `:` and `,` separate options and filters, `\` escapes.
    raw.replace('\\', r"\\")
        .replace(':', r"\:")
        .replace(',', r"\,")
        .replace('\'', r"\'")
}

/// Reasons a caption text cannot be drawn
pub fn check_renderable(text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err("caption text is empty".to_string());
    }
    if let Some(c) = text.chars().find(|c| c.is_control() && *c != '\n' && *c != '\t') {
        return Err(format!("unsupported control character U+{:04X}", c as u32));
    }
    Ok(())
}

fn position_expressions(anchor: Anchor, margin: u32) -> (String, String) {
    let x = match anchor.horizontal {
        Horizontal::Left => format!("{}", margin),
        Horizontal::Center => "(w-text_w)/2".to_string(),
        Horizontal::Right => format!("w-text_w-{}", margin),
    };
    let y = match anchor.vertical {
        Vertical::Top => format!("{}", margin),
        Vertical::Middle => "(h-text_h)/2".to_string(),
        Vertical::Bottom => format!("h-text_h-{}", margin),
    };
    (x, y)
}

/// Build the drawtext filter for one overlay.
///
/// The text itself is read from `text_file` with expansion disabled so caption
/// content never needs filtergraph escaping. The overlay is enabled on the
/// half-open window `[start, start + duration)`.
pub fn build_drawtext_filter(overlay: &OverlayElement, text_file: &Path, style: &CaptionConfig) -> String {
    let font = match &style.font_file {
        Some(file) => format!("fontfile='{}'", escape_ffmpeg_filter_value(&file.to_string_lossy())),
        None => format!("font='{}'", escape_ffmpeg_filter_value(&style.font)),
    };
    let (x, y) = position_expressions(overlay.anchor, style.bottom_margin);
    let start = overlay.start_offset_seconds;
    let end = overlay.start_offset_seconds + overlay.duration_seconds;

    format!(
        "drawtext=textfile='{}':expansion=none:{}:fontsize={}:fontcolor={}:x={}:y={}:enable='gte(t,{:.3})*lt(t,{:.3})'",
        escape_ffmpeg_filter_value(&text_file.to_string_lossy()),
        font,
        style.font_size,
        escape_ffmpeg_filter_value(&style.font_color),
        x,
        y,
        start,
        end
    )
}
