use log::{debug, warn};

use crate::errors::SubtitleError;
use crate::subtitle_track::{CaptionTrack, DEFAULT_TRACK_LANGUAGE};
use crate::timecode::{self, Timecode};
use crate::transcript_formatter::{IntermediateDocument, Segment, TIME_RANGE_MARKER};
use crate::validation::TimecodeValidator;

// @module: Intermediate document -> validated caption track

/// Builds caption tracks from recognition output.
///
/// Lines of an [`IntermediateDocument`] without the `-->` marker are not
/// captions and are skipped. A line that has the marker but not the
/// `[start --> end] text` shape is an error.
pub struct SubtitleTrackBuilder {
    language: String,
    validator: TimecodeValidator,
}

impl SubtitleTrackBuilder {
    pub fn new() -> Self {
        Self::for_language(DEFAULT_TRACK_LANGUAGE)
    }

    /// Builder producing tracks tagged with `language`
    pub fn for_language(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            validator: TimecodeValidator::new(),
        }
    }

    /// Parse every caption line of `document` into a track.
    ///
    /// Indices are assigned contiguously from 1 in the order captions are
    /// accepted, independent of how many lines were skipped.
    pub fn build(&self, document: &IntermediateDocument) -> Result<CaptionTrack, SubtitleError> {
        let mut track = CaptionTrack::new(self.language.clone());

        for (line_number, line) in document.lines().iter().enumerate() {
            if !line.contains(TIME_RANGE_MARKER) {
                debug!("Skipping line {} without time range: {:?}", line_number + 1, line);
                continue;
            }

            let (start, end, text) = parse_annotated_line(line)?;
            track.push(start, end, caption_text(text));
        }

        self.check(&track);
        Ok(track)
    }

    /// Build directly from segments without going through text
    pub fn from_segments(&self, segments: &[Segment]) -> Result<CaptionTrack, SubtitleError> {
        let mut track = CaptionTrack::new(self.language.clone());

        for segment in segments {
            let start = timecode::to_timecode(segment.start)?;
            let end = timecode::to_timecode(segment.end)?;
            track.push(start, end, caption_text(&segment.text));
        }

        self.check(&track);
        Ok(track)
    }

    fn check(&self, track: &CaptionTrack) {
        let result = self.validator.validate_track(track);
        if !result.passed {
            warn!(
                "Caption track has {} timing issue(s) across {} caption(s)",
                result.total_issues,
                result.failed_entries().len()
            );
            result.log_issues("subtitle build");
        }
    }
}

impl Default for SubtitleTrackBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Caption text safe to place in an SRT block.
///
/// A blank line terminates an SRT block, so blank and whitespace-only lines
/// are dropped and trailing whitespace is removed from every kept line.
fn caption_text(raw: &str) -> String {
    raw.trim()
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split `[start --> end]  text` into its timecodes and trimmed text
fn parse_annotated_line(line: &str) -> Result<(Timecode, Timecode, &str), SubtitleError> {
    let malformed = |reason: &str| SubtitleError::MalformedSegment {
        line: line.to_string(),
        reason: reason.to_string(),
    };

    let (range, text) = line
        .split_once(']')
        .ok_or_else(|| malformed("missing closing ']'"))?;

    let range = range
        .trim_start()
        .strip_prefix('[')
        .ok_or_else(|| malformed("time range does not start with '['"))?;

    let mut bounds = range.split(TIME_RANGE_MARKER);
    let (start, end) = match (bounds.next(), bounds.next(), bounds.next()) {
        (Some(start), Some(end), None) => (start.trim(), end.trim()),
        _ => return Err(malformed("time range must contain exactly one '-->'")),
    };
    if start.is_empty() || end.is_empty() {
        return Err(malformed("empty start or end time"));
    }

    let start = timecode::parse_seconds(start)?;
    let end = timecode::parse_seconds(end)?;

    Ok((start, end, text.trim()))
}
