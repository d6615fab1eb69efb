use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use anyhow::{Context, Result};

use crate::errors::SubtitleError;
use crate::subtitle_track::{CaptionEntry, CaptionSet, CaptionTrack, DEFAULT_TRACK_LANGUAGE, UTF8_BOM};
use crate::timecode::Timecode;
use crate::validation::TimecodeValidator;

// @module: SRT text -> caption tracks

// @const: SRT time range line
static TIME_RANGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\S+)\s*-->\s*(\S+)").unwrap()
});

/// Parses SRT text into a [`CaptionSet`]
pub struct SubtitleTrackReader {
    language: String,
}

impl SubtitleTrackReader {
    /// Reader tagging its track as `en-US`
    pub fn new() -> Self {
        Self::for_language(DEFAULT_TRACK_LANGUAGE)
    }

    /// Reader tagging its track with `language`
    pub fn for_language(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    /// Read and parse an SRT file (BOM optional)
    pub fn read_file<P: AsRef<Path>>(&self, path: P) -> Result<CaptionSet> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;
        let set = self
            .read(&content)
            .with_context(|| format!("Failed to parse subtitle file: {}", path.display()))?;
        Ok(set)
    }

    /// Parse SRT text into a set holding a single track
    pub fn read(&self, content: &str) -> Result<CaptionSet, SubtitleError> {
        let mut set = CaptionSet::new();
        set.insert(self.read_track(content)?);
        Ok(set)
    }

    /// Parse SRT text into one track
    pub fn read_track(&self, content: &str) -> Result<CaptionTrack, SubtitleError> {
        let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
        let normalized = content.replace("\r\n", "\n").replace('\r', "\n");

        let mut track = CaptionTrack::new(self.language.clone());
        let mut block: Vec<&str> = Vec::new();
        let mut block_number = 0;

        for line in normalized.lines().chain(std::iter::once("")) {
            if !line.trim().is_empty() {
                block.push(line);
                continue;
            }
            if block.is_empty() {
                continue;
            }
            block_number += 1;
            track.entries.push(parse_block(block_number, &block)?);
            block.clear();
        }

        renumber(&mut track);

        let result = TimecodeValidator::new().validate_track(&track);
        if !result.passed {
            result.log_issues("subtitle read");
        }

        Ok(track)
    }
}

impl Default for SubtitleTrackReader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_block(block_number: usize, lines: &[&str]) -> Result<CaptionEntry, SubtitleError> {
    let malformed = |reason: String| SubtitleError::MalformedTrack {
        block: block_number,
        reason,
        content: lines.join("\n"),
    };

    let index_line = lines[0].trim();
    let index: usize = index_line
        .parse()
        .map_err(|_| malformed(format!("missing numeric index, found {:?}", index_line)))?;

    let range_line = lines
        .get(1)
        .ok_or_else(|| malformed("missing time range line".to_string()))?;
    let caps = TIME_RANGE_REGEX
        .captures(range_line)
        .ok_or_else(|| malformed(format!("missing '-->' separator in {:?}", range_line)))?;

    let parse = |raw: &str| {
        raw.parse::<Timecode>()
            .map_err(|e| malformed(format!("non-numeric timecode: {}", e)))
    };
    let start = parse(&caps[1])?;
    let end = parse(&caps[2])?;

    let text = lines[2..]
        .iter()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(CaptionEntry::new(index, start, end, text))
}

/// Force indices to run 1..=n in file order
fn renumber(track: &mut CaptionTrack) {
    for (position, entry) in track.entries.iter_mut().enumerate() {
        if entry.index != position + 1 {
            debug!("Renumbering caption {} to {}", entry.index, position + 1);
            entry.index = position + 1;
        }
    }
}
