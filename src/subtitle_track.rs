use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::language_utils;
use crate::timecode::{self, Timecode};

// @module: Caption entries, tracks and their SRT serialization

/// UTF-8 byte-order mark written at the start of every SRT file
pub const UTF8_BOM: &str = "\u{feff}";

/// Track tag used when nothing else is configured
pub const DEFAULT_TRACK_LANGUAGE: &str = "en-US";

// @struct: Single caption entry
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionEntry {
    // @field: 1-based position in the track
    pub index: usize,

    // @field: Start time
    pub start: Timecode,

    // @field: End time
    pub end: Timecode,

    // @field: Caption text
    pub text: String,
}

impl CaptionEntry {
    pub fn new(index: usize, start: Timecode, end: Timecode, text: impl Into<String>) -> Self {
        CaptionEntry {
            index,
            start,
            end,
            text: text.into(),
        }
    }

    /// Start time in seconds
    pub fn start_seconds(&self) -> f64 {
        timecode::to_seconds(&self.start)
    }

    /// End time in seconds
    pub fn end_seconds(&self) -> f64 {
        timecode::to_seconds(&self.end)
    }
}

impl fmt::Display for CaptionEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.start, self.end)?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Ordered caption entries for one language
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    /// Language / track tag
    pub language: String,

    /// Entries in display order
    pub entries: Vec<CaptionEntry>,
}

impl CaptionTrack {
    /// Create an empty track
    pub fn new(language: impl Into<String>) -> Self {
        CaptionTrack {
            language: language.into(),
            entries: Vec::new(),
        }
    }

    /// Append an entry, assigning the next contiguous index
    pub fn push(&mut self, start: Timecode, end: Timecode, text: impl Into<String>) -> &CaptionEntry {
        let index = self.entries.len() + 1;
        self.entries.push(CaptionEntry::new(index, start, end, text));
        &self.entries[index - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// SRT text without the byte-order mark
    pub fn to_srt_string(&self) -> String {
        self.entries.iter().map(|e| e.to_string()).collect()
    }

    /// Write the track as a BOM-prefixed UTF-8 SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;

        file.write_all(UTF8_BOM.as_bytes())?;
        for entry in &self.entries {
            write!(file, "{}", entry)?;
        }
        file.flush()?;

        Ok(())
    }
}

impl fmt::Display for CaptionTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Caption Track")?;
        writeln!(f, "Language: {}", self.language)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}

/// Caption tracks keyed by language tag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptionSet {
    tracks: BTreeMap<String, CaptionTrack>,
}

impl CaptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the track for its language
    pub fn insert(&mut self, track: CaptionTrack) {
        self.tracks.insert(track.language.clone(), track);
    }

    /// Look up a track by tag.
    ///
    /// An exact tag match wins; otherwise the ISO language portion is compared,
    /// so `en` finds an `en-US` track.
    pub fn track(&self, language: &str) -> Option<&CaptionTrack> {
        if let Some(track) = self.tracks.get(language) {
            return Some(track);
        }
        let wanted = language_utils::primary_subtag(language);
        self.tracks.values().find(|t| {
            language_utils::language_codes_match(language_utils::primary_subtag(&t.language), wanted)
        })
    }

    /// The only track, or the first one by tag when several exist
    pub fn default_track(&self) -> Option<&CaptionTrack> {
        self.tracks.values().next()
    }

    /// Consume the set, returning the default track
    pub fn into_default_track(self) -> Option<CaptionTrack> {
        self.tracks.into_values().next()
    }

    pub fn languages(&self) -> Vec<&str> {
        self.tracks.keys().map(|k| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
