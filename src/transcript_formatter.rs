use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// @module: Recognition segments and the timestamped intermediate document

/// Marker separating start and end in annotated lines
pub const TIME_RANGE_MARKER: &str = "-->";

/// One timed piece of recognized speech
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start in seconds
    pub start: f64,
    /// End in seconds
    pub end: f64,
    /// Recognized text
    pub text: String,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// Human-readable list of `[start --> end]  text` lines.
///
/// Times stay in raw seconds here; conversion to timecodes happens when a
/// subtitle track is built from the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntermediateDocument {
    lines: Vec<String>,
}

impl IntermediateDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing lines (for example read back from a debug dump)
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a line that is not a caption
    pub fn push_plain(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Append an annotated caption line
    pub fn push_annotated(&mut self, start: f64, end: f64, text: &str) {
        self.lines
            .push(format!("[{:?} {} {:?}]  {}", start, TIME_RANGE_MARKER, end, text));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Dump the document for inspection
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_string())
            .with_context(|| format!("Failed to write intermediate document: {}", path.display()))
    }
}

impl fmt::Display for IntermediateDocument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Turns recognition output into an [`IntermediateDocument`]
#[derive(Debug, Clone, Default)]
pub struct TranscriptFormatter {
    header: Option<String>,
}

impl TranscriptFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a plain first line, e.g. the source file name
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// One annotated line per segment, in input order. Empty text is kept.
    pub fn format(&self, segments: &[Segment]) -> IntermediateDocument {
        let mut document = IntermediateDocument::new();
        if let Some(header) = &self.header {
            document.push_plain(header.clone());
        }
        for segment in segments {
            document.push_annotated(segment.start, segment.end, &segment.text);
        }
        document
    }
}
