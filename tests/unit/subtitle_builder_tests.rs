/*!
 * Tests for the transcript formatter, track builder and SRT serialization
 */

use anyhow::Result;
use capsync::errors::SubtitleError;
use capsync::subtitle_builder::SubtitleTrackBuilder;
use capsync::subtitle_track::{CaptionTrack, UTF8_BOM};
use capsync::transcript_formatter::{IntermediateDocument, Segment, TranscriptFormatter};

use crate::common;

fn two_segments() -> Vec<Segment> {
    vec![Segment::new(0.0, 1.0, "a"), Segment::new(1.5, 3.2, "b")]
}

/// Test the canonical two-segment example end to end
#[test]
fn test_build_withTwoSegments_shouldProduceIndexedEntries() -> Result<()> {
    let document = TranscriptFormatter::new().format(&two_segments());
    assert_eq!(
        document.lines(),
        &["[0.0 --> 1.0]  a".to_string(), "[1.5 --> 3.2]  b".to_string()]
    );

    let track = SubtitleTrackBuilder::new().build(&document)?;

    assert_eq!(track.len(), 2);
    assert_eq!(track.entries[0].index, 1);
    assert_eq!(track.entries[1].index, 2);
    assert_eq!(
        track.to_srt_string(),
        "1\n00:00:00,000 --> 00:00:01,000\na\n\n2\n00:00:01,500 --> 00:00:03,200\nb\n\n"
    );
    Ok(())
}

/// Test that lines without a time range marker are skipped without shifting indices
#[test]
fn test_build_withPlainLines_shouldSkipThemAndKeepIndicesContiguous() -> Result<()> {
    let document = IntermediateDocument::from_lines([
        "Transcript of talk.mp4",
        "[0.0 --> 1.0]  first",
        "",
        "applause",
        "[2.0 --> 3.0]  second",
    ]);

    let track = SubtitleTrackBuilder::new().build(&document)?;

    let indices: Vec<usize> = track.entries.iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![1, 2]);
    assert_eq!(track.entries[1].text, "second");
    Ok(())
}

/// Test that a header added by the formatter does not become a caption
#[test]
fn test_formatter_withHeader_shouldNotAffectTrack() -> Result<()> {
    let document = TranscriptFormatter::new()
        .with_header("talk.mp4")
        .format(&two_segments());
    assert_eq!(document.len(), 3);

    let track = SubtitleTrackBuilder::new().build(&document)?;
    assert_eq!(track.len(), 2);
    Ok(())
}

/// Test that structurally broken marker lines raise MalformedSegment with the line
#[test]
fn test_build_withMalformedMarkerLine_shouldReturnMalformedSegment() {
    let cases = [
        "0.0 --> 1.0]  missing bracket",
        "[0.0 --> 1.0  no closing bracket",
        "[0.0 --> 1.0 --> 2.0]  two arrows",
        "[ --> 1.0]  empty start",
    ];

    for line in cases {
        let document = IntermediateDocument::from_lines([line]);
        match SubtitleTrackBuilder::new().build(&document) {
            Err(SubtitleError::MalformedSegment { line: reported, .. }) => assert_eq!(reported, line),
            other => panic!("expected MalformedSegment for {:?}, got {:?}", line, other),
        }
    }
}

/// Test that unparseable or negative times raise InvalidTime
#[test]
fn test_build_withBadNumbers_shouldReturnInvalidTime() {
    for line in ["[zero --> 1.0]  a", "[-1.0 --> 1.0]  a"] {
        let document = IntermediateDocument::from_lines([line]);
        assert!(
            matches!(
                SubtitleTrackBuilder::new().build(&document),
                Err(SubtitleError::InvalidTime { .. })
            ),
            "{:?} should be an invalid time",
            line
        );
    }
}

/// Test that inverted ranges are kept (and only warned about) by the builder
#[test]
fn test_build_withInvertedRange_shouldKeepEntry() -> Result<()> {
    let document = IntermediateDocument::from_lines(["[5.0 --> 4.0]  backwards"]);
    let track = SubtitleTrackBuilder::new().build(&document)?;
    assert_eq!(track.len(), 1);
    Ok(())
}

/// Test that empty segment lists give an empty track
#[test]
fn test_build_withNoSegments_shouldProduceEmptyTrack() -> Result<()> {
    let document = TranscriptFormatter::new().format(&[]);
    let track = SubtitleTrackBuilder::new().build(&document)?;
    assert!(track.is_empty());
    assert_eq!(track.to_srt_string(), "");
    Ok(())
}

/// Test that building from segments directly matches building through text
#[test]
fn test_fromSegments_shouldMatchTextPath() -> Result<()> {
    let segments = vec![
        Segment::new(0.0, 1.0, " leading space"),
        Segment::new(2.3, 4.75, "second"),
    ];
    let builder = SubtitleTrackBuilder::for_language("de-DE");

    let direct = builder.from_segments(&segments)?;
    let via_text = builder.build(&TranscriptFormatter::new().format(&segments))?;

    assert_eq!(direct, via_text);
    assert_eq!(direct.language, "de-DE");
    Ok(())
}

/// Test that the written SRT file starts with a BOM
#[test]
fn test_writeToSrt_shouldPrefixByteOrderMark() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested").join("out.srt");
    let track: CaptionTrack = SubtitleTrackBuilder::new().from_segments(&two_segments())?;

    track.write_to_srt(&path)?;

    let content = std::fs::read_to_string(&path)?;
    assert!(content.starts_with(UTF8_BOM));
    assert_eq!(&content[UTF8_BOM.len()..], track.to_srt_string());
    Ok(())
}
