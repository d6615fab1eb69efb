/*!
 * Tests for caption track timing validation
 */

use capsync::subtitle_track::{CaptionEntry, CaptionTrack};
use capsync::timecode::Timecode;
use capsync::validation::{TimecodeIssue, TimecodeValidator, TimecodeValidatorConfig};

fn entry(index: usize, start_ms: u64, end_ms: u64) -> CaptionEntry {
    CaptionEntry::new(
        index,
        Timecode::from_millis(start_ms),
        Timecode::from_millis(end_ms),
        "text",
    )
}

fn track(entries: Vec<CaptionEntry>) -> CaptionTrack {
    CaptionTrack {
        language: "en-US".to_string(),
        entries,
    }
}

/// Test that a clean track passes
#[test]
fn test_validateTrack_withOrderedEntries_shouldPass() {
    let result = TimecodeValidator::new().validate_track(&track(vec![
        entry(1, 0, 1000),
        entry(2, 1500, 3200),
    ]));
    assert!(result.passed);
    assert_eq!(result.total_issues, 0);
}

/// Test that inverted and overlong entries are flagged individually
#[test]
fn test_validateEntry_withBadDurations_shouldReportIssue() {
    let validator = TimecodeValidator::new();

    let inverted = validator.validate_entry(&entry(1, 2000, 2000));
    assert_eq!(
        inverted.issues,
        vec![TimecodeIssue::InvalidTimeRange {
            start_ms: 2000,
            end_ms: 2000
        }]
    );

    let long = validator.validate_entry(&entry(1, 0, 45_000));
    assert!(matches!(long.issues[0], TimecodeIssue::DurationTooLong { duration_ms: 45_000, .. }));
}

/// Test ordering, overlap and index continuity checks
#[test]
fn test_validateTrack_withOverlapAndGap_shouldReportBoth() {
    let result = TimecodeValidator::new().validate_track(&track(vec![
        entry(1, 0, 2000),
        entry(3, 1500, 2500),
        entry(4, 1000, 1200),
    ]));

    assert!(!result.passed);
    assert_eq!(result.overlap_count, 1);
    let second = &result.entry_results[1].issues;
    assert!(second.contains(&TimecodeIssue::IndexGap { expected: 2, found: 3 }));
    assert!(second.contains(&TimecodeIssue::OverlapsWithEntry {
        other_index: 1,
        overlap_ms: 500
    }));
    assert!(result.entry_results[2]
        .issues
        .iter()
        .any(|i| matches!(i, TimecodeIssue::OutOfOrder { previous_index: 3, .. })));
}

/// Test that overlap checks can be disabled
#[test]
fn test_validateTrack_withOverlapChecksDisabled_shouldIgnoreOverlap() {
    let validator = TimecodeValidator::with_config(TimecodeValidatorConfig {
        check_overlaps: false,
        ..TimecodeValidatorConfig::default()
    });
    let result = validator.validate_track(&track(vec![entry(1, 0, 2000), entry(2, 1000, 3000)]));
    assert!(result.passed);
}
