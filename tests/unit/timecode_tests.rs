/*!
 * Tests for seconds <-> timecode conversion
 */

use capsync::errors::SubtitleError;
use capsync::timecode::{parse_seconds, to_seconds, to_timecode, Timecode};

/// Test that whole and fractional seconds format as HH:MM:SS,mmm
#[test]
fn test_toTimecode_withTypicalValues_shouldFormatSrtTime() {
    assert_eq!(to_timecode(0.0).unwrap().to_string(), "00:00:00,000");
    assert_eq!(to_timecode(1.5).unwrap().to_string(), "00:00:01,500");
    assert_eq!(to_timecode(3.2).unwrap().to_string(), "00:00:03,200");
    assert_eq!(to_timecode(61.25).unwrap().to_string(), "00:01:01,250");
    assert_eq!(to_timecode(3600.0).unwrap().to_string(), "01:00:00,000");
}

/// Test that values are rounded to the nearest millisecond, not truncated
#[test]
fn test_toTimecode_withBinaryFractions_shouldRoundToNearestMillisecond() {
    // 2.3 is 2.29999... in binary
    assert_eq!(to_timecode(2.3).unwrap().to_string(), "00:00:02,300");
    assert_eq!(to_timecode(0.0004).unwrap().to_string(), "00:00:00,000");
    assert_eq!(to_timecode(0.0005).unwrap().to_string(), "00:00:00,001");
    assert_eq!(to_timecode(59.9996).unwrap().to_string(), "00:01:00,000");
}

/// Test that hours are not capped at two digits
#[test]
fn test_toTimecode_withHundredHours_shouldKeepAllHourDigits() {
    let tc = to_timecode(100.0 * 3600.0 + 0.007).unwrap();
    assert_eq!(tc.hours, 100);
    assert_eq!(tc.to_string(), "100:00:00,007");
}

/// Test that invalid inputs are rejected
#[test]
fn test_toTimecode_withInvalidInput_shouldReturnInvalidTime() {
    for value in [-0.001, -5.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        match to_timecode(value) {
            Err(SubtitleError::InvalidTime { .. }) => {}
            other => panic!("expected InvalidTime for {}, got {:?}", value, other),
        }
    }
}

/// Test that conversion back to seconds stays within a millisecond
#[test]
fn test_toSeconds_afterToTimecode_shouldStayWithinOneMillisecond() {
    for value in [0.0, 0.001, 0.4999, 1.0, 2.3, 12.345678, 599.9995, 7322.123] {
        let back = to_seconds(&to_timecode(value).unwrap());
        assert!(
            (back - value).abs() <= 0.001,
            "{} came back as {}",
            value,
            back
        );
    }
}

/// Test that parse_seconds accepts decimal strings with whitespace
#[test]
fn test_parseSeconds_withDecimalString_shouldConvert() {
    assert_eq!(parse_seconds(" 1.5 ").unwrap(), Timecode::from_millis(1500));
    assert_eq!(parse_seconds("3").unwrap(), Timecode::from_millis(3000));
    assert!(matches!(parse_seconds("abc"), Err(SubtitleError::InvalidTime { .. })));
    assert!(matches!(parse_seconds("-1.0"), Err(SubtitleError::InvalidTime { .. })));
}

/// Test that timecode text parses with either millisecond separator
#[test]
fn test_fromStr_withCommaOrDot_shouldParse() {
    let comma: Timecode = "01:02:03,004".parse().unwrap();
    let dot: Timecode = "01:02:03.004".parse().unwrap();
    assert_eq!(comma, dot);
    assert_eq!(comma.total_millis(), 3_723_004);
}

/// Test that out-of-range or non-numeric components are rejected
#[test]
fn test_fromStr_withBadComponents_shouldFail() {
    for raw in ["00:60:00,000", "00:00:60,000", "00:00:00,1000", "aa:00:00,000", "00:00:00", ""] {
        assert!(raw.parse::<Timecode>().is_err(), "{:?} should not parse", raw);
    }
}
