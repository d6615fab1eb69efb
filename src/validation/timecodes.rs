/*!
 * Timecode validation for caption tracks.
 *
 * This module validates that timecodes are:
 * - Logically consistent (start < end)
 * - Non-decreasing in start time across the track
 * - Non-overlapping between consecutive entries
 * - Indexed contiguously from 1
 */

use log::{debug, warn};

use crate::subtitle_track::{CaptionEntry, CaptionTrack};

/// Maximum duration for a single caption in milliseconds (30 seconds)
const MAX_CAPTION_DURATION_MS: u64 = 30_000;

/// Result of timecode validation for a single entry
#[derive(Debug, Clone)]
pub struct TimecodeEntryResult {
    /// Index of the entry
    pub index: usize,
    /// Whether the entry passed validation
    pub passed: bool,
    /// Issues found
    pub issues: Vec<TimecodeIssue>,
}

impl TimecodeEntryResult {
    /// Create a passing result
    pub fn passed(index: usize) -> Self {
        Self {
            index,
            passed: true,
            issues: vec![],
        }
    }

    /// Create a failing result
    pub fn failed(index: usize, issues: Vec<TimecodeIssue>) -> Self {
        Self {
            index,
            passed: false,
            issues,
        }
    }
}

/// Types of timecode issues
#[derive(Debug, Clone, PartialEq)]
pub enum TimecodeIssue {
    /// End time is not after start time
    InvalidTimeRange { start_ms: u64, end_ms: u64 },
    /// Duration is too long
    DurationTooLong { duration_ms: u64, max_duration_ms: u64 },
    /// Starts before the previous entry
    OutOfOrder { previous_index: usize, previous_start_ms: u64 },
    /// Overlaps with the previous entry
    OverlapsWithEntry { other_index: usize, overlap_ms: u64 },
    /// Index does not follow the previous one
    IndexGap { expected: usize, found: usize },
}

impl std::fmt::Display for TimecodeIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimecodeIssue::InvalidTimeRange { start_ms, end_ms } => {
                write!(f, "Invalid time range: start {}ms >= end {}ms", start_ms, end_ms)
            }
            TimecodeIssue::DurationTooLong { duration_ms, max_duration_ms } => {
                write!(f, "Duration too long: {}ms (max: {}ms)", duration_ms, max_duration_ms)
            }
            TimecodeIssue::OutOfOrder { previous_index, previous_start_ms } => {
                write!(
                    f,
                    "Starts before entry {} (which starts at {}ms)",
                    previous_index, previous_start_ms
                )
            }
            TimecodeIssue::OverlapsWithEntry { other_index, overlap_ms } => {
                write!(f, "Overlaps with entry {} by {}ms", other_index, overlap_ms)
            }
            TimecodeIssue::IndexGap { expected, found } => {
                write!(f, "Index {} where {} was expected", found, expected)
            }
        }
    }
}

/// Result of validating all timecodes in a track
#[derive(Debug, Clone)]
pub struct TimecodeValidationResult {
    /// Overall pass/fail status
    pub passed: bool,
    /// Results for each entry
    pub entry_results: Vec<TimecodeEntryResult>,
    /// Total number of issues
    pub total_issues: usize,
    /// Number of overlapping entries
    pub overlap_count: usize,
}

impl TimecodeValidationResult {
    /// Get all failed entries
    pub fn failed_entries(&self) -> Vec<&TimecodeEntryResult> {
        self.entry_results.iter().filter(|r| !r.passed).collect()
    }

    /// Emit one warning per issue
    pub fn log_issues(&self, context: &str) {
        for result in self.failed_entries() {
            for issue in &result.issues {
                warn!("{}: caption {}: {}", context, result.index, issue);
            }
        }
    }
}

/// Configuration for timecode validation
#[derive(Debug, Clone)]
pub struct TimecodeValidatorConfig {
    /// Maximum caption duration in ms
    pub max_duration_ms: u64,
    /// Whether to check for overlaps
    pub check_overlaps: bool,
}

impl Default for TimecodeValidatorConfig {
    fn default() -> Self {
        Self {
            max_duration_ms: MAX_CAPTION_DURATION_MS,
            check_overlaps: true,
        }
    }
}

/// Timecode validator for caption tracks
pub struct TimecodeValidator {
    config: TimecodeValidatorConfig,
}

impl TimecodeValidator {
    /// Create a new validator with default configuration
    pub fn new() -> Self {
        Self {
            config: TimecodeValidatorConfig::default(),
        }
    }

    /// Create a new validator with custom configuration
    pub fn with_config(config: TimecodeValidatorConfig) -> Self {
        Self { config }
    }

    /// Validate a single caption entry in isolation
    pub fn validate_entry(&self, entry: &CaptionEntry) -> TimecodeEntryResult {
        let start_ms = entry.start.total_millis();
        let end_ms = entry.end.total_millis();

        if end_ms <= start_ms {
            return TimecodeEntryResult::failed(
                entry.index,
                vec![TimecodeIssue::InvalidTimeRange { start_ms, end_ms }],
            );
        }

        let duration_ms = end_ms - start_ms;
        if duration_ms > self.config.max_duration_ms {
            return TimecodeEntryResult::failed(
                entry.index,
                vec![TimecodeIssue::DurationTooLong {
                    duration_ms,
                    max_duration_ms: self.config.max_duration_ms,
                }],
            );
        }

        TimecodeEntryResult::passed(entry.index)
    }

    /// Validate a whole track in file order
    pub fn validate_track(&self, track: &CaptionTrack) -> TimecodeValidationResult {
        let entries = &track.entries;
        let mut entry_results: Vec<TimecodeEntryResult> =
            entries.iter().map(|e| self.validate_entry(e)).collect();
        let mut overlap_count = 0;

        for (position, entry) in entries.iter().enumerate() {
            let expected = position + 1;
            let mut issues = Vec::new();

            if entry.index != expected {
                issues.push(TimecodeIssue::IndexGap {
                    expected,
                    found: entry.index,
                });
            }

            if position > 0 {
                let previous = &entries[position - 1];
                let previous_start = previous.start.total_millis();
                let previous_end = previous.end.total_millis();
                let start = entry.start.total_millis();

                if start < previous_start {
                    issues.push(TimecodeIssue::OutOfOrder {
                        previous_index: previous.index,
                        previous_start_ms: previous_start,
                    });
                } else if self.config.check_overlaps && start < previous_end {
                    overlap_count += 1;
                    issues.push(TimecodeIssue::OverlapsWithEntry {
                        other_index: previous.index,
                        overlap_ms: previous_end - start,
                    });
                }
            }

            if !issues.is_empty() {
                let result = &mut entry_results[position];
                result.issues.extend(issues);
                result.passed = false;
            }
        }

        let total_issues: usize = entry_results.iter().map(|r| r.issues.len()).sum();
        let passed = entry_results.iter().all(|r| r.passed);

        debug!(
            "Timecode validation: {} entries, {} issues, {} overlaps",
            entries.len(),
            total_issues,
            overlap_count
        );

        TimecodeValidationResult {
            passed,
            entry_results,
            total_issues,
            overlap_count,
        }
    }
}

impl Default for TimecodeValidator {
    fn default() -> Self {
        Self::new()
    }
}
