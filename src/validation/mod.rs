/*!
 * Validation of caption tracks.
 *
 * Validation never rejects a track; it reports issues that the builder and
 * reader log as warnings:
 * - `timecodes`: timing integrity, ordering and index continuity
 */

pub mod timecodes;

// Re-export main types
pub use timecodes::{
    TimecodeEntryResult, TimecodeIssue, TimecodeValidationResult, TimecodeValidator,
    TimecodeValidatorConfig,
};
