/*!
 * Tests for language code utilities
 */

use capsync::language_utils::{
    get_language_name, language_codes_match, normalize_to_part1_or_part2t, normalize_to_part2t,
    primary_subtag, validate_recognition_language,
};

/// Test normalization of tags and bare codes
#[test]
fn test_normalizeToPart2t_withTagsAndCodes_shouldReturnThreeLetterCode() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("en-US").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("pt_BR").unwrap(), "por");
    assert_eq!(normalize_to_part2t("FRA").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("ger").unwrap(), "deu");
    assert!(normalize_to_part2t("xx").is_err());
    assert!(normalize_to_part2t("").is_err());
}

/// Test the two-letter preference used by the recognition request
#[test]
fn test_normalizeToPart1OrPart2t_withKnownLanguage_shouldPreferTwoLetters() {
    assert_eq!(normalize_to_part1_or_part2t("deu").unwrap(), "de");
    assert_eq!(normalize_to_part1_or_part2t("ja-JP").unwrap(), "ja");
}

/// Test tag comparison ignores region and code length
#[test]
fn test_languageCodesMatch_withEquivalentCodes_shouldMatch() {
    assert!(language_codes_match("en-US", "eng"));
    assert!(language_codes_match("fre", "fr"));
    assert!(!language_codes_match("en", "fr"));
    assert!(!language_codes_match("en", "invalid"));
    assert_eq!(primary_subtag(" es-419 "), "es");
}

/// Test language names and the auto setting
#[test]
fn test_validateRecognitionLanguage_withAuto_shouldPass() {
    assert_eq!(get_language_name("en-GB").unwrap(), "English");
    assert!(validate_recognition_language("auto").is_ok());
    assert!(validate_recognition_language("AUTO").is_ok());
    assert!(validate_recognition_language("es").is_ok());
    assert!(validate_recognition_language("klingon").is_err());
}
