//! Language utilities for caption track tags and recognition languages
//!
//! Track tags look like `en-US`; only the primary subtag is an ISO 639 code.
//! Codes are compared after normalizing to ISO 639-2/T.

use anyhow::{Result, anyhow};
use isolang::Language;

/// Special value accepted as a recognition language
pub const AUTO_LANGUAGE: &str = "auto";

/// Map an ISO 639-2/B code onto its 639-2/T equivalent
fn bibliographic_to_terminology(code: &str) -> Option<&'static str> {
    let mapped = match code {
        "fre" => "fra",
        "ger" => "deu",
        "dut" => "nld",
        "gre" => "ell",
        "chi" => "zho",
        "cze" => "ces",
        "ice" => "isl",
        "alb" => "sqi",
        "arm" => "hye",
        "baq" => "eus",
        "bur" => "mya",
        "per" => "fas",
        "geo" => "kat",
        "may" => "msa",
        "mac" => "mkd",
        "rum" => "ron",
        "slo" => "slk",
        "wel" => "cym",
        _ => return None,
    };
    Some(mapped)
}

/// Language portion of a tag: `en-US` -> `en`, `pt_BR` -> `pt`
pub fn primary_subtag(tag: &str) -> &str {
    tag.trim().split(['-', '_']).next().unwrap_or("")
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = primary_subtag(code).to_lowercase();

    match normalized_code.len() {
        2 => {
            if let Some(lang) = Language::from_639_1(&normalized_code) {
                return Ok(lang.to_639_3().to_string());
            }
        }
        3 => {
            if Language::from_639_3(&normalized_code).is_some() {
                return Ok(normalized_code);
            }
            if let Some(mapped) = bibliographic_to_terminology(&normalized_code) {
                return Ok(mapped.to_string());
            }
        }
        _ => {}
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Normalize to ISO 639-1 when such a code exists, else ISO 639-2/T
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let part2t = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&part2t)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", part2t))?;

    Ok(lang.to_639_1().map(|c| c.to_string()).unwrap_or(part2t))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Validate a recognition language setting (`auto` or an ISO code)
pub fn validate_recognition_language(code: &str) -> Result<()> {
    if code.eq_ignore_ascii_case(AUTO_LANGUAGE) {
        return Ok(());
    }
    normalize_to_part2t(code).map(|_| ())
}
