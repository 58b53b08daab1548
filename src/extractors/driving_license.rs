//! Driving-licence extraction
//!
//! Recognizes English mentions such as "driving licence", "driver's license: B",
//! "category B licence", "C1E licence" or "own car".

use once_cell::sync::Lazy;
use regex::Regex;

use super::traits::{LabelNormalizer, LabelSet, Normalized, SkillExtractor};

/// Canonical label for any driving-licence mention
pub const DRIVER_LICENSE: &str = "driver_license";

static DRIVER_LICENSE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)(?:",
        r"(?:driver['’]?s?|driving|car|category)\s*licen[cs]e\s*[:\-]?\s*(?:type\s*)?[a-z]{1,2}\b|",
        r"\blicen[cs]e\s*[:\-]?\s*(?:[A-E][1-9]?|AM|A1|A2|B1|C1|D1|BE|CE|DE)\b|",
        r"\b(?:A|B|C|D|E|AM|A1|A2|B1|C1|D1|BE|C1E|D1E|CE|DE)\b\s*(?:driving|car|category)?\s*licen[cs]e\b|",
        r"\bdriving\s+licen[cs]e\b|",
        r"\bown\s+car\b",
        r")"
    ))
    .expect("valid regex")
});

// Bare licence category codes: "B", "B1", "CE"
static LICENSE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-e][1-9]?e?$").expect("valid regex"));

/// The compiled mention pattern, for highlighting evidence
pub fn pattern() -> &'static Regex {
    &DRIVER_LICENSE_PATTERN
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DrivingLicenseExtractor;

impl SkillExtractor for DrivingLicenseExtractor {
    fn extract(&self, text: &str) -> LabelSet {
        let mut labels = LabelSet::new();
        if DRIVER_LICENSE_PATTERN.is_match(&text.to_lowercase()) {
            labels.insert(DRIVER_LICENSE.to_string());
        }
        labels
    }
}

/// Maps licence codes and licence phrases to [`DRIVER_LICENSE`]
///
/// Anything else is kept lower-cased so it still counts as a parser claim.
#[derive(Debug, Clone, Copy, Default)]
pub struct DrivingLicenseNormalizer;

impl LabelNormalizer for DrivingLicenseNormalizer {
    fn normalize(&self, raw: Option<&str>) -> Normalized {
        let Some(raw) = raw else {
            return Normalized::empty();
        };
        let skill = raw.trim().to_lowercase();
        if skill.is_empty() {
            return Normalized::empty();
        }
        if LICENSE_CODE.is_match(&skill) || DRIVER_LICENSE_PATTERN.is_match(&skill) {
            Normalized::canonical(DRIVER_LICENSE)
        } else {
            Normalized::passthrough(skill)
        }
    }
}
