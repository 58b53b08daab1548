//! Job-title extraction against a fixed vocabulary
//!
//! The vocabulary is typically the `preferredLabel` column of an occupations
//! table. Titles are cleaned before use:
//! - titles with more than three words are dropped
//! - "a/b" titles are split into "a" and "b"
//! - everything is lower-cased and whitespace-collapsed

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeSet;

use super::traits::{LabelNormalizer, LabelSet, Normalized, SkillExtractor};

/// Longest title kept, in words
pub const MAX_TITLE_WORDS: usize = 3;

// Large vocabularies compile into big automata
const REGEX_SIZE_LIMIT: usize = 256 * (1 << 20);

static GENDER_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\(\s*m\s*/\s*f\s*\)").expect("valid regex"));

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Clean a raw title list into the matching vocabulary
pub fn clean_titles<I, S>(titles: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = BTreeSet::new();
    for title in titles {
        let title = collapse_whitespace(&title.as_ref().to_lowercase());
        if title.is_empty() || title.split(' ').count() > MAX_TITLE_WORDS {
            continue;
        }
        for part in title.split('/') {
            let part = part.trim();
            if !part.is_empty() {
                out.insert(part.to_string());
            }
        }
    }
    out
}

/// Finds known job titles in free text
#[derive(Debug, Clone)]
pub struct JobTitleExtractor {
    pattern: Option<Regex>,
    vocabulary: BTreeSet<String>,
}

impl JobTitleExtractor {
    /// Build from raw titles (cleaned with [`clean_titles`])
    pub fn new<I, S>(titles: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_vocabulary(clean_titles(titles))
    }

    /// Build from an already-cleaned vocabulary
    pub fn from_vocabulary(vocabulary: BTreeSet<String>) -> Result<Self, regex::Error> {
        if vocabulary.is_empty() {
            return Ok(Self {
                pattern: None,
                vocabulary,
            });
        }

        // Longest first so "software developer" wins over "developer"
        let mut ordered: Vec<&String> = vocabulary.iter().collect();
        ordered.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alt = ordered
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = RegexBuilder::new(&format!(r"\b(?:{})\b", alt))
            .size_limit(REGEX_SIZE_LIMIT)
            .build()?;

        Ok(Self {
            pattern: Some(pattern),
            vocabulary,
        })
    }

    pub fn vocabulary(&self) -> &BTreeSet<String> {
        &self.vocabulary
    }
}

impl SkillExtractor for JobTitleExtractor {
    fn extract(&self, text: &str) -> LabelSet {
        let Some(pattern) = &self.pattern else {
            return LabelSet::new();
        };
        let text = collapse_whitespace(&text.to_lowercase());
        pattern
            .find_iter(&text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Cleans parser job titles; titles outside the vocabulary are kept but reported
#[derive(Debug, Clone)]
pub struct JobTitleNormalizer {
    vocabulary: BTreeSet<String>,
}

impl JobTitleNormalizer {
    pub fn new(vocabulary: BTreeSet<String>) -> Self {
        Self { vocabulary }
    }
}

impl LabelNormalizer for JobTitleNormalizer {
    fn normalize(&self, raw: Option<&str>) -> Normalized {
        let Some(raw) = raw else {
            return Normalized::empty();
        };
        let cleaned = GENDER_MARKER.replace_all(&raw.to_lowercase(), " ").into_owned();
        let title = collapse_whitespace(&cleaned);
        if title.is_empty() {
            Normalized::empty()
        } else if self.vocabulary.contains(&title) {
            Normalized::canonical(title)
        } else {
            Normalized::passthrough(title)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles() -> Vec<&'static str> {
        vec![
            "Software Developer",
            "developer",
            "Nurse/Midwife",
            "chief executive officer of a multinational company",
            "  Waiter ",
        ]
    }

    #[test]
    fn test_clean_titles() {
        let cleaned: Vec<String> = clean_titles(titles()).into_iter().collect();
        assert_eq!(cleaned, vec!["developer", "midwife", "nurse", "software developer", "waiter"]);
    }

    #[test]
    fn test_extract_prefers_longest_title() {
        let extractor = JobTitleExtractor::new(titles()).unwrap();
        let found = extractor.extract("Senior Software   Developer, previously a waiter");
        let found: Vec<String> = found.into_iter().collect();
        assert_eq!(found, vec!["software developer", "waiter"]);
    }

    #[test]
    fn test_extract_requires_word_boundaries() {
        let extractor = JobTitleExtractor::new(titles()).unwrap();
        assert!(extractor.extract("waitering is not a job title").is_empty());
    }

    #[test]
    fn test_empty_vocabulary_extracts_nothing() {
        let extractor = JobTitleExtractor::new(Vec::<String>::new()).unwrap();
        assert!(extractor.extract("software developer").is_empty());
    }

    #[test]
    fn test_normalizer_strips_gender_marker() {
        let n = JobTitleNormalizer::new(clean_titles(titles()));
        let out = n.normalize(Some("Software Developer (M/F)"));
        assert_eq!(out, Normalized::canonical("software developer"));
    }

    #[test]
    fn test_normalizer_keeps_unknown_titles() {
        let n = JobTitleNormalizer::new(clean_titles(titles()));
        let out = n.normalize(Some("Astronaut"));
        assert_eq!(out.label, "astronaut");
        assert_eq!(out.unmatched.as_deref(), Some("astronaut"));
        assert!(n.normalize(Some(" (m/f) ")).is_empty());
        assert!(n.normalize(None).is_empty());
    }
}
