//! Language-skill extraction
//!
//! Labels are ISO 639-1 codes. Each code has a list of surface variants
//! (English and native names); one matcher per code is compiled when the
//! extractor is built, never per call.
//!
//! A code matches when any of its variants appears as a whole word, or in
//! phrases like "native speaker of X", "knowledge of the language X",
//! "proficiency in X", "X spoken", "X B2".

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};

use super::language_names::ISO_639_1;
use super::traits::{LabelNormalizer, LabelSet, Normalized, SkillExtractor};

/// ISO code → surface variants
pub type LanguageTable = BTreeMap<String, Vec<String>>;

/// The built-in variant table: every ISO 639-1 code
pub fn builtin_table() -> LanguageTable {
    ISO_639_1
        .iter()
        .map(|(code, variants)| {
            (
                code.to_string(),
                variants.iter().map(|v| v.to_string()).collect(),
            )
        })
        .collect()
}

/// Merge extra variants (e.g. from the audit config) into a table
pub fn merge_variants(table: &mut LanguageTable, extra: &BTreeMap<String, Vec<String>>) {
    for (code, variants) in extra {
        let entry = table.entry(code.to_lowercase()).or_default();
        for v in variants {
            let v = v.trim().to_lowercase();
            if !v.is_empty() && !entry.contains(&v) {
                entry.push(v);
            }
        }
    }
}

fn build_matcher(variants: &[String]) -> Result<Regex, regex::Error> {
    let alt = variants
        .iter()
        .map(|v| regex::escape(&v.to_lowercase()))
        .collect::<Vec<_>>()
        .join("|");
    let v = format!("(?:{})", alt);
    let pattern = [
        format!(r"\b{v}\b"),
        format!(r"native\s+speaker(?:\s+of)?\s+{v}"),
        format!(r"languages?\s+{v}"),
        format!(r"knowledge\s+of\s+(?:the\s+)?(?:language\s+)?{v}"),
        format!(r"proficiency\s+in\s+{v}"),
        format!(r"certification(?:\s+in)?\s+{v}"),
        format!(r"{v}\s+(?:spoken|written|oral)"),
        format!(r"{v}\s*(?:a1|a2|b1|b2|c1|c2|native)"),
    ]
    .join("|");
    Regex::new(&format!("(?i){}", pattern))
}

static BUILTIN_EXTRACTOR: Lazy<LanguageExtractor> = Lazy::new(|| {
    LanguageExtractor::from_table(&builtin_table()).expect("valid builtin language patterns")
});

/// Finds language skills in free text
#[derive(Debug, Clone)]
pub struct LanguageExtractor {
    matchers: Vec<(String, Regex)>,
}

impl LanguageExtractor {
    /// Compile one matcher per code in the table
    pub fn from_table(table: &LanguageTable) -> Result<Self, regex::Error> {
        let mut matchers = Vec::with_capacity(table.len());
        for (code, variants) in table {
            if variants.is_empty() {
                continue;
            }
            matchers.push((code.to_lowercase(), build_matcher(variants)?));
        }
        Ok(Self { matchers })
    }

    /// Extractor over the built-in table (compiled once per process)
    pub fn builtin() -> Self {
        BUILTIN_EXTRACTOR.clone()
    }

    /// Number of language codes this extractor knows
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl SkillExtractor for LanguageExtractor {
    fn extract(&self, text: &str) -> LabelSet {
        let text = text.to_lowercase();
        self.matchers
            .iter()
            .filter(|(_, rx)| rx.is_match(&text))
            .map(|(code, _)| code.clone())
            .collect()
    }
}

/// Maps a language name (any known variant) or ISO code to its code
///
/// Unknown names normalize to the empty label and are reported as unmatched.
#[derive(Debug, Clone)]
pub struct LanguageNormalizer {
    reverse: HashMap<String, String>,
}

impl LanguageNormalizer {
    pub fn from_table(table: &LanguageTable) -> Self {
        let mut reverse = HashMap::new();
        for (code, variants) in table {
            let code = code.to_lowercase();
            reverse.insert(code.clone(), code.clone());
            for v in variants {
                reverse.insert(v.trim().to_lowercase(), code.clone());
            }
        }
        Self { reverse }
    }

    pub fn builtin() -> Self {
        Self::from_table(&builtin_table())
    }
}

impl LabelNormalizer for LanguageNormalizer {
    fn normalize(&self, raw: Option<&str>) -> Normalized {
        let Some(raw) = raw else {
            return Normalized::empty();
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Normalized::empty();
        }
        match self.reverse.get(&raw.to_lowercase()) {
            Some(code) => Normalized::canonical(code.clone()),
            None => Normalized::unrecognized(raw),
        }
    }
}
