//! Tabular input loading
//!
//! Reads the three CSV tables an audit works from:
//! - candidates: id, CV text and optional demographic columns
//! - demographics: id plus demographic columns, inner-joined onto candidates
//! - parser skills: id, skill type, skill label
//!
//! Every reader takes any `io::Read`, so tests can feed in-memory tables; the
//! `load_*` wrappers open files and attach the path to errors.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::config::DataConfig;
use crate::error::AuditError;

/// Name of the derived text-length attribute
pub const LENGTH_ATTRIBUTE: &str = "length";

/// Prefix the anonymizer puts in front of every CV
const ANONYMIZED_PREFIX: &str = "CV anonimizzato:";

// Anonymization placeholder left in some parser labels ("XXXXX")
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"X{5,}").expect("valid regex"));
static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\n\r]+").expect("valid regex"));
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("valid regex"));

// =============================================================================
// RECORDS
// =============================================================================

/// One CV with its demographic attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: String,
    pub text: String,
    /// Demographic columns and the derived `length` bucket; absent when empty
    pub attributes: BTreeMap<String, String>,
}

impl CandidateRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add an attribute (builder style, mainly for tests and fixtures)
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// One skill reported by the parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub candidate_id: String,
    pub skill_type: String,
    /// `None` for a null or unusable cell
    pub label: Option<String>,
}

impl SkillRecord {
    pub fn new(
        candidate_id: impl Into<String>,
        skill_type: impl Into<String>,
        label: Option<&str>,
    ) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            skill_type: skill_type.into(),
            label: label.map(String::from),
        }
    }
}

/// Parser skills plus how many labels were discarded while cleaning
#[derive(Debug, Clone, Default)]
pub struct LoadedSkills {
    pub records: Vec<SkillRecord>,
    pub nulled_labels: usize,
}

// =============================================================================
// HELPERS
// =============================================================================

fn reader<R: Read>(input: R, cfg: &DataConfig) -> csv::Reader<R> {
    ReaderBuilder::new()
        .delimiter(cfg.delimiter())
        .flexible(true)
        .from_reader(input)
}

fn column(headers: &StringRecord, table: &str, name: &str) -> Result<usize, AuditError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| AuditError::MissingColumn {
            table: table.to_string(),
            column: name.to_string(),
        })
}

/// Positions of the demographic columns present in `headers`
fn demographic_columns(headers: &StringRecord, table: &str, cfg: &DataConfig) -> Vec<(String, usize)> {
    cfg.demographic_columns
        .iter()
        .filter_map(|name| match column(headers, table, name) {
            Ok(idx) => Some((name.clone(), idx)),
            Err(_) => {
                warn!("{} table has no '{}' column, attribute skipped", table, name);
                None
            }
        })
        .collect()
}

fn cell<'a>(record: &'a StringRecord, idx: usize) -> Option<&'a str> {
    record.get(idx).map(str::trim).filter(|v| !v.is_empty())
}

/// Bucket label for a text length, e.g. `<300`, `300-999`, `>=3000`
pub fn length_bucket(len: usize, buckets: &[usize]) -> Option<String> {
    let first = *buckets.first()?;
    if len < first {
        return Some(format!("<{}", first));
    }
    for pair in buckets.windows(2) {
        if len >= pair[0] && len < pair[1] {
            return Some(format!("{}-{}", pair[0], pair[1] - 1));
        }
    }
    buckets.last().map(|last| format!(">={}", last))
}

/// Normalize a raw CV cell before extraction
///
/// Drops the anonymizer prefix and triple quotes, joins lines and collapses
/// runs of whitespace.
pub fn clean_text(raw: &str) -> String {
    let text = raw.replace(ANONYMIZED_PREFIX, "").replace("\"\"\"", "");
    let text = LINE_BREAKS.replace_all(&text, " ");
    MULTI_SPACE.replace_all(&text, " ").trim().to_string()
}

/// Clean a raw parser label; `None` when unusable
pub fn clean_label(raw: &str, cfg: &DataConfig) -> Option<String> {
    let label = raw.trim();
    let len = label.chars().count();
    if len < cfg.min_label_len || len > cfg.max_label_len {
        return None;
    }
    if !label.chars().any(|c| c.is_ascii_alphabetic()) || PLACEHOLDER.is_match(label) {
        return None;
    }
    Some(label.to_string())
}

// =============================================================================
// READERS
// =============================================================================

/// Read the candidates table
///
/// CV text goes through [`clean_text`]. Empty ids are skipped; for duplicate
/// ids the first row wins.
pub fn read_candidates<R: Read>(input: R, cfg: &DataConfig) -> Result<Vec<CandidateRecord>> {
    let mut rdr = reader(input, cfg);
    let headers = rdr.headers().context("Failed to read candidates header")?.clone();
    let id_idx = column(&headers, "candidates", &cfg.id_column)?;
    let text_idx = column(&headers, "candidates", &cfg.text_column)?;
    let demo = demographic_columns(&headers, "candidates", cfg);

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Malformed candidates row {}", line + 1))?;
        let Some(id) = cell(&record, id_idx) else {
            continue;
        };
        if !seen.insert(id.to_string()) {
            warn!("Duplicate candidate id '{}', keeping the first row", id);
            continue;
        }

        let text = clean_text(record.get(text_idx).unwrap_or(""));
        let mut candidate = CandidateRecord::new(id, text);
        for (name, idx) in &demo {
            if let Some(value) = cell(&record, *idx) {
                candidate.attributes.insert(name.clone(), value.to_string());
            }
        }
        if let Some(bucket) = length_bucket(candidate.text.chars().count(), &cfg.length_buckets) {
            candidate.attributes.insert(LENGTH_ATTRIBUTE.to_string(), bucket);
        }
        candidates.push(candidate);
    }

    info!("Loaded {} candidates", candidates.len());
    Ok(candidates)
}

/// Read a demographics table: id → non-empty demographic attributes
pub fn read_demographics<R: Read>(
    input: R,
    cfg: &DataConfig,
) -> Result<HashMap<String, BTreeMap<String, String>>> {
    let mut rdr = reader(input, cfg);
    let headers = rdr.headers().context("Failed to read demographics header")?.clone();
    let id_idx = column(&headers, "demographics", &cfg.id_column)?;
    let demo = demographic_columns(&headers, "demographics", cfg);

    let mut out = HashMap::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Malformed demographics row {}", line + 1))?;
        let Some(id) = cell(&record, id_idx) else {
            continue;
        };
        let attributes: BTreeMap<String, String> = demo
            .iter()
            .filter_map(|(name, idx)| cell(&record, *idx).map(|v| (name.clone(), v.to_string())))
            .collect();
        out.entry(id.to_string()).or_insert(attributes);
    }

    info!("Loaded demographics for {} candidates", out.len());
    Ok(out)
}

/// Inner join: candidates without a demographics row are dropped
///
/// Demographic values override attributes already on the candidate.
pub fn join_demographics(
    candidates: Vec<CandidateRecord>,
    demographics: &HashMap<String, BTreeMap<String, String>>,
) -> Vec<CandidateRecord> {
    let before = candidates.len();
    let joined: Vec<CandidateRecord> = candidates
        .into_iter()
        .filter_map(|mut c| {
            let attrs = demographics.get(&c.id)?;
            c.attributes
                .extend(attrs.iter().map(|(k, v)| (k.clone(), v.clone())));
            Some(c)
        })
        .collect();
    if joined.len() < before {
        info!(
            "Demographics join dropped {} of {} candidates",
            before - joined.len(),
            before
        );
    }
    joined
}

/// Keep candidates whose attributes match every filtered column
pub fn apply_filter(
    candidates: Vec<CandidateRecord>,
    filter: &BTreeMap<String, Vec<String>>,
) -> Vec<CandidateRecord> {
    if filter.is_empty() {
        return candidates;
    }
    let before = candidates.len();
    let kept: Vec<CandidateRecord> = candidates
        .into_iter()
        .filter(|c| {
            filter.iter().all(|(col, allowed)| {
                c.attribute(col)
                    .map(|v| allowed.iter().any(|a| a == v))
                    .unwrap_or(false)
            })
        })
        .collect();
    info!("Population filter kept {} of {} candidates", kept.len(), before);
    kept
}

/// Read the parser skills table, cleaning labels on the way
pub fn read_skills<R: Read>(input: R, cfg: &DataConfig) -> Result<LoadedSkills> {
    let mut rdr = reader(input, cfg);
    let headers = rdr.headers().context("Failed to read skills header")?.clone();
    let id_idx = column(&headers, "skills", &cfg.id_column)?;
    let type_idx = column(&headers, "skills", &cfg.skill_type_column)?;
    let label_idx = column(&headers, "skills", &cfg.skill_label_column)?;

    let mut loaded = LoadedSkills::default();
    for (line, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Malformed skills row {}", line + 1))?;
        let (Some(id), Some(skill_type)) = (cell(&record, id_idx), cell(&record, type_idx)) else {
            continue;
        };
        let label = cell(&record, label_idx).and_then(|raw| clean_label(raw, cfg));
        if label.is_none() {
            loaded.nulled_labels += 1;
        }
        loaded.records.push(SkillRecord {
            candidate_id: id.to_string(),
            skill_type: skill_type.to_string(),
            label,
        });
    }

    let types: BTreeSet<&str> = loaded.records.iter().map(|r| r.skill_type.as_str()).collect();
    info!(
        "Loaded {} parser skill records ({} skill types, {} unusable labels)",
        loaded.records.len(),
        types.len(),
        loaded.nulled_labels
    );
    Ok(loaded)
}

/// Read one column of a comma-separated vocabulary table
pub fn read_vocabulary<R: Read>(input: R, column_name: &str) -> Result<Vec<String>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = rdr.headers().context("Failed to read vocabulary header")?.clone();
    let idx = column(&headers, "vocabulary", column_name)?;
    let mut titles = Vec::new();
    for record in rdr.records() {
        let record = record.context("Malformed vocabulary row")?;
        if let Some(title) = cell(&record, idx) {
            titles.push(title.to_string());
        }
    }
    Ok(titles)
}

// =============================================================================
// FILE WRAPPERS
// =============================================================================

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open {:?}", path))
}

pub fn load_candidates(path: &Path, cfg: &DataConfig) -> Result<Vec<CandidateRecord>> {
    read_candidates(open(path)?, cfg).with_context(|| format!("Failed to load candidates: {:?}", path))
}

pub fn load_demographics(
    path: &Path,
    cfg: &DataConfig,
) -> Result<HashMap<String, BTreeMap<String, String>>> {
    read_demographics(open(path)?, cfg)
        .with_context(|| format!("Failed to load demographics: {:?}", path))
}

pub fn load_skills(path: &Path, cfg: &DataConfig) -> Result<LoadedSkills> {
    read_skills(open(path)?, cfg).with_context(|| format!("Failed to load parser skills: {:?}", path))
}

pub fn load_vocabulary(path: &Path, column_name: &str) -> Result<Vec<String>> {
    read_vocabulary(open(path)?, column_name)
        .with_context(|| format!("Failed to load vocabulary: {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANDIDATES: &str = "\
CANDIDATE_ID;Translated_CV;Gender;Location
c1;Driving licence B, English C1;Female;Milan
c2;  short  ;Male;
;no id here;Male;Rome
c1;duplicate row;Male;Rome
c3;\"quoted; text with separator\";;Turin
";

    #[test]
    fn test_read_candidates() {
        let cfg = DataConfig::new();
        let candidates = read_candidates(CANDIDATES.as_bytes(), &cfg).unwrap();
        assert_eq!(candidates.len(), 3);

        let c1 = &candidates[0];
        assert_eq!(c1.id, "c1");
        assert_eq!(c1.attribute("Gender"), Some("Female"));
        assert_eq!(c1.attribute("Location"), Some("Milan"));
        assert_eq!(c1.attribute("Age_bucket"), None);
        assert_eq!(c1.attribute(LENGTH_ATTRIBUTE), Some("<300"));

        assert_eq!(candidates[1].text, "short");
        assert_eq!(candidates[1].attribute("Location"), None);
        assert_eq!(candidates[2].text, "quoted; text with separator");
        assert_eq!(candidates[2].attribute("Gender"), None);
    }

    #[test]
    fn test_clean_text() {
        let raw = "CV anonimizzato:\n\"\"\"Cook\r\n\r\nDriving   licence B\"\"\"  ";
        assert_eq!(clean_text(raw), "Cook Driving licence B");
        assert_eq!(clean_text("  plain\ttext  "), "plain\ttext");
        assert_eq!(clean_text("a \t b"), "a b");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_length_bucket_uses_cleaned_text() {
        let cfg = DataConfig::new()
            .with_separator(',')
            .with_text_column("cleaned_cv")
            .with_length_buckets(vec![10, 20]);
        let table = "CANDIDATE_ID,cleaned_cv\nc1,\"CV anonimizzato:   nine char\"\nc2,\"ten chars!\"\n";
        let candidates = read_candidates(table.as_bytes(), &cfg).unwrap();
        assert_eq!(candidates[0].text, "nine char");
        assert_eq!(candidates[0].attribute(LENGTH_ATTRIBUTE), Some("<10"));
        assert_eq!(candidates[1].attribute(LENGTH_ATTRIBUTE), Some("10-19"));
    }

    #[test]
    fn test_missing_required_column() {
        let cfg = DataConfig::new();
        let err = read_candidates("CANDIDATE_ID;cv\nc1;text\n".as_bytes(), &cfg).unwrap_err();
        let audit = err.downcast_ref::<AuditError>().unwrap();
        assert_eq!(
            audit,
            &AuditError::MissingColumn {
                table: "candidates".to_string(),
                column: "Translated_CV".to_string()
            }
        );
    }

    #[test]
    fn test_length_bucket() {
        let b = [300, 1000, 3000];
        assert_eq!(length_bucket(0, &b).as_deref(), Some("<300"));
        assert_eq!(length_bucket(300, &b).as_deref(), Some("300-999"));
        assert_eq!(length_bucket(2999, &b).as_deref(), Some("1000-2999"));
        assert_eq!(length_bucket(3000, &b).as_deref(), Some(">=3000"));
        assert_eq!(length_bucket(10, &[]), None);
    }

    #[test]
    fn test_clean_label() {
        let cfg = DataConfig::new();
        assert_eq!(clean_label(" English ", &cfg).as_deref(), Some("English"));
        assert_eq!(clean_label("B", &cfg).as_deref(), Some("B"));
        assert_eq!(clean_label("B1", &cfg).as_deref(), Some("B1"));
        assert_eq!(clean_label("1234", &cfg), None);
        assert_eq!(clean_label("XXXXX Ltd", &cfg), None);
        assert_eq!(clean_label(&"a".repeat(101), &cfg), None);

        let strict = DataConfig {
            min_label_len: 2,
            ..DataConfig::new()
        };
        assert_eq!(clean_label("B", &strict), None);
    }

    #[test]
    fn test_read_skills() {
        let cfg = DataConfig::new();
        let table = "\
CANDIDATE_ID;Skill_Type;Skill
c1;DRIVERSLIC;B1
c1;DRIVERSLIC;C
c1;Language_Skill;English
c2;Language_Skill;
c2;Language_Skill;42
;Language_Skill;German
";
        let loaded = read_skills(table.as_bytes(), &cfg).unwrap();
        assert_eq!(loaded.records.len(), 5);
        assert_eq!(loaded.nulled_labels, 2);
        assert_eq!(loaded.records[0], SkillRecord::new("c1", "DRIVERSLIC", Some("B1")));
        assert_eq!(loaded.records[1].label.as_deref(), Some("C"));
        assert_eq!(loaded.records[3].label, None);
    }

    #[test]
    fn test_join_and_filter() {
        let cfg = DataConfig::new().with_demographic_columns(vec!["Gender", "Age_bucket"]);
        let candidates = vec![
            CandidateRecord::new("c1", "a").with_attribute("Gender", "unknown"),
            CandidateRecord::new("c2", "b"),
            CandidateRecord::new("c3", "c"),
        ];
        let demo = read_demographics(
            "CANDIDATE_ID;Gender;Age_bucket\nc1;Female;30-39\nc2;Other;\n".as_bytes(),
            &cfg,
        )
        .unwrap();

        let joined = join_demographics(candidates, &demo);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].attribute("Gender"), Some("Female"));
        assert_eq!(joined[0].attribute("Age_bucket"), Some("30-39"));
        assert_eq!(joined[1].attribute("Age_bucket"), None);

        let mut filter = BTreeMap::new();
        filter.insert("Gender".to_string(), vec!["Male".to_string(), "Female".to_string()]);
        let kept = apply_filter(joined, &filter);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "c1");
    }

    #[test]
    fn test_read_vocabulary() {
        let table = "conceptUri,preferredLabel\nu1,software developer\nu2,\nu3,\"nurse, general\"\n";
        let titles = read_vocabulary(table.as_bytes(), "preferredLabel").unwrap();
        assert_eq!(titles, vec!["software developer", "nurse, general"]);
    }
}
