//! Comparison engine
//!
//! For every candidate the rule-based extractor's label set (the truth set) is
//! compared with the normalized labels the parser reported for one skill type:
//!
//! | truth | parser | outcome |
//! |-------|--------|---------|
//! | yes   | yes    | TP      |
//! | yes   | no     | FN      |
//! | no    | yes    | FP      |
//! | no    | no     | TN, one row per candidate |
//!
//! Each decision becomes an [`EvidenceRow`] carrying the candidate's
//! attributes so error rates can be sliced by demographic group afterwards.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, info, warn};

use super::confusion::Conf;
use crate::corpus::{CandidateRecord, SkillRecord};
use crate::extractors::{LabelNormalizer, LabelSet, SkillExtractor};

/// Kind of decision recorded by an evidence row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Outcome {
    TruePositive,
    FalsePositive,
    FalseNegative,
    TrueNegative,
}

impl Outcome {
    pub const ALL: [Outcome; 4] = [
        Self::TruePositive,
        Self::FalsePositive,
        Self::FalseNegative,
        Self::TrueNegative,
    ];

    /// Short name: tp, fp, fn, tn
    pub fn name(&self) -> &'static str {
        match self {
            Self::TruePositive => "tp",
            Self::FalsePositive => "fp",
            Self::FalseNegative => "fn",
            Self::TrueNegative => "tn",
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Self::TruePositive => "Both regex & parser found this skill.",
            Self::FalseNegative => "Rule-based extractor found skill but parser missed it.",
            Self::FalsePositive => "Parser output contains skill not found by rule-based extractor.",
            Self::TrueNegative => "No skill found by either extractor or parser.",
        }
    }
}

/// One recorded decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceRow {
    pub candidate_id: String,
    pub attributes: BTreeMap<String, String>,
    /// `None` only for TN rows
    pub label: Option<String>,
    pub text: String,
    pub outcome: Outcome,
}

impl EvidenceRow {
    fn new(candidate: &CandidateRecord, label: Option<String>, outcome: Outcome) -> Self {
        Self {
            candidate_id: candidate.id.clone(),
            attributes: candidate.attributes.clone(),
            label,
            text: candidate.text.clone(),
            outcome,
        }
    }

    pub fn reason(&self) -> &'static str {
        self.outcome.reason()
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

impl Serialize for EvidenceRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("EvidenceRow", 6)?;
        s.serialize_field("candidate_id", &self.candidate_id)?;
        s.serialize_field("attributes", &self.attributes)?;
        s.serialize_field("label", &self.label)?;
        s.serialize_field("outcome", self.outcome.name())?;
        s.serialize_field("reason", self.reason())?;
        s.serialize_field("text", &self.text)?;
        s.end()
    }
}

/// Non-fatal input problems seen during one comparison
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Diagnostics {
    /// Raw parser labels the normalizer could not map to its vocabulary
    pub unmatched_labels: BTreeSet<String>,
    /// Parser records of this skill type with a null label
    pub malformed_labels: usize,
    /// Parser records of this skill type whose candidate is not in the table
    pub orphaned_records: usize,
}

/// Output of [`compare`]
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub skill_type: String,
    pub conf: Conf,
    pub tp_rows: Vec<EvidenceRow>,
    pub fp_rows: Vec<EvidenceRow>,
    pub fn_rows: Vec<EvidenceRow>,
    pub tn_rows: Vec<EvidenceRow>,
    pub diagnostics: Diagnostics,
}

impl ComparisonResult {
    fn empty(skill_type: &str, diagnostics: Diagnostics) -> Self {
        Self {
            skill_type: skill_type.to_string(),
            conf: Conf::default(),
            tp_rows: Vec::new(),
            fp_rows: Vec::new(),
            fn_rows: Vec::new(),
            tn_rows: Vec::new(),
            diagnostics,
        }
    }

    fn push(&mut self, row: EvidenceRow) {
        match row.outcome {
            Outcome::TruePositive => self.tp_rows.push(row),
            Outcome::FalsePositive => self.fp_rows.push(row),
            Outcome::FalseNegative => self.fn_rows.push(row),
            Outcome::TrueNegative => self.tn_rows.push(row),
        }
    }

    fn recount(&mut self) {
        self.conf = Conf::new(
            self.tp_rows.len(),
            self.fp_rows.len(),
            self.tn_rows.len(),
            self.fn_rows.len(),
        );
    }

    pub fn rows(&self, outcome: Outcome) -> &[EvidenceRow] {
        match outcome {
            Outcome::TruePositive => &self.tp_rows,
            Outcome::FalsePositive => &self.fp_rows,
            Outcome::FalseNegative => &self.fn_rows,
            Outcome::TrueNegative => &self.tn_rows,
        }
    }

    /// All evidence rows, TP first, then FP, FN and TN
    pub fn all_rows(&self) -> impl Iterator<Item = &EvidenceRow> {
        Outcome::ALL.into_iter().flat_map(move |o| self.rows(o).iter())
    }

    /// Keep only decisions about `labels`
    ///
    /// Candidates left without any TP/FP/FN row become one TN row each, so
    /// the result reads as if the comparison had only known these labels.
    pub fn restrict_to(&self, labels: &LabelSet, candidates: &[CandidateRecord]) -> Self {
        let keep = |row: &&EvidenceRow| row.label.as_ref().is_some_and(|l| labels.contains(l));
        let mut out = Self::empty(&self.skill_type, self.diagnostics.clone());
        out.tp_rows = self.tp_rows.iter().filter(keep).cloned().collect();
        out.fp_rows = self.fp_rows.iter().filter(keep).cloned().collect();
        out.fn_rows = self.fn_rows.iter().filter(keep).cloned().collect();

        let decided: HashSet<&str> = out
            .tp_rows
            .iter()
            .chain(&out.fp_rows)
            .chain(&out.fn_rows)
            .map(|r| r.candidate_id.as_str())
            .collect();
        let tn_rows: Vec<EvidenceRow> = candidates
            .iter()
            .filter(|c| !decided.contains(c.id.as_str()))
            .map(|c| EvidenceRow::new(c, None, Outcome::TrueNegative))
            .collect();
        out.tn_rows = tn_rows;
        out.recount();
        out
    }
}

/// Normalized parser labels per candidate for one skill type
fn index_parser_rows(
    candidates: &[CandidateRecord],
    parser_rows: &[SkillRecord],
    skill_type: &str,
    normalizer: &dyn LabelNormalizer,
    diagnostics: &mut Diagnostics,
) -> HashMap<String, LabelSet> {
    let known: HashSet<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
    let mut index: HashMap<String, LabelSet> = HashMap::new();

    for row in parser_rows.iter().filter(|r| r.skill_type == skill_type) {
        if !known.contains(row.candidate_id.as_str()) {
            diagnostics.orphaned_records += 1;
            continue;
        }
        if row.label.is_none() {
            diagnostics.malformed_labels += 1;
        }
        let normalized = normalizer.normalize(row.label.as_deref());
        if let Some(raw) = normalized.unmatched {
            diagnostics.unmatched_labels.insert(raw);
        }
        let labels = index.entry(row.candidate_id.clone()).or_default();
        if !normalized.label.is_empty() {
            labels.insert(normalized.label);
        }
    }
    index
}

/// Compare the rule-based truth set with the parser's labels for every candidate
pub fn compare(
    candidates: &[CandidateRecord],
    parser_rows: &[SkillRecord],
    skill_type: &str,
    extractor: &dyn SkillExtractor,
    normalizer: &dyn LabelNormalizer,
) -> ComparisonResult {
    let mut diagnostics = Diagnostics::default();
    let index = index_parser_rows(candidates, parser_rows, skill_type, normalizer, &mut diagnostics);
    let none = LabelSet::new();

    let mut result = ComparisonResult::empty(skill_type, diagnostics);
    let mut conf = Conf::default();
    for candidate in candidates {
        let truth = extractor.extract(&candidate.text);
        let parser = index.get(&candidate.id).unwrap_or(&none);

        let tp_labels: Vec<&String> = truth.intersection(parser).collect();
        let fn_labels: Vec<&String> = truth.difference(parser).collect();
        let fp_labels: Vec<&String> = parser.difference(&truth).collect();

        let local = if truth.is_empty() && parser.is_empty() {
            result.push(EvidenceRow::new(candidate, None, Outcome::TrueNegative));
            Conf::new(0, 0, 1, 0)
        } else {
            for (labels, outcome) in [
                (&tp_labels, Outcome::TruePositive),
                (&fn_labels, Outcome::FalseNegative),
                (&fp_labels, Outcome::FalsePositive),
            ] {
                for label in labels.iter() {
                    result.push(EvidenceRow::new(candidate, Some((*label).clone()), outcome));
                }
            }
            Conf::new(tp_labels.len(), fp_labels.len(), 0, fn_labels.len())
        };
        debug!("{} [{}]: {}", candidate.id, skill_type, local);
        conf = conf + local;
    }
    result.conf = conf;

    let d = &result.diagnostics;
    if d.orphaned_records > 0 {
        warn!("{}: {} parser records reference unknown candidates", skill_type, d.orphaned_records);
    }
    if d.malformed_labels > 0 {
        warn!("{}: {} parser records have no usable label", skill_type, d.malformed_labels);
    }
    info!("{}: {} over {} candidates", skill_type, result.conf, candidates.len());
    result
}
