//! Candidate-level coverage
//!
//! Which candidates does the rule-based extractor flag for a skill, which ones
//! does the parser report it for, and how much do the two overlap.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::corpus::{CandidateRecord, SkillRecord};
use crate::extractors::SkillExtractor;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageStats {
    pub skill_type: String,
    #[serde(skip)]
    pub regex_ids: BTreeSet<String>,
    #[serde(skip)]
    pub parser_ids: BTreeSet<String>,
    #[serde(skip)]
    pub common_ids: BTreeSet<String>,
    #[serde(skip)]
    pub only_regex_ids: BTreeSet<String>,
    #[serde(skip)]
    pub only_parser_ids: BTreeSet<String>,
    pub num_regex_candidates: usize,
    pub num_parser_unique: usize,
    /// Parser records of this type, duplicates included
    pub num_parser_occurrences: usize,
    pub num_common_candidates: usize,
    pub num_only_regex_candidates: usize,
    pub num_only_parser_candidates: usize,
}

impl CoverageStats {
    pub fn format_summary(&self) -> String {
        format!(
            "Regex candidates: {} | Parser candidates: {} ({} records)\n\
             Both: {} | Only regex: {} | Only parser: {}",
            self.num_regex_candidates,
            self.num_parser_unique,
            self.num_parser_occurrences,
            self.num_common_candidates,
            self.num_only_regex_candidates,
            self.num_only_parser_candidates
        )
    }
}

/// Coverage of one skill type
///
/// Parser ids are taken from the parser table as-is, so candidates missing
/// from the candidate table still show up under "only parser".
pub fn candidate_coverage(
    candidates: &[CandidateRecord],
    parser_rows: &[SkillRecord],
    skill_type: &str,
    extractor: &dyn SkillExtractor,
) -> CoverageStats {
    let regex_ids: BTreeSet<String> = candidates
        .iter()
        .filter(|c| !extractor.extract(&c.text).is_empty())
        .map(|c| c.id.clone())
        .collect();

    let typed: Vec<&SkillRecord> = parser_rows.iter().filter(|r| r.skill_type == skill_type).collect();
    let parser_ids: BTreeSet<String> = typed.iter().map(|r| r.candidate_id.clone()).collect();

    let common_ids: BTreeSet<String> = regex_ids.intersection(&parser_ids).cloned().collect();
    let only_regex_ids: BTreeSet<String> = regex_ids.difference(&parser_ids).cloned().collect();
    let only_parser_ids: BTreeSet<String> = parser_ids.difference(&regex_ids).cloned().collect();

    CoverageStats {
        skill_type: skill_type.to_string(),
        num_regex_candidates: regex_ids.len(),
        num_parser_unique: parser_ids.len(),
        num_parser_occurrences: typed.len(),
        num_common_candidates: common_ids.len(),
        num_only_regex_candidates: only_regex_ids.len(),
        num_only_parser_candidates: only_parser_ids.len(),
        regex_ids,
        parser_ids,
        common_ids,
        only_regex_ids,
        only_parser_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::DrivingLicenseExtractor;

    #[test]
    fn test_candidate_coverage() {
        let candidates = vec![
            CandidateRecord::new("1", "driving licence B"),
            CandidateRecord::new("2", "own car"),
            CandidateRecord::new("3", "chef"),
        ];
        let rows = vec![
            SkillRecord::new("1", "DRIVERSLIC", Some("B")),
            SkillRecord::new("1", "DRIVERSLIC", Some("C")),
            SkillRecord::new("3", "DRIVERSLIC", Some("B")),
            SkillRecord::new("2", "Language_Skill", Some("English")),
        ];
        let stats = candidate_coverage(&candidates, &rows, "DRIVERSLIC", &DrivingLicenseExtractor);

        assert_eq!(stats.num_regex_candidates, 2);
        assert_eq!(stats.num_parser_unique, 2);
        assert_eq!(stats.num_parser_occurrences, 3);
        assert_eq!(stats.common_ids, BTreeSet::from(["1".to_string()]));
        assert_eq!(stats.only_regex_ids, BTreeSet::from(["2".to_string()]));
        assert_eq!(stats.only_parser_ids, BTreeSet::from(["3".to_string()]));
        assert!(stats.format_summary().contains("Both: 1 | Only regex: 1 | Only parser: 1"));
    }

    #[test]
    fn test_empty_inputs() {
        let stats = candidate_coverage(&[], &[], "DRIVERSLIC", &DrivingLicenseExtractor);
        assert_eq!(stats, CoverageStats {
            skill_type: "DRIVERSLIC".to_string(),
            ..Default::default()
        });
    }
}
