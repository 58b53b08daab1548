//! Group error rates
//!
//! Disaggregates the evidence of one comparison by a demographic column:
//! outcome counts per group value, FP/FN rates, optional extra metrics and a
//! disparate-impact ratio against a reference group.
//!
//! Every group present in the population appears in the table, with zero
//! counts where no evidence exists. Groups seen only in the evidence get
//! `total = 0` and undefined (`None`) rates.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

use super::compare::{ComparisonResult, Outcome};
use super::confusion::{Conf, Metric};
use crate::config::RateDenominator;
use crate::corpus::CandidateRecord;
use crate::error::AuditResult;

/// Rate settings for [`error_rates_by_group`]
#[derive(Debug, Clone, Default)]
pub struct GroupRateOptions {
    pub denominator: RateDenominator,
    /// Baseline group for disparate impact
    pub reference_group: Option<String>,
}

impl GroupRateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_denominator(mut self, denominator: RateDenominator) -> Self {
        self.denominator = denominator;
        self
    }

    pub fn with_reference_group(mut self, group: impl Into<String>) -> Self {
        self.reference_group = Some(group.into());
        self
    }
}

/// One group value's counts and rates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRate {
    /// `None` for candidates without the attribute
    pub group: Option<String>,
    /// Candidates of this group in the population
    pub total: usize,
    pub tp: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
    pub tn: usize,
    /// tp + fp + fn + tn
    pub decisions: usize,
    pub fp_rate: Option<f64>,
    pub fn_rate: Option<f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metrics: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disparate_impact: Option<f64>,
}

impl GroupRate {
    fn new(group: Option<String>) -> Self {
        Self {
            group,
            total: 0,
            tp: 0,
            fp: 0,
            fn_: 0,
            tn: 0,
            decisions: 0,
            fp_rate: None,
            fn_rate: None,
            metrics: BTreeMap::new(),
            disparate_impact: None,
        }
    }

    pub fn conf(&self) -> Conf {
        Conf::new(self.tp, self.fp, self.tn, self.fn_)
    }

    /// Share of decisions where the parser reported the skill
    pub fn positive_rate(&self) -> Option<f64> {
        rate(self.tp + self.fp, self.decisions)
    }

    /// Display name of the group
    pub fn label(&self) -> &str {
        self.group.as_deref().unwrap_or("(missing)")
    }
}

/// Per-group rates for one demographic column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRateTable {
    pub group_column: String,
    pub denominator: RateDenominator,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_group: Option<String>,
    pub rows: Vec<GroupRate>,
}

impl GroupRateTable {
    pub fn get(&self, group: &str) -> Option<&GroupRate> {
        self.rows.iter().find(|r| r.group.as_deref() == Some(group))
    }

    /// Names of the extra metric columns, in table order
    pub fn metric_columns(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|r| r.metrics.keys().cloned().collect())
            .unwrap_or_default()
    }
}

fn rate(count: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(count as f64 / denominator as f64)
    }
}

/// FP/FN rates per value of `group_col`
///
/// Metric names are checked before anything is computed; an unknown name
/// fails with [`crate::error::AuditError::UnknownMetric`].
pub fn error_rates_by_group<S: AsRef<str>>(
    result: &ComparisonResult,
    population: &[CandidateRecord],
    group_col: &str,
    metrics: &[S],
    options: &GroupRateOptions,
) -> AuditResult<GroupRateTable> {
    let metrics = Metric::parse_all(metrics)?;

    let mut groups: HashMap<Option<String>, GroupRate> = HashMap::new();
    for candidate in population {
        let key = candidate.attribute(group_col).map(String::from);
        groups.entry(key.clone()).or_insert_with(|| GroupRate::new(key)).total += 1;
    }

    for outcome in Outcome::ALL {
        for row in result.rows(outcome) {
            let key = row.attribute(group_col).map(String::from);
            let entry = groups.entry(key.clone()).or_insert_with(|| GroupRate::new(key));
            match outcome {
                Outcome::TruePositive => entry.tp += 1,
                Outcome::FalsePositive => entry.fp += 1,
                Outcome::FalseNegative => entry.fn_ += 1,
                Outcome::TrueNegative => entry.tn += 1,
            }
        }
    }

    let mut rows: Vec<GroupRate> = groups.into_values().collect();
    rows.sort_by(|a, b| {
        a.group
            .is_none()
            .cmp(&b.group.is_none())
            .then_with(|| a.group.cmp(&b.group))
    });

    for row in &mut rows {
        row.decisions = row.tp + row.fp + row.fn_ + row.tn;
        if row.total > 0 {
            let denominator = match options.denominator {
                RateDenominator::Decisions => row.decisions,
                RateDenominator::Population => row.total,
            };
            row.fp_rate = rate(row.fp, denominator);
            row.fn_rate = rate(row.fn_, denominator);
        } else {
            warn!("Group '{}' of {} has evidence but no population", row.label(), group_col);
        }
        let conf = row.conf();
        row.metrics = metrics
            .iter()
            .map(|m| (m.name().to_string(), m.apply(&conf)))
            .collect();
    }

    if let Some(reference) = &options.reference_group {
        let baseline = rows
            .iter()
            .find(|r| r.group.as_deref() == Some(reference.as_str()))
            .and_then(GroupRate::positive_rate)
            .filter(|r| *r > 0.0);
        match baseline {
            Some(base) => {
                for row in &mut rows {
                    row.disparate_impact = row.positive_rate().map(|r| r / base);
                }
            }
            None => warn!(
                "Reference group '{}' of {} has no positive decisions, disparate impact undefined",
                reference, group_col
            ),
        }
    }

    Ok(GroupRateTable {
        group_column: group_col.to_string(),
        denominator: options.denominator,
        reference_group: options.reference_group.clone(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::SkillRecord;
    use crate::error::AuditError;
    use crate::evaluation::compare::compare;
    use crate::extractors::{LabelSet, LowercaseNormalizer};

    const TYPE: &str = "SKILL";

    /// Truth set is every word after "has:" in the text
    fn extractor(text: &str) -> LabelSet {
        text.split_once("has:")
            .map(|(_, rest)| rest.split_whitespace().map(String::from).collect())
            .unwrap_or_default()
    }

    fn person(id: usize, gender: Option<&str>, text: &str) -> CandidateRecord {
        let c = CandidateRecord::new(format!("p{}", id), text);
        match gender {
            Some(g) => c.with_attribute("Gender", g),
            None => c,
        }
    }

    fn claim(id: usize, label: &str) -> SkillRecord {
        SkillRecord::new(format!("p{}", id), TYPE, Some(label))
    }

    fn run(population: &[CandidateRecord], rows: &[SkillRecord]) -> ComparisonResult {
        compare(population, rows, TYPE, &extractor, &LowercaseNormalizer)
    }

    /// 10 women, 5 men and 2 others; one FP among women and one among men
    fn scenario() -> (Vec<CandidateRecord>, ComparisonResult) {
        let mut population = Vec::new();
        for i in 0..10 {
            population.push(person(i, Some("Female"), "nothing"));
        }
        for i in 10..15 {
            population.push(person(i, Some("Male"), "nothing"));
        }
        population.push(person(15, Some("Other"), "nothing"));
        population.push(person(16, Some("Other"), "nothing"));
        let rows = vec![claim(0, "b"), claim(10, "b")];
        let result = run(&population, &rows);
        (population, result)
    }

    #[test]
    fn test_fp_rates_for_two_groups() {
        let (population, result) = scenario();
        let table =
            error_rates_by_group(&result, &population, "Gender", &[] as &[&str], &GroupRateOptions::new())
                .unwrap();

        let female = table.get("Female").unwrap();
        assert_eq!((female.total, female.fp, female.tn, female.decisions), (10, 1, 9, 10));
        assert!((female.fp_rate.unwrap() - 0.1).abs() < 1e-9);

        let male = table.get("Male").unwrap();
        assert_eq!((male.total, male.fp, male.tn, male.decisions), (5, 1, 4, 5));
        assert!((male.fp_rate.unwrap() - 0.2).abs() < 1e-9);

        // no FP observed, still listed with fp = 0
        let other = table.get("Other").unwrap();
        assert_eq!((other.total, other.fp, other.fn_), (2, 0, 0));
        assert_eq!(other.fp_rate, Some(0.0));
        assert_eq!(other.fn_rate, Some(0.0));
    }

    #[test]
    fn test_denominator_choice() {
        let population = vec![
            person(0, Some("Female"), "has: a b c"),
            person(1, Some("Female"), "nothing"),
            person(2, Some("Male"), "nothing"),
        ];
        // p0: tp a, fn b c, fp d; p1: tn; p2: tn
        let result = run(&population, &[claim(0, "a"), claim(0, "d")]);

        let by_decisions =
            error_rates_by_group(&result, &population, "Gender", &[] as &[&str], &GroupRateOptions::new())
                .unwrap();
        let female = by_decisions.get("Female").unwrap();
        assert_eq!(female.decisions, 5);
        assert!((female.fn_rate.unwrap() - 2.0 / 5.0).abs() < 1e-9);
        assert!((female.fp_rate.unwrap() - 1.0 / 5.0).abs() < 1e-9);

        let options = GroupRateOptions::new().with_denominator(RateDenominator::Population);
        let by_population =
            error_rates_by_group(&result, &population, "Gender", &[] as &[&str], &options).unwrap();
        let female = by_population.get("Female").unwrap();
        assert_eq!(by_population.denominator, RateDenominator::Population);
        assert!((female.fn_rate.unwrap() - 1.0).abs() < 1e-9);
        assert!((female.fp_rate.unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_evidence_without_population_has_undefined_rates() {
        let (population, result) = scenario();
        // aggregate against a population lacking the men
        let women: Vec<CandidateRecord> = population
            .into_iter()
            .filter(|c| c.attribute("Gender") != Some("Male"))
            .collect();
        let table =
            error_rates_by_group(&result, &women, "Gender", &[] as &[&str], &GroupRateOptions::new()).unwrap();

        let male = table.get("Male").unwrap();
        assert_eq!(male.total, 0);
        assert_eq!(male.fp, 1);
        assert_eq!(male.fp_rate, None);
        assert_eq!(male.fn_rate, None);
    }

    #[test]
    fn test_missing_attribute_group_is_last() {
        let population = vec![
            person(0, None, "has: x"),
            person(1, Some("Male"), "nothing"),
            person(2, Some("Female"), "nothing"),
        ];
        let result = run(&population, &[]);
        let table =
            error_rates_by_group(&result, &population, "Gender", &[] as &[&str], &GroupRateOptions::new())
                .unwrap();
        let groups: Vec<Option<&str>> = table.rows.iter().map(|r| r.group.as_deref()).collect();
        assert_eq!(groups, vec![Some("Female"), Some("Male"), None]);
        assert_eq!(table.rows[2].fn_, 1);
        assert_eq!(table.rows[2].label(), "(missing)");
    }

    #[test]
    fn test_extra_metrics() {
        let population = vec![
            person(0, Some("Female"), "has: a b"),
            person(1, Some("Male"), "has: a"),
        ];
        let result = run(&population, &[claim(0, "a"), claim(1, "a"), claim(1, "z")]);
        let table = error_rates_by_group(
            &result,
            &population,
            "Gender",
            &["precision", "equality_of_opportunity"],
            &GroupRateOptions::new(),
        )
        .unwrap();

        assert_eq!(table.metric_columns(), vec!["precision", "recall"]);
        let female = table.get("Female").unwrap();
        assert!((female.metrics["precision"] - 1.0).abs() < 1e-9);
        assert!((female.metrics["recall"] - 0.5).abs() < 1e-9);
        let male = table.get("Male").unwrap();
        assert!((male.metrics["precision"] - 0.5).abs() < 1e-9);
        assert!((male.metrics["recall"] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_metric_fails_fast() {
        let (population, result) = scenario();
        let err = error_rates_by_group(
            &result,
            &population,
            "Gender",
            &["recall", "specificity"],
            &GroupRateOptions::new(),
        )
        .unwrap_err();
        assert_eq!(err, AuditError::UnknownMetric("specificity".to_string()));
    }

    #[test]
    fn test_disparate_impact() {
        let (population, result) = scenario();
        let options = GroupRateOptions::new().with_reference_group("Female");
        let table =
            error_rates_by_group(&result, &population, "Gender", &[] as &[&str], &options).unwrap();

        // parser-positive rate: female 1/10, male 1/5
        assert!((table.get("Female").unwrap().disparate_impact.unwrap() - 1.0).abs() < 1e-9);
        assert!((table.get("Male").unwrap().disparate_impact.unwrap() - 2.0).abs() < 1e-9);
        assert_eq!(table.get("Other").unwrap().disparate_impact, Some(0.0));

        let options = GroupRateOptions::new().with_reference_group("Other");
        let table =
            error_rates_by_group(&result, &population, "Gender", &[] as &[&str], &options).unwrap();
        assert!(table.rows.iter().all(|r| r.disparate_impact.is_none()));
    }

    #[test]
    fn test_serializes_fn_key() {
        let (population, result) = scenario();
        let table =
            error_rates_by_group(&result, &population, "Gender", &[] as &[&str], &GroupRateOptions::new())
                .unwrap();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["denominator"], "decisions");
        assert_eq!(json["rows"][0]["group"], "Female");
        assert_eq!(json["rows"][0]["fn"], 0);
        assert!(json["rows"][0].get("disparate_impact").is_none());
    }
}
