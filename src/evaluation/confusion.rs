//! Confusion counts and the metrics derived from them
//!
//! ## Metrics Overview
//!
//! - **Precision**: tp / (tp + fp)
//! - **Recall**: tp / (tp + fn), the true-positive rate ("equality of opportunity")
//! - **F1**: harmonic mean of precision and recall
//! - **Accuracy**: (tp + tn) / total
//! - **NPV**: tn / (tn + fn)
//! - **False omission rate**: fn / (tn + fn)
//!
//! Every ratio returns 0.0 when its denominator is zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use crate::error::AuditError;

/// Confusion counts for one comparison run (or one slice of it)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Conf {
    /// Labels found by both the rule-based extractor and the parser
    pub tp: usize,
    /// Labels reported by the parser only
    pub fp: usize,
    /// Candidates where neither side found anything
    pub tn: usize,
    /// Labels found by the rule-based extractor only
    #[serde(rename = "fn")]
    pub fn_: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl Conf {
    pub fn new(tp: usize, fp: usize, tn: usize, fn_: usize) -> Self {
        Self { tp, fp, tn, fn_ }
    }

    /// Number of decisions recorded (tp + fp + tn + fn)
    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// True-positive rate
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// Same quantity as [`Conf::recall`], named after the fairness criterion
    pub fn equality_of_opportunity(&self) -> f64 {
        self.recall()
    }

    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    /// Negative predictive value: tn / (tn + fn)
    pub fn npv(&self) -> f64 {
        ratio(self.tn, self.tn + self.fn_)
    }

    /// fn / (tn + fn)
    pub fn false_omission_rate(&self) -> f64 {
        ratio(self.fn_, self.tn + self.fn_)
    }

    /// The four headline metrics keyed by name
    pub fn scores(&self) -> BTreeMap<String, f64> {
        [Metric::Accuracy, Metric::Precision, Metric::Recall, Metric::F1]
            .into_iter()
            .map(|m| (m.name().to_string(), m.apply(self)))
            .collect()
    }

    /// Format as a summary string
    pub fn format_summary(&self) -> String {
        format!(
            "Accuracy: {:.3}, Precision: {:.3}, Recall: {:.3}, F1: {:.3}",
            self.accuracy(),
            self.precision(),
            self.recall(),
            self.f1()
        )
    }
}

impl Add for Conf {
    type Output = Conf;

    fn add(self, other: Conf) -> Conf {
        Conf {
            tp: self.tp + other.tp,
            fp: self.fp + other.fp,
            tn: self.tn + other.tn,
            fn_: self.fn_ + other.fn_,
        }
    }
}

impl std::iter::Sum for Conf {
    fn sum<I: Iterator<Item = Conf>>(iter: I) -> Self {
        iter.fold(Conf::default(), Add::add)
    }
}

impl fmt::Display for Conf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TP: {}, FP: {}, TN: {}, FN: {}",
            self.tp, self.fp, self.tn, self.fn_
        )
    }
}

// =============================================================================
// METRIC SELECTION
// =============================================================================

/// Metrics that can be requested by name for per-group tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Accuracy,
    Precision,
    Recall,
    F1,
    NegativePredictiveValue,
    FalseOmissionRate,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Accuracy,
        Metric::Precision,
        Metric::Recall,
        Metric::F1,
        Metric::NegativePredictiveValue,
        Metric::FalseOmissionRate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Accuracy => "accuracy",
            Self::Precision => "precision",
            Self::Recall => "recall",
            Self::F1 => "f1",
            Self::NegativePredictiveValue => "npv",
            Self::FalseOmissionRate => "false_omission_rate",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Accuracy => "(tp + tn) / total",
            Self::Precision => "tp / (tp + fp)",
            Self::Recall => "tp / (tp + fn), equality of opportunity",
            Self::F1 => "harmonic mean of precision and recall",
            Self::NegativePredictiveValue => "tn / (tn + fn)",
            Self::FalseOmissionRate => "fn / (tn + fn)",
        }
    }

    pub fn apply(&self, conf: &Conf) -> f64 {
        match self {
            Self::Accuracy => conf.accuracy(),
            Self::Precision => conf.precision(),
            Self::Recall => conf.recall(),
            Self::F1 => conf.f1(),
            Self::NegativePredictiveValue => conf.npv(),
            Self::FalseOmissionRate => conf.false_omission_rate(),
        }
    }

    /// Parse a list of names, failing on the first unknown one
    pub fn parse_all<S: AsRef<str>>(names: &[S]) -> Result<Vec<Metric>, AuditError> {
        names.iter().map(|n| n.as_ref().parse()).collect()
    }
}

impl FromStr for Metric {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "accuracy" => Ok(Self::Accuracy),
            "precision" => Ok(Self::Precision),
            "recall" | "tpr" | "equality_of_opportunity" => Ok(Self::Recall),
            "f1" => Ok(Self::F1),
            "npv" | "negative_predictive_value" => Ok(Self::NegativePredictiveValue),
            "for" | "false_omission_rate" => Ok(Self::FalseOmissionRate),
            _ => Err(AuditError::UnknownMetric(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_zero_conf_is_zero_everywhere() {
        let conf = Conf::default();
        assert_eq!(conf.total(), 0);
        assert_eq!(conf.precision(), 0.0);
        assert_eq!(conf.recall(), 0.0);
        assert_eq!(conf.f1(), 0.0);
        assert_eq!(conf.accuracy(), 0.0);
        assert_eq!(conf.npv(), 0.0);
        assert_eq!(conf.false_omission_rate(), 0.0);
    }

    #[test]
    fn test_metric_arithmetic() {
        let conf = Conf::new(6, 2, 10, 3);
        assert!((conf.precision() - 0.75).abs() < 1e-9);
        assert!((conf.recall() - 6.0 / 9.0).abs() < 1e-9);
        let expected_f1 = 2.0 * 0.75 * (6.0 / 9.0) / (0.75 + 6.0 / 9.0);
        assert!((conf.f1() - expected_f1).abs() < 1e-9);
        assert!((conf.accuracy() - 16.0 / 21.0).abs() < 1e-9);
        assert!((conf.npv() - 10.0 / 13.0).abs() < 1e-9);
        assert!((conf.false_omission_rate() - 3.0 / 13.0).abs() < 1e-9);
        assert_eq!(conf.equality_of_opportunity(), conf.recall());
    }

    #[test]
    fn test_metrics_stay_in_unit_interval() {
        for tp in 0..4 {
            for fp in 0..4 {
                for tn in 0..4 {
                    for fn_ in 0..4 {
                        let conf = Conf::new(tp, fp, tn, fn_);
                        for metric in Metric::ALL {
                            let v = metric.apply(&conf);
                            assert!((0.0..=1.0).contains(&v), "{} = {} for {}", metric.name(), v, conf);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_precision_zero_but_recall_defined() {
        // Parser never asserted anything, rule-based found 4
        let conf = Conf::new(0, 0, 5, 4);
        assert_eq!(conf.precision(), 0.0);
        assert_eq!(conf.recall(), 0.0);
        assert_eq!(conf.f1(), 0.0);
        assert!((conf.accuracy() - 5.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_add_and_sum() {
        let a = Conf::new(1, 2, 3, 4);
        let b = Conf::new(10, 20, 30, 40);
        assert_eq!(a + b, Conf::new(11, 22, 33, 44));
        let total: Conf = vec![a, b, Conf::default()].into_iter().sum();
        assert_eq!(total, Conf::new(11, 22, 33, 44));
    }

    #[test]
    fn test_display() {
        assert_eq!(Conf::new(1, 2, 3, 4).to_string(), "TP: 1, FP: 2, TN: 3, FN: 4");
    }

    #[test]
    fn test_serializes_fn_key() {
        let json = serde_json::to_string(&Conf::new(1, 0, 0, 2)).unwrap();
        assert_eq!(json, r#"{"tp":1,"fp":0,"tn":0,"fn":2}"#);
    }

    #[test]
    fn test_metric_from_str() {
        assert_eq!("precision".parse::<Metric>(), Ok(Metric::Precision));
        assert_eq!("Equality_Of_Opportunity".parse::<Metric>(), Ok(Metric::Recall));
        assert_eq!(" npv ".parse::<Metric>(), Ok(Metric::NegativePredictiveValue));
        assert_eq!(
            "specificity".parse::<Metric>(),
            Err(AuditError::UnknownMetric("specificity".to_string()))
        );
    }

    #[test]
    fn test_parse_all_reports_first_unknown() {
        let err = Metric::parse_all(&["f1", "bogus", "also_bogus"]).unwrap_err();
        assert_eq!(err, AuditError::UnknownMetric("bogus".to_string()));
        assert_eq!(Metric::parse_all(&["f1", "recall"]).unwrap(), vec![Metric::F1, Metric::Recall]);
    }

    #[test]
    fn test_scores_keys() {
        let scores = Conf::new(1, 1, 1, 1).scores();
        let keys: Vec<_> = scores.keys().cloned().collect();
        assert_eq!(keys, vec!["accuracy", "f1", "precision", "recall"]);
        assert!((scores["accuracy"] - 0.5).abs() < 1e-9);
    }
}
