//! Audit reports
//!
//! [`AuditReport`] collects the numbers of one skill comparison in a
//! serializable form; the `format_*` functions render the text summary
//! printed by the CLI.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

use super::compare::{ComparisonResult, Diagnostics};
use super::confusion::Conf;
use super::coverage::CoverageStats;
use super::group_rates::GroupRateTable;

const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Result of auditing one skill type
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub skill_type: String,
    /// Canonical labels the comparison was restricted to, if any
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    pub population: usize,
    pub conf: Conf,
    pub scores: BTreeMap<String, f64>,
    /// FP rows over the population size
    pub overall_fp_rate: Option<f64>,
    /// FN rows over the population size
    pub overall_fn_rate: Option<f64>,
    pub diagnostics: Diagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<CoverageStats>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupRateTable>,
}

impl AuditReport {
    pub fn new(result: &ComparisonResult, population: usize) -> Self {
        let overall = |rows: usize| (population > 0).then(|| rows as f64 / population as f64);
        Self {
            skill_type: result.skill_type.clone(),
            labels: Vec::new(),
            population,
            conf: result.conf,
            scores: result.conf.scores(),
            overall_fp_rate: overall(result.fp_rows.len()),
            overall_fn_rate: overall(result.fn_rows.len()),
            diagnostics: result.diagnostics.clone(),
            coverage: None,
            groups: Vec::new(),
        }
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_coverage(mut self, coverage: CoverageStats) -> Self {
        self.coverage = Some(coverage);
        self
    }

    pub fn with_group_table(mut self, table: GroupRateTable) -> Self {
        self.groups.push(table);
        self
    }

    /// Counts, headline metrics, then group tables or overall rates
    pub fn format_summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}\n", self.conf));
        out.push_str(&format!("{}\n", self.conf.format_summary()));

        if self.groups.is_empty() {
            out.push_str(&format!("\nOverall FP-rate: {}\n", fmt_rate(self.overall_fp_rate)));
            out.push_str(&format!("Overall FN-rate: {}\n", fmt_rate(self.overall_fn_rate)));
        } else {
            for table in &self.groups {
                out.push_str(&format!("\nError and rates by {}:\n", table.group_column));
                out.push_str(&format_group_table(table));
            }
        }

        let d = &self.diagnostics;
        if d.orphaned_records > 0 || d.malformed_labels > 0 || !d.unmatched_labels.is_empty() {
            out.push_str(&format!(
                "\nDiagnostics: {} orphaned records, {} malformed labels, {} unmatched labels\n",
                d.orphaned_records,
                d.malformed_labels,
                d.unmatched_labels.len()
            ));
        }
        out
    }
}

fn fmt_rate(rate: Option<f64>) -> String {
    rate.map(|r| format!("{:.3}", r)).unwrap_or_else(|| "-".to_string())
}

/// Fixed-width table of one [`GroupRateTable`]
pub fn format_group_table(table: &GroupRateTable) -> String {
    let metric_cols = table.metric_columns();
    let with_di = table.reference_group.is_some();

    let mut header = format!(
        "{:20} {:>7} {:>6} {:>6} {:>6} {:>6} {:>8} {:>8}",
        table.group_column, "total", "tp", "fp", "fn", "tn", "fp_rate", "fn_rate"
    );
    for col in &metric_cols {
        header.push_str(&format!(" {:>10}", truncate(col, 10)));
    }
    if with_di {
        header.push_str(&format!(" {:>8}", "DI"));
    }

    let mut out = format!("{}\n{}\n", header, "─".repeat(header.chars().count()));
    for row in &table.rows {
        let mut line = format!(
            "{:20} {:>7} {:>6} {:>6} {:>6} {:>6} {:>8} {:>8}",
            truncate(row.label(), 20),
            row.total,
            row.tp,
            row.fp,
            row.fn_,
            row.tn,
            fmt_rate(row.fp_rate),
            fmt_rate(row.fn_rate)
        );
        for col in &metric_cols {
            line.push_str(&format!(" {:>10}", fmt_rate(row.metrics.get(col).copied())));
        }
        if with_di {
            line.push_str(&format!(" {:>8}", fmt_rate(row.disparate_impact)));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Every match of `pattern` in `text`, with `context` characters either side
///
/// The match itself is wrapped in ANSI red.
pub fn highlight_snippets(text: &str, pattern: &Regex, context: usize) -> Vec<String> {
    pattern
        .find_iter(text)
        .map(|m| {
            let start = back(text, m.start(), context);
            let end = forward(text, m.end(), context);
            format!(
                "{}{}{}{}{}",
                &text[start..m.start()],
                RED,
                m.as_str(),
                RESET,
                &text[m.end()..end]
            )
        })
        .collect()
}

// Byte offset `n` chars before `pos`
fn back(text: &str, pos: usize, n: usize) -> usize {
    if n == 0 {
        return pos;
    }
    text[..pos]
        .char_indices()
        .rev()
        .take(n)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(pos)
}

// Byte offset `n` chars after `pos`
fn forward(text: &str, pos: usize, n: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(n)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}
