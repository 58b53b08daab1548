//! Parser evaluation
//!
//! Compares parser skill records against rule-based extraction and
//! disaggregates the resulting errors by demographic group.
//!
//! ## Modules
//!
//! - `confusion` - `Conf` counts and the `Metric` enumeration
//! - `compare` - the comparison engine producing evidence rows
//! - `coverage` - candidate-level overlap between regex and parser
//! - `group_rates` - FP/FN rates per demographic group
//! - `report` - serializable report and text rendering

pub mod compare;
pub mod confusion;
pub mod coverage;
pub mod group_rates;
pub mod report;


pub use compare::{compare, ComparisonResult, Diagnostics, EvidenceRow, Outcome};
pub use confusion::{Conf, Metric};
pub use coverage::{candidate_coverage, CoverageStats};
pub use group_rates::{error_rates_by_group, GroupRate, GroupRateOptions, GroupRateTable};
pub use report::{format_group_table, highlight_snippets, AuditReport};
