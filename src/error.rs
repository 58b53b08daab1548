//! Typed errors for conditions callers are expected to match on
//!
//! Loaders and the CLI work with `anyhow::Result`; the variants here are the
//! ones the evaluation API reports by name.

use thiserror::Error;

/// Result alias for the evaluation API
pub type AuditResult<T> = std::result::Result<T, AuditError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    /// A metric name that is not part of [`crate::evaluation::Metric`]
    #[error("Unknown metric: '{0}'")]
    UnknownMetric(String),

    /// A skill kind that has no built-in extractor
    #[error("Unknown skill kind: '{0}'")]
    UnknownSkillKind(String),

    /// A required column is absent from a loaded table
    #[error("Missing column '{column}' in {table}")]
    MissingColumn { table: String, column: String },

    /// Configuration failed validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
