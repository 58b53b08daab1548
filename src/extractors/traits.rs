//! Extractor and normalizer contracts
//!
//! The comparison engine only depends on these two traits. Each skill kind
//! (driving licence, language, job title) is plugged in by supplying a
//! different extractor/normalizer pair.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A set of canonical labels for one candidate and one skill type
///
/// Ordered so evidence rows come out in a stable order.
pub type LabelSet = BTreeSet<String>;

/// Output of a normalizer call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Normalized {
    /// Canonical label, or the empty string when unrecognized
    pub label: String,
    /// Raw variant the normalizer could not map to its vocabulary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unmatched: Option<String>,
}

impl Normalized {
    /// A recognized canonical label
    pub fn canonical(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            unmatched: None,
        }
    }

    /// The empty-label sentinel (null or unusable input)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Nothing usable, but the raw variant is worth reporting
    pub fn unrecognized(raw: impl Into<String>) -> Self {
        Self {
            label: String::new(),
            unmatched: Some(raw.into()),
        }
    }

    /// A label kept as-is even though it is outside the known vocabulary
    pub fn passthrough(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            unmatched: Some(label.clone()),
            label,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_empty()
    }
}

/// Rule-based extractor: free text to a set of canonical labels
///
/// Implementations must be total (never panic on arbitrary text), deterministic,
/// and normalize case internally so equivalent text yields identical sets.
pub trait SkillExtractor: Send + Sync {
    fn extract(&self, text: &str) -> LabelSet;
}

/// Maps a raw parser label to a canonical label
///
/// `None` stands for a null cell. Implementations never fail; unusable input
/// yields [`Normalized::empty`].
pub trait LabelNormalizer: Send + Sync {
    fn normalize(&self, raw: Option<&str>) -> Normalized;
}

impl<F> SkillExtractor for F
where
    F: Fn(&str) -> LabelSet + Send + Sync,
{
    fn extract(&self, text: &str) -> LabelSet {
        self(text)
    }
}

impl<F> LabelNormalizer for F
where
    F: Fn(Option<&str>) -> Normalized + Send + Sync,
{
    fn normalize(&self, raw: Option<&str>) -> Normalized {
        self(raw)
    }
}

/// Normalizer that only trims and lower-cases
#[derive(Debug, Clone, Copy, Default)]
pub struct LowercaseNormalizer;

impl LabelNormalizer for LowercaseNormalizer {
    fn normalize(&self, raw: Option<&str>) -> Normalized {
        match raw {
            Some(s) => Normalized::canonical(s.trim().to_lowercase()),
            None => Normalized::empty(),
        }
    }
}

/// An extractor/normalizer pair for one skill kind
pub struct SkillPlugin {
    pub extractor: Box<dyn SkillExtractor>,
    pub normalizer: Box<dyn LabelNormalizer>,
}

impl SkillPlugin {
    pub fn new(
        extractor: impl SkillExtractor + 'static,
        normalizer: impl LabelNormalizer + 'static,
    ) -> Self {
        Self {
            extractor: Box::new(extractor),
            normalizer: Box::new(normalizer),
        }
    }
}
