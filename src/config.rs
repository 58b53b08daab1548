//! Configuration for the audit
//!
//! Defines the `audit.toml` schema, the [`SkillKind`] enum and the
//! [`RateDenominator`] choice for group error rates.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::AuditError;
use crate::evaluation::Metric;

/// Skill kinds with a built-in extractor/normalizer pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    /// Driving licence mentions, canonical label `driver_license`
    DrivingLicense,
    /// Language skills, canonical labels are ISO 639-1 codes
    Language,
    /// Job titles from an occupations vocabulary
    JobTitle,
}

impl SkillKind {
    pub const ALL: [SkillKind; 3] = [Self::DrivingLicense, Self::Language, Self::JobTitle];

    pub fn name(&self) -> &'static str {
        match self {
            Self::DrivingLicense => "driving_license",
            Self::Language => "language",
            Self::JobTitle => "job_title",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "driving_license" | "driving_licence" | "driver_license" | "driverslic" => {
                Some(Self::DrivingLicense)
            }
            "language" | "languages" | "language_skill" => Some(Self::Language),
            "job_title" | "job_titles" | "job" => Some(Self::JobTitle),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::DrivingLicense => "Driving licence regex vs parser licence codes",
            Self::Language => "Language-name matchers per ISO code vs parser language skills",
            Self::JobTitle => "Occupation phrase matcher vs parser job titles",
        }
    }

    /// Skill type label the parser uses for this kind by default
    pub fn default_parser_type(&self) -> &'static str {
        match self {
            Self::DrivingLicense => "DRIVERSLIC",
            Self::Language => "Language_Skill",
            Self::JobTitle => "Job_title",
        }
    }
}

/// Denominator for per-group FP/FN rates
///
/// - `Decisions`: tp + fp + fn + tn observed for the group
/// - `Population`: number of candidates in the group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateDenominator {
    #[default]
    Decisions,
    Population,
}

impl RateDenominator {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Decisions => "decisions",
            Self::Population => "population",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "decisions" | "observed" | "total_skills" => Some(Self::Decisions),
            "population" | "candidates" => Some(Self::Population),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Decisions => "count / (tp + fp + fn + tn) of the group",
            Self::Population => "count / candidates in the group",
        }
    }
}

/// Complete audit configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Table layout
    #[serde(default)]
    pub data: DataConfig,

    /// Population filter: column → allowed values
    #[serde(default)]
    pub filter: BTreeMap<String, Vec<String>>,

    /// Skill comparisons to run
    #[serde(default = "default_skills")]
    pub skills: Vec<SkillConfig>,

    /// Group error-rate settings
    #[serde(default)]
    pub rates: RatesConfig,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            filter: BTreeMap::new(),
            skills: default_skills(),
            rates: RatesConfig::default(),
        }
    }
}

fn default_skills() -> Vec<SkillConfig> {
    vec![
        SkillConfig::new(SkillKind::DrivingLicense),
        SkillConfig::new(SkillKind::Language),
    ]
}

impl AuditConfig {
    /// Load config from TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read audit config: {:?}", path))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse audit config: {:?}", path))?;
        config
            .validate()
            .with_context(|| format!("Invalid audit config: {:?}", path))?;
        Ok(config)
    }

    /// Save config to TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check invariants serde cannot express
    pub fn validate(&self) -> Result<(), AuditError> {
        if self.data.id_column.trim().is_empty() {
            return Err(AuditError::InvalidConfig("data.id_column is empty".to_string()));
        }
        if self.data.text_column.trim().is_empty() {
            return Err(AuditError::InvalidConfig("data.text_column is empty".to_string()));
        }
        if !self.data.separator.is_ascii() {
            return Err(AuditError::InvalidConfig(format!(
                "data.separator must be a single ASCII character, got {:?}",
                self.data.separator
            )));
        }
        if self.data.min_label_len > self.data.max_label_len {
            return Err(AuditError::InvalidConfig(format!(
                "data.min_label_len ({}) exceeds data.max_label_len ({})",
                self.data.min_label_len, self.data.max_label_len
            )));
        }
        if self.data.length_buckets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AuditError::InvalidConfig(
                "data.length_buckets must be strictly increasing".to_string(),
            ));
        }
        for skill in &self.skills {
            if skill.kind == SkillKind::JobTitle && skill.vocabulary.is_none() {
                return Err(AuditError::InvalidConfig(format!(
                    "skill '{}' needs a vocabulary file",
                    skill.parser_type
                )));
            }
            if skill.parser_type.trim().is_empty() {
                return Err(AuditError::InvalidConfig(format!(
                    "skill '{}' has an empty parser_type",
                    skill.kind.name()
                )));
            }
        }
        Metric::parse_all(self.rates.metrics.as_slice())?;
        Ok(())
    }

    /// First configured skill of a given kind
    pub fn skill(&self, kind: SkillKind) -> Option<&SkillConfig> {
        self.skills.iter().find(|s| s.kind == kind)
    }
}

/// Column names and cleaning thresholds for the input tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Field separator of every CSV table
    #[serde(default = "default_separator")]
    pub separator: char,

    /// Candidate identifier column (all tables)
    #[serde(default = "default_id_column")]
    pub id_column: String,

    /// CV text column in the candidates table
    #[serde(default = "default_text_column")]
    pub text_column: String,

    /// Demographic columns copied onto every evidence row
    #[serde(default = "default_demographic_columns")]
    pub demographic_columns: Vec<String>,

    /// Skill type column in the parser table
    #[serde(default = "default_skill_type_column")]
    pub skill_type_column: String,

    /// Skill label column in the parser table
    #[serde(default = "default_skill_label_column")]
    pub skill_label_column: String,

    /// Upper bounds (exclusive) of the derived `length` attribute buckets
    #[serde(default = "default_length_buckets")]
    pub length_buckets: Vec<usize>,

    /// Parser labels shorter than this are treated as null
    #[serde(default = "default_min_label_len")]
    pub min_label_len: usize,

    /// Parser labels longer than this are treated as null
    #[serde(default = "default_max_label_len")]
    pub max_label_len: usize,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            id_column: default_id_column(),
            text_column: default_text_column(),
            demographic_columns: default_demographic_columns(),
            skill_type_column: default_skill_type_column(),
            skill_label_column: default_skill_label_column(),
            length_buckets: default_length_buckets(),
            min_label_len: default_min_label_len(),
            max_label_len: default_max_label_len(),
        }
    }
}

impl DataConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_text_column(mut self, column: impl Into<String>) -> Self {
        self.text_column = column.into();
        self
    }

    pub fn with_demographic_columns(mut self, columns: Vec<&str>) -> Self {
        self.demographic_columns = columns.into_iter().map(String::from).collect();
        self
    }

    pub fn with_length_buckets(mut self, buckets: Vec<usize>) -> Self {
        self.length_buckets = buckets;
        self
    }

    /// Separator as the single byte the CSV reader expects
    pub fn delimiter(&self) -> u8 {
        if self.separator.is_ascii() {
            self.separator as u8
        } else {
            b';'
        }
    }
}

fn default_separator() -> char { ';' }
fn default_id_column() -> String { "CANDIDATE_ID".to_string() }
fn default_text_column() -> String { "Translated_CV".to_string() }
fn default_demographic_columns() -> Vec<String> {
    vec!["Gender".to_string(), "Location".to_string(), "Age_bucket".to_string()]
}
fn default_skill_type_column() -> String { "Skill_Type".to_string() }
fn default_skill_label_column() -> String { "Skill".to_string() }
fn default_length_buckets() -> Vec<usize> { vec![300, 1000, 3000] }
fn default_min_label_len() -> usize { 1 }
fn default_max_label_len() -> usize { 100 }
fn default_vocabulary_column() -> String { "preferredLabel".to_string() }

/// One skill comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillConfig {
    /// Which built-in extractor/normalizer pair to use
    pub kind: SkillKind,

    /// Value of the parser's skill type column for this skill
    pub parser_type: String,

    /// Restrict the result to these canonical labels (e.g. ["en"])
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub only_labels: Vec<String>,

    /// Occupations CSV for job titles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<PathBuf>,

    /// Column of the occupations CSV holding the titles
    #[serde(default = "default_vocabulary_column")]
    pub vocabulary_column: String,

    /// Additional language variants: ISO code → names
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_variants: BTreeMap<String, Vec<String>>,
}

impl SkillConfig {
    pub fn new(kind: SkillKind) -> Self {
        Self {
            kind,
            parser_type: kind.default_parser_type().to_string(),
            only_labels: vec![],
            vocabulary: None,
            vocabulary_column: default_vocabulary_column(),
            extra_variants: BTreeMap::new(),
        }
    }
}

/// Group error-rate settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatesConfig {
    /// Demographic columns to disaggregate by (empty = overall rates only)
    #[serde(default)]
    pub group_columns: Vec<String>,

    /// Extra confusion metrics per group
    #[serde(default)]
    pub metrics: Vec<String>,

    /// Denominator of fp_rate / fn_rate
    #[serde(default)]
    pub denominator: RateDenominator,

    /// Group used as the baseline for disparate impact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_group: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_kind_from_str() {
        assert_eq!(SkillKind::from_str("driving-license"), Some(SkillKind::DrivingLicense));
        assert_eq!(SkillKind::from_str("DRIVERSLIC"), Some(SkillKind::DrivingLicense));
        assert_eq!(SkillKind::from_str("Language_Skill"), Some(SkillKind::Language));
        assert_eq!(SkillKind::from_str("job"), Some(SkillKind::JobTitle));
        assert_eq!(SkillKind::from_str("hobby"), None);
    }

    #[test]
    fn test_denominator_from_str() {
        assert_eq!(RateDenominator::from_str("observed"), Some(RateDenominator::Decisions));
        assert_eq!(RateDenominator::from_str("Population"), Some(RateDenominator::Population));
        assert_eq!(RateDenominator::from_str("median"), None);
        assert_eq!(RateDenominator::default(), RateDenominator::Decisions);
    }

    #[test]
    fn test_audit_config_default() {
        let config = AuditConfig::default();
        assert_eq!(config.data.separator, ';');
        assert_eq!(config.skills.len(), 2);
        assert!(config.validate().is_ok());
        assert_eq!(config.skill(SkillKind::DrivingLicense).unwrap().parser_type, "DRIVERSLIC");
    }

    #[test]
    fn test_audit_config_toml() {
        let toml_str = r#"
[data]
text_column = "cleaned_cv"
demographic_columns = ["Gender"]

[filter]
Gender = ["Male", "Female"]

[[skills]]
kind = "driving_license"
parser_type = "DRIVERSLIC"

[[skills]]
kind = "language"
parser_type = "Language_Skill"
only_labels = ["en"]

[skills.extra_variants]
it = ["lingua italiana"]

[[skills]]
kind = "job_title"
parser_type = "Job_title"
vocabulary = "data/occupations_en.csv"

[rates]
group_columns = ["Gender"]
metrics = ["precision", "equality_of_opportunity"]
denominator = "population"
reference_group = "Male"
"#;
        let config: AuditConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.data.text_column, "cleaned_cv");
        assert_eq!(config.data.id_column, "CANDIDATE_ID");
        assert_eq!(config.filter["Gender"], vec!["Male", "Female"]);
        assert_eq!(config.skills.len(), 3);
        assert_eq!(config.skills[1].only_labels, vec!["en"]);
        assert_eq!(config.skills[1].extra_variants["it"], vec!["lingua italiana"]);
        assert_eq!(config.skills[2].vocabulary_column, "preferredLabel");
        assert_eq!(config.rates.denominator, RateDenominator::Population);
        assert_eq!(config.rates.reference_group.as_deref(), Some("Male"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_metric() {
        let mut config = AuditConfig::default();
        config.rates.metrics = vec!["recall".to_string(), "auc".to_string()];
        assert_eq!(config.validate(), Err(AuditError::UnknownMetric("auc".to_string())));
    }

    #[test]
    fn test_validate_rejects_job_title_without_vocabulary() {
        let mut config = AuditConfig::default();
        config.skills.push(SkillConfig::new(SkillKind::JobTitle));
        assert!(matches!(config.validate(), Err(AuditError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_bad_label_bounds() {
        let mut config = AuditConfig::default();
        config.data.min_label_len = 10;
        config.data.max_label_len = 5;
        assert!(matches!(config.validate(), Err(AuditError::InvalidConfig(_))));
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("audit-{}.toml", std::process::id()));
        let mut config = AuditConfig::default();
        config.rates.group_columns = vec!["Gender".to_string()];
        config.save(&path).unwrap();
        let loaded = AuditConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.rates.group_columns, vec!["Gender"]);
        assert_eq!(loaded.skills.len(), 2);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = AuditConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: AuditConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.skills.len(), config.skills.len());
        assert_eq!(back.data.length_buckets, config.data.length_buckets);
    }
}
