//! CV Parser Bias Audit CLI
//!
//! Compares a CV parser's extracted skills against rule-based extraction and
//! breaks the disagreements down by demographic group.
//!
//! ## Quick Start
//!
//! ```bash
//! # Audit driving licences and languages with the default config
//! ./cv-bias-audit run \
//!     --candidates ./data/cvs.csv \
//!     --skills ./data/parser_skills.csv
//!
//! # Join demographics, group by gender and compare against men
//! ./cv-bias-audit run \
//!     --candidates ./data/cvs.csv \
//!     --skills ./data/parser_skills.csv \
//!     --demographics ./data/demographics.csv \
//!     --group-by Gender,length \
//!     --reference Male
//!
//! # Try one extractor on a piece of text
//! ./cv-bias-audit test language --text "Native speaker of Italian, English B2"
//! ```
//!
//! ## Configuration
//!
//! Column names, skill types and rate settings live in `audit.toml`.
//! Command-line flags override the file.

mod config;
mod corpus;
mod error;
mod evaluation;
mod extractors;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use config::{AuditConfig, RateDenominator, SkillConfig, SkillKind};
use corpus::{apply_filter, join_demographics, load_candidates, load_demographics, load_skills};
use error::AuditError;
use evaluation::{
    candidate_coverage, compare, error_rates_by_group, highlight_snippets, AuditReport,
    EvidenceRow, GroupRateOptions, Metric,
};
use extractors::{driving_license, LabelSet};

const SAMPLE_CV: &str = "Warehouse operative, 2015-2021. Driving licence B, own car. \
                         Languages: English (C1), native speaker of Italian, basic German.";

/// Skill kind for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SkillKindArg {
    /// Driving licence mentions
    DrivingLicense,
    /// Language skills (ISO 639-1 codes)
    Language,
    /// Job titles from an occupations vocabulary
    JobTitle,
}

impl From<SkillKindArg> for SkillKind {
    fn from(arg: SkillKindArg) -> Self {
        match arg {
            SkillKindArg::DrivingLicense => SkillKind::DrivingLicense,
            SkillKindArg::Language => SkillKind::Language,
            SkillKindArg::JobTitle => SkillKind::JobTitle,
        }
    }
}

/// Rate denominator for CLI
#[derive(Debug, Clone, Copy, ValueEnum)]
enum DenominatorArg {
    /// tp + fp + fn + tn of the group
    Decisions,
    /// Candidates in the group
    Population,
}

impl From<DenominatorArg> for RateDenominator {
    fn from(arg: DenominatorArg) -> Self {
        match arg {
            DenominatorArg::Decisions => RateDenominator::Decisions,
            DenominatorArg::Population => RateDenominator::Population,
        }
    }
}

#[derive(Parser)]
#[command(name = "cv-bias-audit")]
#[command(about = "Audit a CV parser's skill extraction for demographic bias")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every configured skill comparison
    ///
    /// Prints a report per skill and saves all reports to a JSON file.
    Run {
        /// Candidates CSV (id, CV text, optional demographic columns)
        #[arg(short, long)]
        candidates: PathBuf,

        /// Parser skills CSV (id, skill type, skill label)
        #[arg(short, long)]
        skills: PathBuf,

        /// Demographics CSV, inner-joined on the candidate id
        #[arg(short, long)]
        demographics: Option<PathBuf>,

        /// Audit config file (TOML)
        #[arg(long, default_value = "audit.toml")]
        config: PathBuf,

        /// Output file for results (JSON)
        #[arg(short, long, default_value = "results/audit.json")]
        output: PathBuf,

        /// Only audit these skill kinds (comma-separated)
        #[arg(short = 'k', long = "skill", value_enum, value_delimiter = ',')]
        skill_kinds: Option<Vec<SkillKindArg>>,

        /// Demographic columns to group by (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        group_by: Option<Vec<String>>,

        /// Extra per-group metrics (comma-separated, e.g. "precision,recall")
        #[arg(short, long, value_delimiter = ',')]
        metrics: Option<Vec<String>>,

        /// Reference group for disparate impact
        #[arg(short, long)]
        reference: Option<String>,

        /// Denominator of group FP/FN rates
        #[arg(long, value_enum)]
        denominator: Option<DenominatorArg>,

        /// Include every evidence row in the JSON output
        #[arg(long)]
        evidence: bool,
    },

    /// Validate an audit config file
    ValidateConfig {
        /// Path to the config file (TOML)
        #[arg(long, default_value = "audit.toml")]
        config: PathBuf,
    },

    /// List skill kinds, metrics and rate denominators
    List,

    /// Run one extractor and normalizer on sample input
    Test {
        /// Skill kind (e.g. "driving-license", "language", "job-title")
        kind: String,

        /// Text to extract from (defaults to a sample CV)
        #[arg(short, long)]
        text: Option<String>,

        /// Parser label to normalize
        #[arg(short, long)]
        label: Option<String>,

        /// Audit config file (for vocabularies and extra variants)
        #[arg(long, default_value = "audit.toml")]
        config: PathBuf,
    },

    /// Show what the extractors see in one CV
    Inspect {
        /// Candidates CSV
        #[arg(short, long)]
        candidates: PathBuf,

        /// Candidate id
        #[arg(short, long)]
        id: String,

        /// Audit config file (TOML)
        #[arg(long, default_value = "audit.toml")]
        config: PathBuf,

        /// Characters of context around each highlighted match
        #[arg(long, default_value = "40")]
        context: usize,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            candidates,
            skills,
            demographics,
            config,
            output,
            skill_kinds,
            group_by,
            metrics,
            reference,
            denominator,
            evidence,
        } => {
            let mut audit_config = load_config(&config)?;
            apply_overrides(
                &mut audit_config,
                skill_kinds,
                group_by,
                metrics,
                reference,
                denominator,
            );
            audit_config.validate()?;
            run_audit(
                &candidates,
                &skills,
                demographics.as_deref(),
                &output,
                &audit_config,
                evidence,
            )?;
        }

        Commands::ValidateConfig { config } => {
            validate_config(&config)?;
        }

        Commands::List => {
            list_kinds();
        }

        Commands::Test {
            kind,
            text,
            label,
            config,
        } => {
            test_single_kind(&kind, text.as_deref(), label.as_deref(), &config)?;
        }

        Commands::Inspect {
            candidates,
            id,
            config,
            context,
        } => {
            inspect_candidate(&candidates, &id, &config, context)?;
        }
    }

    Ok(())
}

/// Config file if present, defaults otherwise
fn load_config(path: &Path) -> Result<AuditConfig> {
    if path.exists() {
        eprintln!("Loading audit config from {:?}...", path);
        AuditConfig::load(path)
    } else {
        eprintln!("Using default audit config...");
        Ok(AuditConfig::default())
    }
}

fn apply_overrides(
    config: &mut AuditConfig,
    skill_kinds: Option<Vec<SkillKindArg>>,
    group_by: Option<Vec<String>>,
    metrics: Option<Vec<String>>,
    reference: Option<String>,
    denominator: Option<DenominatorArg>,
) {
    if let Some(kinds) = skill_kinds {
        let kinds: BTreeSet<SkillKind> = kinds.into_iter().map(SkillKind::from).collect();
        config.skills.retain(|s| kinds.contains(&s.kind));
        for kind in kinds {
            if config.skill(kind).is_none() {
                config.skills.push(SkillConfig::new(kind));
            }
        }
    }
    if let Some(columns) = group_by {
        config.rates.group_columns = columns;
    }
    if let Some(metrics) = metrics {
        config.rates.metrics = metrics;
    }
    if reference.is_some() {
        config.rates.reference_group = reference;
    }
    if let Some(denominator) = denominator {
        config.rates.denominator = denominator.into();
    }
}

/// One audited skill in the JSON output
#[derive(Debug, Clone, serde::Serialize)]
struct SkillOutput {
    kind: String,
    report: AuditReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    evidence: Option<Vec<EvidenceRow>>,
}

/// Run all configured skill comparisons
fn run_audit(
    candidates_path: &Path,
    skills_path: &Path,
    demographics_path: Option<&Path>,
    output: &Path,
    config: &AuditConfig,
    with_evidence: bool,
) -> Result<()> {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              CV PARSER BIAS AUDIT                            ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    if config.skills.is_empty() {
        anyhow::bail!("No skills configured. Add [[skills]] to audit.toml");
    }

    // Load tables - use eprintln for progress (line-buffered even when piped)
    eprintln!("Loading candidates from {:?}...", candidates_path);
    let mut candidates = load_candidates(candidates_path, &config.data)?;

    if let Some(path) = demographics_path {
        eprintln!("Joining demographics from {:?}...", path);
        let demographics = load_demographics(path, &config.data)?;
        candidates = join_demographics(candidates, &demographics);
    }
    let candidates = apply_filter(candidates, &config.filter);
    eprintln!("  Population: {} candidates", candidates.len());

    eprintln!("Loading parser skills from {:?}...", skills_path);
    let parser_skills = load_skills(skills_path, &config.data)?;
    eprintln!(
        "  {} records ({} unusable labels)",
        parser_skills.records.len(),
        parser_skills.nulled_labels
    );

    let options = GroupRateOptions {
        denominator: config.rates.denominator,
        reference_group: config.rates.reference_group.clone(),
    };

    let mut outputs = Vec::new();
    for skill in &config.skills {
        let plugin = extractors::build(skill)
            .with_context(|| format!("Failed to build extractor for '{}'", skill.parser_type))?;

        let mut result = compare(
            &candidates,
            &parser_skills.records,
            &skill.parser_type,
            plugin.extractor.as_ref(),
            plugin.normalizer.as_ref(),
        );
        if !skill.only_labels.is_empty() {
            let labels: LabelSet = skill.only_labels.iter().map(|l| l.to_lowercase()).collect();
            result = result.restrict_to(&labels, &candidates);
        }
        let coverage = candidate_coverage(
            &candidates,
            &parser_skills.records,
            &skill.parser_type,
            plugin.extractor.as_ref(),
        );

        let mut report = AuditReport::new(&result, candidates.len())
            .with_labels(skill.only_labels.clone())
            .with_coverage(coverage);
        for column in &config.rates.group_columns {
            let table =
                error_rates_by_group(&result, &candidates, column, config.rates.metrics.as_slice(), &options)?;
            report = report.with_group_table(table);
        }

        println!("┌─ {} ({}) ─────────────────────────────────────────", skill.parser_type, skill.kind.name());
        if !skill.only_labels.is_empty() {
            println!("  Labels: {}", skill.only_labels.join(", "));
        }
        println!("{}", report.format_summary());
        if let Some(coverage) = &report.coverage {
            println!("{}\n", coverage.format_summary());
        }

        let evidence = with_evidence.then(|| result.all_rows().cloned().collect());
        outputs.push(SkillOutput {
            kind: skill.kind.name().to_string(),
            report,
            evidence,
        });
    }

    // Save results
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    #[derive(serde::Serialize)]
    struct AuditOutput<'a> {
        timestamp: String,
        candidates: String,
        skills: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        demographics: Option<String>,
        population: usize,
        config: &'a AuditConfig,
        results: Vec<SkillOutput>,
    }

    let output_data = AuditOutput {
        timestamp: chrono::Utc::now().to_rfc3339(),
        candidates: candidates_path.to_string_lossy().to_string(),
        skills: skills_path.to_string_lossy().to_string(),
        demographics: demographics_path.map(|p| p.to_string_lossy().to_string()),
        population: candidates.len(),
        config,
        results: outputs,
    };

    let json = serde_json::to_string_pretty(&output_data)?;
    std::fs::write(output, &json)
        .with_context(|| format!("Failed to write results: {:?}", output))?;
    println!("Results saved to {:?}", output);

    Ok(())
}

/// Validate an audit config file
fn validate_config(path: &Path) -> Result<()> {
    println!("Validating {:?}...", path);

    let config = AuditConfig::load(path)?;

    println!("✓ Valid audit config");
    println!(
        "  Data: separator '{}', id '{}', text '{}'",
        config.data.separator, config.data.id_column, config.data.text_column
    );
    println!("  Demographics: {}", config.data.demographic_columns.join(", "));
    println!("  Skills: {}", config.skills.len());
    for skill in &config.skills {
        println!("    {:16} parser type '{}'", skill.kind.name(), skill.parser_type);
    }
    if !config.filter.is_empty() {
        println!("  Filter:");
        for (column, values) in &config.filter {
            println!("    {} in [{}]", column, values.join(", "));
        }
    }
    println!(
        "  Rates: group by [{}], denominator {}",
        config.rates.group_columns.join(", "),
        config.rates.denominator.name()
    );

    Ok(())
}

fn list_kinds() {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              AVAILABLE SKILL KINDS AND METRICS               ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("SKILL KINDS:");
    println!("─────────────────────────────────────────────────────────────────");
    for kind in SkillKind::ALL {
        println!(
            "  {:16} {:16} {}",
            kind.name(),
            kind.default_parser_type(),
            kind.description()
        );
    }

    println!("\nMETRICS:");
    println!("─────────────────────────────────────────────────────────────────");
    for metric in Metric::ALL {
        println!("  {:20} {}", metric.name(), metric.description());
    }

    println!("\nRATE DENOMINATORS:");
    println!("─────────────────────────────────────────────────────────────────");
    for denominator in [RateDenominator::Decisions, RateDenominator::Population] {
        println!("  {:12} {}", denominator.name(), denominator.description());
    }
}

fn test_single_kind(kind: &str, text: Option<&str>, label: Option<&str>, config_path: &Path) -> Result<()> {
    let kind = SkillKind::from_str(kind).ok_or_else(|| AuditError::UnknownSkillKind(kind.to_string()))?;
    let config = load_config(config_path)?;
    let skill = config
        .skill(kind)
        .cloned()
        .unwrap_or_else(|| SkillConfig::new(kind));

    println!("Testing skill kind: {} ({})\n", kind.name(), kind.description());
    let plugin = extractors::build(&skill)?;

    let text = text.unwrap_or(SAMPLE_CV);
    let labels = plugin.extractor.extract(text);
    println!("Text: {}", text);
    if labels.is_empty() {
        println!("Extracted: (nothing)");
    } else {
        println!("Extracted: {}", labels.into_iter().collect::<Vec<_>>().join(", "));
    }

    if let Some(label) = label {
        let normalized = plugin.normalizer.normalize(Some(label));
        if normalized.is_empty() {
            println!("Normalized '{}': (unrecognized)", label);
        } else {
            println!("Normalized '{}': {}", label, normalized.label);
        }
        if let Some(raw) = normalized.unmatched {
            println!("  ⚠ '{}' is outside the known vocabulary", raw);
        }
    }

    Ok(())
}

fn inspect_candidate(candidates_path: &Path, id: &str, config_path: &Path, context: usize) -> Result<()> {
    let config = load_config(config_path)?;
    let candidates = load_candidates(candidates_path, &config.data)?;
    let candidate = candidates
        .iter()
        .find(|c| c.id == id)
        .with_context(|| format!("Candidate '{}' not found in {:?}", id, candidates_path))?;

    println!("\nCANDIDATE ID: {}", candidate.id);
    for (key, value) in &candidate.attributes {
        println!("  {}: {}", key, value);
    }
    println!("{}", "-".repeat(80));

    let snippets = highlight_snippets(&candidate.text, driving_license::pattern(), context);
    if snippets.is_empty() {
        println!("Driving licence: No occurrence found.");
    } else {
        println!("Driving licence:");
        for snippet in snippets {
            println!("  ...{}...", snippet);
        }
    }

    for skill in &config.skills {
        match extractors::build(skill) {
            Ok(plugin) => {
                let labels = plugin.extractor.extract(&candidate.text);
                println!(
                    "{:16} {}",
                    skill.kind.name(),
                    labels.into_iter().collect::<Vec<_>>().join(", ")
                );
            }
            Err(e) => eprintln!("  {}: {}", skill.kind.name(), e),
        }
    }

    Ok(())
}
