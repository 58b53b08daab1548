//! Skill extractors and label normalizers
//!
//! One extractor/normalizer pair per [`SkillKind`]:
//! - driving licence (regex over the CV text)
//! - languages (one matcher per ISO 639-1 code)
//! - job titles (phrase matcher over an occupations vocabulary)

pub mod driving_license;
pub mod job_titles;
mod language_names;
pub mod languages;
pub mod traits;

use anyhow::{Context, Result};

use crate::config::{SkillConfig, SkillKind};
use crate::corpus::load_vocabulary;

pub use driving_license::{DrivingLicenseExtractor, DrivingLicenseNormalizer, DRIVER_LICENSE};
pub use job_titles::{clean_titles, JobTitleExtractor, JobTitleNormalizer};
pub use languages::{builtin_table, merge_variants, LanguageExtractor, LanguageNormalizer, LanguageTable};
pub use traits::{LabelNormalizer, LabelSet, LowercaseNormalizer, Normalized, SkillExtractor, SkillPlugin};

/// Build the plug-in for a configured skill
///
/// Job titles read their vocabulary from `skill.vocabulary`.
pub fn build(skill: &SkillConfig) -> Result<SkillPlugin> {
    match skill.kind {
        SkillKind::DrivingLicense => Ok(driving_license_plugin()),
        SkillKind::Language => {
            let mut table = builtin_table();
            merge_variants(&mut table, &skill.extra_variants);
            language_plugin(&table)
        }
        SkillKind::JobTitle => {
            let path = skill
                .vocabulary
                .as_deref()
                .with_context(|| format!("skill '{}' has no vocabulary file", skill.parser_type))?;
            let titles = load_vocabulary(path, &skill.vocabulary_column)?;
            job_title_plugin(titles)
        }
    }
}

pub fn driving_license_plugin() -> SkillPlugin {
    SkillPlugin::new(DrivingLicenseExtractor, DrivingLicenseNormalizer)
}

pub fn language_plugin(table: &LanguageTable) -> Result<SkillPlugin> {
    let extractor = LanguageExtractor::from_table(table).context("Failed to compile language matchers")?;
    Ok(SkillPlugin::new(extractor, LanguageNormalizer::from_table(table)))
}

pub fn job_title_plugin<I, S>(titles: I) -> Result<SkillPlugin>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let extractor = JobTitleExtractor::from_vocabulary(clean_titles(titles))
        .context("Failed to compile job-title matcher")?;
    tracing::info!("Job-title vocabulary: {} titles", extractor.vocabulary().len());
    let normalizer = JobTitleNormalizer::new(extractor.vocabulary().clone());
    Ok(SkillPlugin::new(extractor, normalizer))
}
