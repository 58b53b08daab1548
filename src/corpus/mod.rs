//! Candidate corpus loading
//!
//! Loads the CV table, the optional demographics table and the parser's skill
//! records from `;`-separated CSV files.
//!
//! ```rust,ignore
//! use corpus::{load_candidates, load_skills};
//! use crate::config::DataConfig;
//!
//! let cfg = DataConfig::new().with_text_column("cleaned_cv");
//! let candidates = load_candidates(&path, &cfg)?;
//! let skills = load_skills(&skills_path, &cfg)?;
//! ```

pub mod loader;

pub use loader::{
    CandidateRecord, LoadedSkills, SkillRecord, LENGTH_ATTRIBUTE,
    apply_filter, clean_text, join_demographics,
    load_candidates, load_demographics, load_skills, load_vocabulary,
    read_candidates, read_demographics, read_skills, read_vocabulary,
};
