//! CV parser bias audit library
//!
//! Compares a CV parser's extracted skills against rule-based extraction and
//! reports how its errors are distributed across demographic groups.

pub mod config;
pub mod corpus;
pub mod error;
pub mod evaluation;
pub mod extractors;
