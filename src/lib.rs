//! Resume ranker library
//!
//! Normalizes resume text, extracts a structured profile from it and ranks
//! a batch of resumes against one job description. Everything runs offline.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{RankerError, Result};
pub use processing::profile_extractor::{ExperienceLevel, ExtractedProfile, ProfileExtractor};
pub use processing::ranker::{BatchReport, RankedResult, Ranker, RankingOptions};
pub use processing::text_processor::TextNormalizer;
