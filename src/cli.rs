//! CLI interface for the resume ranker

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-ranker")]
#[command(about = "Offline resume screening and ranking against a job description")]
#[command(long_about = "Extract structured profiles from resumes (PDF, TXT, MD), drop irrelevant ones and rank the rest by a blend of semantic similarity, experience and skill overlap")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank resumes against a job description
    Rank {
        /// Path to job description file (PDF, TXT, MD)
        #[arg(short, long, required_unless_present = "job_text", conflicts_with = "job_text")]
        job: Option<PathBuf>,

        /// Job description given inline
        #[arg(long)]
        job_text: Option<String>,

        /// Resume files or directories containing them
        #[arg(required = true)]
        resumes: Vec<PathBuf>,

        /// Output format: console, json, markdown, csv
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Only show the best N candidates
        #[arg(short = 'n', long)]
        top: Option<usize>,

        /// Number of resumes processed in parallel
        #[arg(short, long)]
        workers: Option<usize>,

        /// Per-resume timeout in seconds (0 disables it)
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Only match skills on word boundaries ("java" no longer matches "javascript")
        #[arg(long)]
        word_boundary_skills: bool,

        /// List omitted resumes and why they were dropped
        #[arg(long)]
        show_omitted: bool,

        /// Disable colored console output
        #[arg(long)]
        no_color: bool,
    },

    /// Extract the structured profile of a single resume
    Extract {
        /// Path to resume file (PDF, TXT, MD)
        file: PathBuf,

        /// Print the normalized text instead of the profile
        #[arg(long)]
        normalized: bool,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        "csv" => Ok(OutputFormat::Csv),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown, csv",
            format
        )),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
