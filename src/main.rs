//! Resume ranker: offline resume screening against a job description

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use resume_ranker::cli::{self, Cli, Commands, ConfigAction};
use resume_ranker::config::{Config, SkillMatchMode};
use resume_ranker::error::{RankerError, Result};
use resume_ranker::input::{collect_documents, FileTextSource, TextSource};
use resume_ranker::output::{save_report_to_file, suggest_filename, ReportGenerator};
use resume_ranker::processing::contacts::{ContactExtractor, RegexContactExtractor};
use resume_ranker::processing::ranker::{DocumentOutcome, ProgressCallback, Ranker};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tokio::sync::watch;

const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "txt", "md", "markdown"];

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Load configuration
    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, cli.config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, mut config: Config, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Rank {
            job,
            job_text,
            resumes,
            output,
            save,
            top,
            workers,
            timeout_secs,
            word_boundary_skills,
            show_omitted,
            no_color,
        } => {
            // Command-line flags win over the config file
            if let Some(format) = &output {
                config.output.format =
                    cli::parse_output_format(format).map_err(RankerError::InvalidInput)?;
            }
            if let Some(workers) = workers {
                config.processing.max_concurrency = workers.max(1);
            }
            if let Some(secs) = timeout_secs {
                config.processing.document_timeout_secs = secs;
            }
            if word_boundary_skills {
                config.skills.match_mode = SkillMatchMode::WordBoundary;
            }
            if show_omitted {
                config.output.show_omitted = true;
            }
            if no_color {
                config.output.color_output = false;
            }

            let job_description = match (job, job_text) {
                (Some(path), _) => read_job_description(&path)?,
                (None, Some(text)) => text,
                (None, None) => {
                    return Err(RankerError::InvalidInput(
                        "A job description is required (--job or --job-text)".to_string(),
                    ))
                }
            };

            let documents = collect_documents(&resumes)?;
            if documents.is_empty() {
                warn!("No resumes found in the given inputs");
            }
            info!("Ranking {} resumes", documents.len());

            let ranker = Arc::new(Ranker::from_config(&config)?);

            let (cancel_tx, cancel_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted; finishing with the resumes processed so far");
                    let _ = cancel_tx.send(true);
                }
            });

            let progress = ProgressBar::new(documents.len() as u64);
            progress.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .map_err(|e| RankerError::OutputFormatting(e.to_string()))?
                    .progress_chars("#>-"),
            );

            let bar = progress.clone();
            let on_progress: ProgressCallback = Arc::new(move |path: &Path, outcome: &DocumentOutcome| {
                if let Some(name) = path.file_name() {
                    bar.set_message(name.to_string_lossy().to_string());
                }
                if let DocumentOutcome::Omitted(reason) = outcome {
                    bar.println(format!("skipped {}: {}", path.display(), reason));
                }
                bar.inc(1);
            });

            let mut report = ranker
                .rank_concurrent(documents, &job_description, Some(cancel_rx), Some(on_progress))
                .await?;
            progress.finish_and_clear();

            if let Some(n) = top {
                report.results.truncate(n);
            }

            let generator = ReportGenerator::with_options(
                config.output.color_output && save.is_none(),
                config.output.show_omitted,
                true,
                true,
            );
            let rendered = generator.generate_report(&report, &config.output.format)?;

            match save {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(suggest_filename(&config.output.format, true))
                    } else {
                        path
                    };
                    save_report_to_file(&rendered, &path)?;
                    println!("Report saved to {}", path.display());
                }
                None => println!("{}", rendered),
            }
        }

        Commands::Extract { file, normalized } => {
            let raw_text = FileTextSource::new().extract_text(&file)?;
            let ranker = Ranker::from_config(&config)?;

            if normalized {
                println!("{}", ranker.normalizer().clean_lines(&raw_text));
                return Ok(());
            }

            let cleaned = ranker.normalizer().clean(&raw_text);
            let contacts = RegexContactExtractor::new();
            let profile = ranker.profile(&raw_text);

            let value = serde_json::json!({
                "file_path": file.display().to_string(),
                "email": contacts.primary_email(&cleaned),
                "phone_numbers": contacts.phone_numbers(&cleaned),
                "profile": profile,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }

        Commands::Config { action } => {
            let path = config_path.unwrap_or_else(Config::config_path);

            match action {
                Some(ConfigAction::Show) | None => {
                    let content = toml::to_string_pretty(&config)
                        .map_err(|e| RankerError::Configuration(e.to_string()))?;
                    println!("# {}\n", path.display());
                    println!("{}", content);
                }

                Some(ConfigAction::Reset) => {
                    Config::default().save_to(&path)?;
                    println!("Configuration reset to defaults: {}", path.display());
                }

                Some(ConfigAction::Path) => {
                    println!("{}", path.display());
                }
            }
        }
    }

    Ok(())
}

fn read_job_description(path: &Path) -> Result<String> {
    cli::validate_file_extension(path, SUPPORTED_EXTENSIONS)
        .map_err(|e| RankerError::InvalidInput(format!("Job description file: {}", e)))?;

    FileTextSource::new().extract_text(path)
}
