//! Batch ranking of resumes against a job description.
//!
//! Each document runs OCR → normalize → extract → embed → score → explain on
//! its own. A document's failure, panic, timeout or cancellation only omits
//! that document; the batch result is whatever was included, stably sorted
//! by match score.

use crate::config::Config;
use crate::error::{RankerError, Result};
use crate::input::{FileTextSource, TextSource};
use crate::processing::annotation::HeuristicAnnotator;
use crate::processing::contacts::{ContactExtractor, RegexContactExtractor};
use crate::processing::embeddings::{Embedder, ScaledCosine, SimilarityMetric};
use crate::processing::profile_extractor::{
    round2, ExperienceLevel, ExtractedProfile, ProfileExtractor,
};
use crate::processing::scoring::{
    ExplanationInput, Explainer, Scorer, TemplateExplainer, WeightedScorer,
};
use crate::processing::taxonomy::Taxonomy;
use crate::processing::text_processor::TextNormalizer;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;

/// The external capabilities the ranker drives
#[derive(Clone)]
pub struct Collaborators {
    pub text_source: Arc<dyn TextSource>,
    pub contacts: Arc<dyn ContactExtractor>,
    pub embedder: Arc<dyn Embedder>,
    pub similarity: Arc<dyn SimilarityMetric>,
    pub scorer: Arc<dyn Scorer>,
    pub explainer: Arc<dyn Explainer>,
}

impl Collaborators {
    /// File-backed defaults configured from `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            text_source: Arc::new(FileTextSource::new()),
            contacts: Arc::new(RegexContactExtractor::new()),
            embedder: default_embedder(config)?,
            similarity: Arc::new(ScaledCosine),
            scorer: Arc::new(WeightedScorer::new(&config.scoring)),
            explainer: Arc::new(TemplateExplainer),
        })
    }
}

#[cfg(not(feature = "model2vec"))]
fn default_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    use crate::processing::embeddings::HashingEmbedder;
    Ok(Arc::new(HashingEmbedder::new(config.embedding.dimension)))
}

#[cfg(feature = "model2vec")]
fn default_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    use crate::processing::embeddings::Model2VecEmbedder;
    Ok(Arc::new(Model2VecEmbedder::from_pretrained(
        &config.embedding.model2vec_model,
    )?))
}

#[derive(Debug, Clone)]
pub struct RankingOptions {
    /// Similarity (0-10) below which a document is dropped
    pub relevance_floor: f32,
    /// Extract profiles from line-preserving text instead of the single-line form
    pub line_aware_extraction: bool,
    pub max_concurrency: usize,
    pub document_timeout: Option<Duration>,
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self {
            relevance_floor: 1.0,
            line_aware_extraction: false,
            max_concurrency: 4,
            document_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl RankingOptions {
    pub fn from_config(config: &Config) -> Self {
        let timeout_secs = config.processing.document_timeout_secs;
        Self {
            relevance_floor: config.scoring.relevance_floor,
            line_aware_extraction: config.processing.line_aware_extraction,
            max_concurrency: config.processing.max_concurrency.max(1),
            document_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub file_path: String,
    pub name: String,
    pub email: Option<String>,
    pub phone_numbers: Vec<String>,
    pub skills: Vec<String>,
    pub education: String,
    pub experience_years: f64,
    pub experience_level: ExperienceLevel,
    pub domain: String,
    pub certifications: Vec<String>,
    pub project_count: usize,
    /// 0-10
    pub semantic_similarity: f32,
    /// 0-1
    pub skill_overlap: f32,
    /// 0-10
    pub match_score: f32,
    pub explanation: String,
}

/// Why a document did not make it into the ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum OmissionReason {
    NoText,
    EmptyAfterNormalization,
    Irrelevant { similarity: f32 },
    Failed { message: String },
    TimedOut,
    Cancelled,
}

impl fmt::Display for OmissionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OmissionReason::NoText => write!(f, "no extractable text"),
            OmissionReason::EmptyAfterNormalization => write!(f, "empty after normalization"),
            OmissionReason::Irrelevant { similarity } => {
                write!(f, "irrelevant (similarity {:.2}/10)", similarity)
            }
            OmissionReason::Failed { message } => write!(f, "failed: {}", message),
            OmissionReason::TimedOut => write!(f, "timed out"),
            OmissionReason::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    Included(Box<RankedResult>),
    Omitted(OmissionReason),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OmittedDocument {
    pub file_path: String,
    #[serde(flatten)]
    pub reason: OmissionReason,
}

/// Full outcome of a batch: the ranking plus every omitted document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub results: Vec<RankedResult>,
    /// In input order
    pub omitted: Vec<OmittedDocument>,
    pub total_documents: usize,
    pub processing_time_ms: u64,
}

/// Called once per resolved document during concurrent ranking
pub type ProgressCallback = Arc<dyn Fn(&Path, &DocumentOutcome) + Send + Sync>;

/// Read-only job state shared by every document
struct JobContext {
    cleaned: String,
    vector: Vec<f32>,
    skills: HashSet<String>,
}

pub struct Ranker {
    normalizer: TextNormalizer,
    extractor: ProfileExtractor,
    collaborators: Collaborators,
    options: RankingOptions,
}

impl Ranker {
    pub fn new(
        extractor: ProfileExtractor,
        collaborators: Collaborators,
        options: RankingOptions,
    ) -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            extractor,
            collaborators,
            options,
        }
    }

    /// Ranker with the built-in collaborators
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let taxonomy = Arc::new(Taxonomy::with_skills_config(&config.skills)?);
        let extractor = ProfileExtractor::new(
            taxonomy,
            Arc::new(HeuristicAnnotator::new()),
            config.skills.match_mode,
        )?;

        let collaborators = Collaborators::from_config(config)?;
        debug!("Embedding documents with {}", collaborators.embedder.name());

        Ok(Self::new(
            extractor,
            collaborators,
            RankingOptions::from_config(config),
        ))
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub fn extractor(&self) -> &ProfileExtractor {
        &self.extractor
    }

    /// Profile of a raw document, using the configured extraction view
    pub fn profile(&self, raw_text: &str) -> ExtractedProfile {
        self.extract_profile(raw_text, &self.normalizer.clean(raw_text))
    }

    // Skills and experience always come from the single-line text; the line
    // view only feeds name and certification scanning.
    fn extract_profile(&self, raw_text: &str, cleaned: &str) -> ExtractedProfile {
        if self.options.line_aware_extraction {
            self.extractor
                .extract_with_line_view(cleaned, &self.normalizer.clean_lines(raw_text))
        } else {
            self.extractor.extract(cleaned)
        }
    }

    /// Rank documents sequentially; omitted documents are dropped silently
    pub fn rank<P: AsRef<Path>>(&self, paths: &[P], job_description: &str) -> Result<Vec<RankedResult>> {
        Ok(self.rank_detailed(paths, job_description)?.results)
    }

    /// Rank documents sequentially, keeping track of every omission
    pub fn rank_detailed<P: AsRef<Path>>(
        &self,
        paths: &[P],
        job_description: &str,
    ) -> Result<BatchReport> {
        let start_time = Instant::now();

        let Some(job) = self.prepare_job(job_description)? else {
            return Ok(BatchReport::default());
        };

        let outcomes: Vec<(PathBuf, DocumentOutcome)> = paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                (path.to_path_buf(), self.evaluate(path, &job))
            })
            .collect();

        Ok(finalize(outcomes, start_time))
    }

    /// Rank documents on a bounded worker pool.
    ///
    /// Documents still pending when `cancel` flips to `true` are recorded as
    /// cancelled; results already collected are kept.
    pub async fn rank_concurrent(
        self: &Arc<Self>,
        paths: Vec<PathBuf>,
        job_description: &str,
        cancel: Option<watch::Receiver<bool>>,
        on_progress: Option<ProgressCallback>,
    ) -> Result<BatchReport> {
        let start_time = Instant::now();

        let prepared = {
            let ranker = Arc::clone(self);
            let jd = job_description.to_string();
            tokio::task::spawn_blocking(move || ranker.prepare_job(&jd))
                .await
                .map_err(|e| RankerError::RankingFailed(format!("Job preparation failed: {}", e)))??
        };
        let Some(job) = prepared else {
            return Ok(BatchReport::default());
        };
        let job = Arc::new(job);

        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (index, path) in paths.iter().cloned().enumerate() {
            let ranker = Arc::clone(self);
            let job = Arc::clone(&job);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();

            tasks.spawn(async move {
                let outcome = ranker.supervise(path.clone(), job, semaphore, cancel).await;
                (index, path, outcome)
            });
        }

        let mut slots: Vec<Option<DocumentOutcome>> = vec![None; paths.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, path, outcome)) => {
                    if let Some(callback) = &on_progress {
                        callback(&path, &outcome);
                    }
                    slots[index] = Some(outcome);
                }
                Err(e) => warn!("Document task aborted: {}", e),
            }
        }

        let outcomes = paths
            .into_iter()
            .zip(slots)
            .map(|(path, outcome)| {
                let outcome = outcome.unwrap_or_else(|| {
                    DocumentOutcome::Omitted(OmissionReason::Failed {
                        message: "worker task aborted".to_string(),
                    })
                });
                (path, outcome)
            })
            .collect();

        Ok(finalize(outcomes, start_time))
    }

    /// One document under the worker pool, timeout and cancellation
    async fn supervise(
        self: Arc<Self>,
        path: PathBuf,
        job: Arc<JobContext>,
        semaphore: Arc<Semaphore>,
        mut cancel: Option<watch::Receiver<bool>>,
    ) -> DocumentOutcome {
        let _permit = tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => return DocumentOutcome::Omitted(OmissionReason::Cancelled),
            permit = semaphore.acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => {
                    return DocumentOutcome::Omitted(OmissionReason::Failed {
                        message: "worker pool closed".to_string(),
                    })
                }
            },
        };

        let timeout = self.options.document_timeout;
        let display_path = path.display().to_string();
        let ranker = Arc::clone(&self);
        let work = tokio::task::spawn_blocking(move || ranker.evaluate(&path, &job));

        let guarded = async {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, work).await.ok(),
                None => Some(work.await),
            }
        };

        tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => {
                warn!("Cancelled while processing {}", display_path);
                DocumentOutcome::Omitted(OmissionReason::Cancelled)
            }
            finished = guarded => match finished {
                Some(Ok(outcome)) => outcome,
                Some(Err(e)) => {
                    warn!("[Resume skipped] {}: worker failed: {}", display_path, e);
                    DocumentOutcome::Omitted(OmissionReason::Failed { message: e.to_string() })
                }
                None => {
                    warn!("[Resume skipped] {}: timed out after {:?}", display_path, timeout);
                    DocumentOutcome::Omitted(OmissionReason::TimedOut)
                }
            },
        }
    }

    fn prepare_job(&self, job_description: &str) -> Result<Option<JobContext>> {
        let cleaned = self.normalizer.clean(job_description);
        if cleaned.is_empty() {
            info!("Empty job description; nothing to rank against");
            return Ok(None);
        }

        let vector = self.collaborators.embedder.embed(&cleaned)?;
        let profile = self.profile(job_description);
        let skills = profile.skill_set();
        debug!("Job description requires {} known skills", skills.len());

        Ok(Some(JobContext {
            cleaned,
            vector,
            skills,
        }))
    }

    /// Fault-isolated run of one document: errors and panics become omissions
    fn evaluate(&self, path: &Path, job: &JobContext) -> DocumentOutcome {
        let run = panic::catch_unwind(AssertUnwindSafe(|| self.process_document(path, job)));

        let outcome = match run {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                warn!("[Resume skipped] {}: {}", path.display(), e);
                DocumentOutcome::Omitted(OmissionReason::Failed { message: e.to_string() })
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!("[Resume skipped] {}: panicked: {}", path.display(), message);
                DocumentOutcome::Omitted(OmissionReason::Failed { message })
            }
        };

        if let DocumentOutcome::Omitted(reason) = &outcome {
            debug!("Omitted {}: {}", path.display(), reason);
        }
        outcome
    }

    fn process_document(&self, path: &Path, job: &JobContext) -> Result<DocumentOutcome> {
        let raw_text = self.collaborators.text_source.extract_text(path)?;
        if raw_text.trim().is_empty() {
            return Ok(DocumentOutcome::Omitted(OmissionReason::NoText));
        }

        let cleaned = self.normalizer.clean(&raw_text);
        if cleaned.is_empty() {
            return Ok(DocumentOutcome::Omitted(OmissionReason::EmptyAfterNormalization));
        }

        let email = self.collaborators.contacts.primary_email(&cleaned);
        let phone_numbers = self.collaborators.contacts.phone_numbers(&cleaned);

        let profile = self.extract_profile(&raw_text, &cleaned);

        let vector = self.collaborators.embedder.embed(&cleaned)?;
        let similarity = self.collaborators.similarity.similarity(&vector, &job.vector)?;

        if similarity < self.options.relevance_floor {
            return Ok(DocumentOutcome::Omitted(OmissionReason::Irrelevant { similarity }));
        }

        let skill_overlap = skill_overlap(&job.skills, &profile.skill_set());

        let match_score = self.collaborators.scorer.score(
            similarity / 10.0,
            profile.experience_years,
            skill_overlap,
        );

        let explanation = self.collaborators.explainer.explain(&ExplanationInput {
            job_description: &job.cleaned,
            skills: &profile.skills,
            experience_years: profile.experience_years,
            match_score,
            semantic_similarity: similarity,
            skill_overlap,
        });

        Ok(DocumentOutcome::Included(Box::new(RankedResult {
            file_path: path.display().to_string(),
            name: profile.name,
            email,
            phone_numbers,
            skills: profile.skills,
            education: profile.education,
            experience_years: round2(profile.experience_years),
            experience_level: profile.experience_level,
            domain: profile.domain,
            certifications: profile.certifications,
            project_count: profile.project_count,
            semantic_similarity: round2_f32(similarity),
            skill_overlap: round2_f32(skill_overlap),
            match_score: round2_f32(match_score),
            explanation,
        })))
    }
}

/// Share of the job's skills the resume covers; 0 when the job lists none
pub fn skill_overlap(job_skills: &HashSet<String>, resume_skills: &HashSet<String>) -> f32 {
    if job_skills.is_empty() {
        return 0.0;
    }
    job_skills.intersection(resume_skills).count() as f32 / job_skills.len() as f32
}

fn round2_f32(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Resolves once the signal reads `true`; never resolves without a signal
/// or after its sender is gone.
async fn cancelled(cancel: &mut Option<watch::Receiver<bool>>) {
    if let Some(rx) = cancel {
        let fired = rx.wait_for(|flag| *flag).await.is_ok();
        if fired {
            return;
        }
    }
    std::future::pending::<()>().await
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic payload not string".to_string())
}

/// Split outcomes into the sorted ranking and the omission list
fn finalize(outcomes: Vec<(PathBuf, DocumentOutcome)>, start_time: Instant) -> BatchReport {
    let total_documents = outcomes.len();
    let mut results = Vec::new();
    let mut omitted = Vec::new();

    for (path, outcome) in outcomes {
        match outcome {
            DocumentOutcome::Included(result) => results.push(*result),
            DocumentOutcome::Omitted(reason) => omitted.push(OmittedDocument {
                file_path: path.display().to_string(),
                reason,
            }),
        }
    }

    // sort_by is stable: equal scores keep input order
    results.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));

    info!(
        "Ranked {} of {} documents ({} omitted)",
        results.len(),
        total_documents,
        omitted.len()
    );

    BatchReport {
        results,
        omitted,
        total_documents,
        processing_time_ms: start_time.elapsed().as_millis() as u64,
    }
}
