//! Integration tests for the resume ranker

use resume_ranker::config::{Config, SkillMatchMode};
use resume_ranker::input::{collect_documents, FileTextSource, TextSource};
use resume_ranker::processing::ranker::OmissionReason;
use resume_ranker::{ExperienceLevel, Ranker};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    Path::new("tests/fixtures").join(name)
}

fn job_description() -> String {
    fs::read_to_string(fixture("job_description.txt")).unwrap()
}

/// Defaults plus the line view, so names and certification lines are found
fn line_aware_config() -> Config {
    let mut config = Config::default();
    config.processing.line_aware_extraction = true;
    config
}

/// Fixture resumes plus a blank file and an unsupported one
fn resume_folder() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    for name in ["data_scientist.txt", "web_developer.md", "pastry_chef.txt"] {
        fs::copy(fixture(name), dir.path().join(name)).unwrap();
    }
    fs::write(dir.path().join("blank.txt"), "   \n\n").unwrap();
    fs::write(dir.path().join("cover_letter.docx"), "not parsed").unwrap();
    dir
}

#[tokio::test]
async fn test_rank_folder_end_to_end() {
    let dir = resume_folder();
    let documents = collect_documents(&[dir.path().to_path_buf()]).unwrap();
    assert_eq!(documents.len(), 4);

    let ranker = Arc::new(Ranker::from_config(&line_aware_config()).unwrap());
    let report = ranker
        .rank_concurrent(documents, &job_description(), None, None)
        .await
        .unwrap();

    assert_eq!(report.total_documents, 4);
    assert_eq!(report.results.len() + report.omitted.len(), 4);

    let best = &report.results[0];
    assert!(best.file_path.ends_with("data_scientist.txt"));
    assert_eq!(best.name, "Priya Sharma");
    assert_eq!(best.email.as_deref(), Some("priya.sharma@example.com"));
    assert_eq!(best.phone_numbers, vec!["555-123-4567".to_string()]);
    assert_eq!(best.education, "MASTER");
    assert_eq!(best.experience_years, 5.0);
    assert_eq!(best.experience_level, ExperienceLevel::MidLevel);
    assert_eq!(best.domain, "Data Science / AI");
    assert_eq!(best.project_count, 1);
    assert!(best
        .certifications
        .contains(&"aws certified machine learning specialty".to_string()));
    assert_eq!(best.skill_overlap, 1.0);
    assert!(best.semantic_similarity >= 1.0);
    assert!((0.0..=10.0).contains(&best.match_score));

    for pair in report.results.windows(2) {
        assert!(pair[0].match_score >= pair[1].match_score);
    }

    let blank = report
        .omitted
        .iter()
        .find(|o| o.file_path.ends_with("blank.txt"))
        .unwrap();
    assert_eq!(blank.reason, OmissionReason::NoText);
}

#[test]
fn test_default_config_scores_single_line_text() {
    let jd = job_description();
    let paths = [fixture("data_scientist.txt"), fixture("pastry_chef.txt")];

    let default_results = Ranker::from_config(&Config::default())
        .unwrap()
        .rank(&paths, &jd)
        .unwrap();
    let line_aware_results = Ranker::from_config(&line_aware_config())
        .unwrap()
        .rank(&paths, &jd)
        .unwrap();

    let best = &default_results[0];
    assert!(best.file_path.ends_with("data_scientist.txt"));
    assert!(best.skills.contains(&"Machine Learning".to_string()));
    assert_eq!(best.domain, "Data Science / AI");
    assert_eq!(best.skill_overlap, 1.0);
    // the single-line text has no short first line to take a name from
    assert_eq!(best.name, "Unknown");

    // the line view only changes name and certifications
    let other = &line_aware_results[0];
    assert_eq!(best.skills, other.skills);
    assert_eq!(best.match_score, other.match_score);
    assert_eq!(other.name, "Priya Sharma");
}

#[tokio::test]
async fn test_sequential_and_concurrent_agree() {
    let dir = resume_folder();
    let documents = collect_documents(&[dir.path().to_path_buf()]).unwrap();
    let ranker = Arc::new(Ranker::from_config(&Config::default()).unwrap());
    let jd = job_description();

    let sequential = ranker.rank(&documents, &jd).unwrap();
    let concurrent = ranker
        .rank_concurrent(documents, &jd, None, None)
        .await
        .unwrap();

    assert_eq!(sequential, concurrent.results);
}

#[test]
fn test_empty_job_description_ranks_nothing() {
    let ranker = Ranker::from_config(&Config::default()).unwrap();

    let results = ranker
        .rank(&[fixture("data_scientist.txt")], "   ")
        .unwrap();

    assert!(results.is_empty());
}

#[test]
fn test_missing_resume_is_omitted_not_fatal() {
    let ranker = Ranker::from_config(&Config::default()).unwrap();

    let report = ranker
        .rank_detailed(
            &[fixture("does_not_exist.txt"), fixture("data_scientist.txt")],
            &job_description(),
        )
        .unwrap();

    assert_eq!(report.results.len(), 1);
    assert!(matches!(report.omitted[0].reason, OmissionReason::Failed { .. }));
}

#[test]
fn test_markdown_profile_extraction() {
    let text = FileTextSource::new()
        .extract_text(&fixture("web_developer.md"))
        .unwrap();
    assert!(!text.contains("**"));

    let ranker = Ranker::from_config(&line_aware_config()).unwrap();
    let profile = ranker.profile(&text);

    assert_eq!(profile.name, "Alex Turner");
    assert_eq!(profile.education, "BACHELOR");
    assert_eq!(profile.experience_years, 2.0);
    assert_eq!(profile.experience_level, ExperienceLevel::Junior);
    assert_eq!(profile.domain, "Software Development");
    assert!(profile.skills.contains(&"Javascript".to_string()));
}

#[test]
fn test_config_file_extends_skills() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[skills]
match_mode = "word_boundary"
additional_skills = ["react"]
additional_aliases = [["reactjs", "react"]]
"#,
    )
    .unwrap();

    let config = Config::load_from(&config_path).unwrap();
    assert_eq!(config.skills.match_mode, SkillMatchMode::WordBoundary);
    // untouched sections keep their defaults
    assert_eq!(config.scoring.relevance_floor, 1.0);

    let ranker = Ranker::from_config(&config).unwrap();
    let text = FileTextSource::new()
        .extract_text(&fixture("web_developer.md"))
        .unwrap();
    let skills = ranker.profile(&text).skills;

    assert!(skills.contains(&"React".to_string()));
    assert!(skills.contains(&"Javascript".to_string()));
    assert!(!skills.contains(&"Java".to_string()));
    assert!(!skills.contains(&"R".to_string()));
}

#[test]
fn test_invalid_alias_in_config_is_rejected() {
    let mut config = Config::default();
    config.skills.additional_aliases = vec![("k8s".to_string(), "kubernetes-helm".to_string())];

    assert!(Ranker::from_config(&config).is_err());
}
