//! Structured profile extraction from normalized resume text

use crate::config::SkillMatchMode;
use crate::error::{Result, RankerError};
use crate::processing::annotation::{EntityLabel, TextAnnotator};
use crate::processing::taxonomy::{Taxonomy, GENERAL_DOMAIN};
use aho_corasick::AhoCorasick;
use chrono::Datelike;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

pub const UNKNOWN: &str = "Unknown";
pub const MAX_EXPERIENCE_YEARS: f64 = 40.0;

const NAME_SCAN_LINES: usize = 5;
const NAME_MAX_TOKENS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Fresher,
    Junior,
    #[serde(rename = "Mid-Level")]
    MidLevel,
    Senior,
    Unknown,
}

impl ExperienceLevel {
    /// Lower bounds are inclusive: exactly 1 year is still a fresher
    pub fn from_years(years: f64) -> Self {
        if years <= 1.0 {
            ExperienceLevel::Fresher
        } else if years <= 3.0 {
            ExperienceLevel::Junior
        } else if years <= 6.0 {
            ExperienceLevel::MidLevel
        } else {
            ExperienceLevel::Senior
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExperienceLevel::Fresher => "Fresher",
            ExperienceLevel::Junior => "Junior",
            ExperienceLevel::MidLevel => "Mid-Level",
            ExperienceLevel::Senior => "Senior",
            ExperienceLevel::Unknown => UNKNOWN,
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedProfile {
    pub name: String,
    pub skills: Vec<String>,
    pub education: String,
    pub experience_years: f64,
    pub experience_level: ExperienceLevel,
    pub domain: String,
    pub certifications: Vec<String>,
    pub project_count: usize,
}

impl ExtractedProfile {
    /// Profile returned when there is no text to look at
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN.to_string(),
            skills: Vec::new(),
            education: UNKNOWN.to_string(),
            experience_years: 0.0,
            experience_level: ExperienceLevel::Unknown,
            domain: UNKNOWN.to_string(),
            certifications: Vec::new(),
            project_count: 0,
        }
    }

    /// Skills lowercased for set comparisons
    pub fn skill_set(&self) -> HashSet<String> {
        self.skills.iter().map(|s| s.to_lowercase()).collect()
    }
}

/// Runs the name, skill, education, experience, domain, certification and
/// project sub-extractors over one text.
pub struct ProfileExtractor {
    taxonomy: Arc<Taxonomy>,
    annotator: Arc<dyn TextAnnotator>,
    match_mode: SkillMatchMode,
    skill_matcher: AhoCorasick,
    // canonical skill for each matcher pattern, by pattern id
    pattern_targets: Vec<String>,
    years_regex: Regex,
    date_range_regex: Regex,
    project_regex: Regex,
    reference_year: i32,
}

impl ProfileExtractor {
    pub fn new(
        taxonomy: Arc<Taxonomy>,
        annotator: Arc<dyn TextAnnotator>,
        match_mode: SkillMatchMode,
    ) -> Result<Self> {
        let mut patterns = Vec::new();
        let mut pattern_targets = Vec::new();

        for skill in taxonomy.skills.canonical() {
            patterns.push(skill.to_string());
            pattern_targets.push(skill.to_string());
        }
        for (alias, canonical) in taxonomy.skills.aliases() {
            patterns.push(alias.to_string());
            pattern_targets.push(canonical.to_string());
        }

        // Standard match kind so overlapping occurrences are all reported
        let skill_matcher = AhoCorasick::new(&patterns)
            .map_err(|e| RankerError::TextProcessing(format!("Failed to build skill matcher: {}", e)))?;

        let years_regex = Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:years|yrs)")
            .map_err(|e| RankerError::TextProcessing(e.to_string()))?;
        let date_range_regex =
            Regex::new(r"(?i)(19\d{2}|20\d{2})\s*(?:-|to|–)\s*(present|19\d{2}|20\d{2})")
                .map_err(|e| RankerError::TextProcessing(e.to_string()))?;
        let project_regex = Regex::new(r"(?i)\bproject\b")
            .map_err(|e| RankerError::TextProcessing(e.to_string()))?;

        Ok(Self {
            taxonomy,
            annotator,
            match_mode,
            skill_matcher,
            pattern_targets,
            years_regex,
            date_range_regex,
            project_regex,
            reference_year: chrono::Local::now().year(),
        })
    }

    /// Year that "present" resolves to in date ranges
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    pub fn extract(&self, text: &str) -> ExtractedProfile {
        self.extract_with_line_view(text, text)
    }

    /// Like `extract`, but name and certifications are read from `lines`
    /// (the same text with its line breaks kept). Everything else comes
    /// from `text`.
    pub fn extract_with_line_view(&self, text: &str, lines: &str) -> ExtractedProfile {
        if text.trim().is_empty() {
            return ExtractedProfile::unknown();
        }

        let skills = self.extract_skills(text);
        let experience_years = self.extract_experience_years(text);
        let domain = self.infer_domain(&skills);

        ExtractedProfile {
            name: self.extract_name(lines),
            education: self.extract_education(text),
            experience_years: round2(experience_years),
            experience_level: ExperienceLevel::from_years(experience_years),
            domain,
            certifications: self.extract_certifications(lines),
            project_count: self.count_projects(text),
            skills,
        }
    }

    /// First person entity in the opening lines; no scoring across candidates
    pub fn extract_name(&self, text: &str) -> String {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(NAME_SCAN_LINES)
            .filter(|line| line.split_whitespace().count() <= NAME_MAX_TOKENS)
            .flat_map(|line| self.annotator.recognize_entities(line))
            .find(|entity| entity.label == EntityLabel::Person)
            .map(|entity| title_case(&entity.text))
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    /// Sorted, deduplicated, title-cased skills
    pub fn extract_skills(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let mut found: BTreeSet<String> = BTreeSet::new();

        // Canonical and alias literals
        for mat in self.skill_matcher.find_overlapping_iter(&lowered) {
            if self.match_mode == SkillMatchMode::WordBoundary
                && !is_word_bounded(&lowered, mat.start(), mat.end())
            {
                continue;
            }
            found.insert(self.pattern_targets[mat.pattern().as_usize()].clone());
        }

        // Noun phrases that are exactly a canonical skill
        for phrase in self.annotator.segment_noun_phrases(&lowered) {
            if self.taxonomy.skills.is_canonical(&phrase) {
                found.insert(phrase);
            }
        }

        found
            .iter()
            .map(|s| title_case(s))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Highest education level mentioned; lower levels are suppressed
    pub fn extract_education(&self, text: &str) -> String {
        let lowered = text.to_lowercase();

        self.taxonomy
            .education
            .levels()
            .iter()
            .filter(|level| level.keywords.iter().any(|k| lowered.contains(k.as_str())))
            .max_by_key(|level| level.rank)
            .map(|level| level.label.clone())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    /// Maximum of explicit "N years" mentions and year-range spans, capped at 40
    pub fn extract_experience_years(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let mut candidates: Vec<f64> = Vec::new();

        for cap in self.years_regex.captures_iter(&lowered) {
            if let Ok(years) = cap[1].parse::<f64>() {
                candidates.push(years);
            }
        }

        for cap in self.date_range_regex.captures_iter(&lowered) {
            let Ok(start) = cap[1].parse::<i32>() else {
                continue;
            };
            let end = if &cap[2] == "present" {
                self.reference_year
            } else {
                match cap[2].parse::<i32>() {
                    Ok(end) => end,
                    Err(_) => continue,
                }
            };

            let span = f64::from(end - start);
            if (0.0..=MAX_EXPERIENCE_YEARS).contains(&span) {
                candidates.push(span);
            }
        }

        candidates
            .into_iter()
            .reduce(f64::max)
            .map(|years| years.clamp(0.0, MAX_EXPERIENCE_YEARS))
            .unwrap_or(0.0)
    }

    /// First matching domain rule wins
    pub fn infer_domain(&self, skills: &[String]) -> String {
        let lowered: HashSet<String> = skills.iter().map(|s| s.to_lowercase()).collect();

        self.taxonomy
            .domain_rules
            .iter()
            .find(|rule| rule.triggers.iter().any(|t| lowered.contains(t)))
            .map(|rule| rule.label.clone())
            .unwrap_or_else(|| GENERAL_DOMAIN.to_string())
    }

    /// Raw lines mentioning a certification marker, in document order
    pub fn extract_certifications(&self, text: &str) -> Vec<String> {
        text.lines()
            .filter(|line| {
                let lowered = line.to_lowercase();
                self.taxonomy
                    .certification_keywords
                    .iter()
                    .any(|k| lowered.contains(k.as_str()))
            })
            .map(|line| line.trim().to_string())
            .collect()
    }

    pub fn count_projects(&self, text: &str) -> usize {
        self.project_regex.find_iter(text).count()
    }
}

// '+' and '#' belong to names like c++ and c#
fn is_skill_char(c: char) -> bool {
    c.is_alphanumeric() || c == '+' || c == '#'
}

fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_skill_char) && !after.is_some_and(is_skill_char)
}

/// Uppercase the first letter of every run of letters, lowercase the rest
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_letter = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_letter {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            result.push(c);
            prev_letter = false;
        }
    }

    result
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
