//! Pluggable text annotation: entity recognition and noun-phrase chunking.
//!
//! The profile extractor only talks to [`TextAnnotator`], so a statistical
//! tagger can replace the rule-based [`HeuristicAnnotator`] without touching
//! the extraction logic.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityLabel {
    Person,
    Organization,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
}

pub trait TextAnnotator: Send + Sync {
    /// Named entities found in a single line, in order of appearance
    fn recognize_entities(&self, line: &str) -> Vec<Entity>;

    /// Noun-phrase-like chunks of the text, lowercased
    fn segment_noun_phrases(&self, text: &str) -> Vec<String>;
}

/// Rule-based annotator that works on normalized (lowercase) text.
///
/// A line of two to four purely alphabetic words with no resume vocabulary
/// in it is tagged as a person; a line ending in a company suffix is tagged
/// as an organization. Noun phrases are maximal runs of words between stop
/// words and delimiters.
pub struct HeuristicAnnotator {
    stop_words: HashSet<&'static str>,
    non_name_words: HashSet<&'static str>,
    org_suffixes: HashSet<&'static str>,
}

impl Default for HeuristicAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicAnnotator {
    pub fn new() -> Self {
        Self {
            stop_words: Self::create_stop_words(),
            non_name_words: Self::create_non_name_words(),
            org_suffixes: ["inc", "ltd", "llc", "corp", "corporation", "pvt", "gmbh", "technologies", "solutions"]
                .into_iter()
                .collect(),
        }
    }

    fn classify_line(&self, words: &[String]) -> Option<EntityLabel> {
        let last = words.last()?;
        if words.len() >= 2 && self.org_suffixes.contains(last.as_str()) {
            return Some(EntityLabel::Organization);
        }

        if !(2..=4).contains(&words.len()) {
            return None;
        }

        let looks_like_name = words.iter().all(|w| {
            w.chars().count() >= 2
                && w.chars().all(char::is_alphabetic)
                && !self.stop_words.contains(w.as_str())
                && !self.non_name_words.contains(w.as_str())
        });

        looks_like_name.then_some(EntityLabel::Person)
    }

    fn create_stop_words() -> HashSet<&'static str> {
        [
            "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have",
            "having", "in", "is", "it", "its", "of", "on", "or", "that", "the", "to", "was",
            "were", "will", "with", "we", "our", "i", "my", "me", "you", "your", "this",
            "these", "those", "such", "including", "using", "used", "via", "into", "over",
            "strong", "good", "excellent", "proficient", "familiar", "knowledge", "experience",
            "experienced", "skills", "skill", "worked", "working", "work", "years", "year",
            "plus", "etc", "also", "like", "both", "other", "must", "should", "required",
            "preferred", "ability", "understanding", "hands", "expertise",
        ]
        .into_iter()
        .collect()
    }

    fn create_non_name_words() -> HashSet<&'static str> {
        [
            "resume", "curriculum", "vitae", "cv", "profile", "summary", "objective",
            "education", "projects", "project", "contact", "email", "phone", "mobile",
            "address", "linkedin", "github", "engineer", "engineering", "developer",
            "scientist", "analyst", "manager", "intern", "internship", "consultant",
            "architect", "designer", "administrator", "specialist", "software", "data",
            "senior", "junior", "lead", "principal", "machine", "learning", "deep",
            "science", "analytics", "cloud", "devops", "university", "college", "institute",
            "school", "certified", "certification", "certifications", "present", "job",
            "description", "role", "position", "looking", "hiring", "requirements",
            "responsibilities", "qualifications", "python", "java", "javascript", "sql",
            "excel", "docker", "kubernetes", "aws", "azure", "full", "stack", "backend",
            "frontend", "web", "mobile", "technical", "personal", "details", "declaration",
            "languages", "hobbies", "interests", "references", "achievements", "awards",
        ]
        .into_iter()
        .collect()
    }
}

impl TextAnnotator for HeuristicAnnotator {
    fn recognize_entities(&self, line: &str) -> Vec<Entity> {
        let words: Vec<String> = line.unicode_words().map(|w| w.to_lowercase()).collect();

        // Punctuation other than separators means this is not a bare name line
        let has_noise = line
            .chars()
            .any(|c| c.is_ascii_digit() || matches!(c, '@' | '/' | ':' | '+'));
        if has_noise {
            return Vec::new();
        }

        match self.classify_line(&words) {
            Some(label) => vec![Entity {
                text: words.join(" "),
                label,
            }],
            None => Vec::new(),
        }
    }

    fn segment_noun_phrases(&self, text: &str) -> Vec<String> {
        let mut phrases = Vec::new();

        for segment in text.split(|c: char| matches!(c, ',' | ';' | ':' | '|' | '(' | ')' | '\n')) {
            let mut current: Vec<&str> = Vec::new();

            for raw in segment.split_whitespace() {
                // Sentence periods end a phrase; inner dots (node.js, b.tech) stay
                let ends_sentence = raw.len() > 1 && raw.ends_with('.');
                let token = raw.trim_end_matches('.');

                if token.is_empty() || self.stop_words.contains(token.to_lowercase().as_str()) {
                    if !current.is_empty() {
                        phrases.push(current.join(" ").to_lowercase());
                        current.clear();
                    }
                    continue;
                }

                current.push(token);

                if ends_sentence {
                    phrases.push(current.join(" ").to_lowercase());
                    current.clear();
                }
            }

            if !current.is_empty() {
                phrases.push(current.join(" ").to_lowercase());
            }
        }

        phrases
    }
}
