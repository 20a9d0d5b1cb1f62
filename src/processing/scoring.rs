//! Final match score and the human-readable explanation

use crate::config::ScoringConfig;

pub trait Scorer: Send + Sync {
    /// Match score in [0, 10] from similarity in [0, 1], raw years and
    /// skill overlap in [0, 1]
    fn score(&self, similarity: f32, experience_years: f64, skill_overlap: f32) -> f32;
}

/// Everything an explanation may refer to
#[derive(Debug, Clone)]
pub struct ExplanationInput<'a> {
    pub job_description: &'a str,
    pub skills: &'a [String],
    pub experience_years: f64,
    pub match_score: f32,
    /// 0-10 scale
    pub semantic_similarity: f32,
    pub skill_overlap: f32,
}

pub trait Explainer: Send + Sync {
    fn explain(&self, input: &ExplanationInput<'_>) -> String;
}

/// Linear blend of similarity, saturating experience and skill overlap
#[derive(Debug, Clone)]
pub struct WeightedScorer {
    similarity_weight: f32,
    experience_weight: f32,
    skill_weight: f32,
    saturation_years: f32,
}

impl WeightedScorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            similarity_weight: config.similarity_weight,
            experience_weight: config.experience_weight,
            skill_weight: config.skill_weight,
            saturation_years: config.experience_saturation_years.max(f32::EPSILON),
        }
    }
}

impl Default for WeightedScorer {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

impl Scorer for WeightedScorer {
    fn score(&self, similarity: f32, experience_years: f64, skill_overlap: f32) -> f32 {
        let experience = (experience_years.max(0.0) as f32 / self.saturation_years).min(1.0);

        let blended = self.similarity_weight * similarity.clamp(0.0, 1.0)
            + self.experience_weight * experience
            + self.skill_weight * skill_overlap.clamp(0.0, 1.0);

        (blended * 10.0).clamp(0.0, 10.0)
    }
}

/// Deterministic sentence-template explanation
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateExplainer;

impl TemplateExplainer {
    fn verdict(match_score: f32) -> &'static str {
        match match_score {
            s if s >= 8.0 => "Strong match",
            s if s >= 6.0 => "Good match",
            s if s >= 4.0 => "Partial match",
            _ => "Weak match",
        }
    }

    fn closeness(similarity: f32) -> &'static str {
        match similarity {
            s if s >= 7.0 => "closely aligned with",
            s if s >= 4.0 => "moderately aligned with",
            _ => "loosely related to",
        }
    }
}

impl Explainer for TemplateExplainer {
    fn explain(&self, input: &ExplanationInput<'_>) -> String {
        let mut sentences = vec![format!(
            "{} ({:.1}/10).",
            Self::verdict(input.match_score),
            input.match_score
        )];

        sentences.push(format!(
            "The resume is {} the job description (semantic similarity {:.1}/10).",
            Self::closeness(input.semantic_similarity),
            input.semantic_similarity
        ));

        if input.skills.is_empty() {
            sentences.push("No recognised skills were found.".to_string());
        } else {
            let shown: Vec<&str> = input.skills.iter().take(5).map(String::as_str).collect();
            let more = input.skills.len().saturating_sub(shown.len());
            let suffix = if more > 0 {
                format!(" and {} more", more)
            } else {
                String::new()
            };
            sentences.push(format!(
                "Covers {:.0}% of the required skills; key skills: {}{}.",
                input.skill_overlap * 100.0,
                shown.join(", "),
                suffix
            ));
        }

        if input.experience_years > 0.0 {
            sentences.push(format!(
                "Shows about {} years of experience.",
                format_years(input.experience_years)
            ));
        } else {
            sentences.push("No measurable experience was found.".to_string());
        }

        sentences.join(" ")
    }
}

fn format_years(years: f64) -> String {
    if years.fract() == 0.0 {
        format!("{:.0}", years)
    } else {
        format!("{:.1}", years)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_score_bounds() {
        let scorer = WeightedScorer::default();

        assert_eq!(scorer.score(0.0, 0.0, 0.0), 0.0);
        assert!((scorer.score(1.0, 40.0, 1.0) - 10.0).abs() < 1e-5);
        // Out-of-range inputs are clamped
        assert!(scorer.score(3.0, 100.0, 2.0) <= 10.0);
    }

    #[test]
    fn test_weighted_score_components() {
        let scorer = WeightedScorer::default();

        // 0.5 * 0.8 + 0.2 * 0.5 + 0.3 * 0.5 = 0.65
        let score = scorer.score(0.8, 5.0, 0.5);

        assert!((score - 6.5).abs() < 1e-4);
    }

    #[test]
    fn test_explanation_mentions_scores_and_skills() {
        let skills = vec!["Python".to_string(), "Sql".to_string()];
        let input = ExplanationInput {
            job_description: "python sql analyst",
            skills: &skills,
            experience_years: 4.0,
            match_score: 7.3,
            semantic_similarity: 5.0,
            skill_overlap: 0.5,
        };

        let text = TemplateExplainer.explain(&input);

        assert!(text.starts_with("Good match (7.3/10)."));
        assert!(text.contains("moderately aligned"));
        assert!(text.contains("Covers 50% of the required skills; key skills: Python, Sql."));
        assert!(text.contains("about 4 years"));
    }

    #[test]
    fn test_explanation_without_skills_or_experience() {
        let input = ExplanationInput {
            job_description: "anything",
            skills: &[],
            experience_years: 0.0,
            match_score: 1.0,
            semantic_similarity: 1.0,
            skill_overlap: 0.0,
        };

        let text = TemplateExplainer.explain(&input);

        assert!(text.starts_with("Weak match"));
        assert!(text.contains("No recognised skills"));
        assert!(text.contains("No measurable experience"));
    }
}
