//! Static reference data: skills, aliases, education levels, certification
//! markers and domain rules.
//!
//! Built once and shared by reference; nothing here mutates after
//! construction.

use crate::config::SkillsConfig;
use crate::error::{Result, RankerError};
use std::collections::{BTreeMap, BTreeSet};

/// Canonical skill names plus alias -> canonical lookups
#[derive(Debug, Clone)]
pub struct SkillTaxonomy {
    canonical: BTreeSet<String>,
    aliases: BTreeMap<String, String>,
}

/// One rung of the education ladder
#[derive(Debug, Clone)]
pub struct EducationLevel {
    pub rank: u8,
    pub label: String,
    pub keywords: Vec<String>,
}

/// Education levels ordered by strictly increasing rank
#[derive(Debug, Clone)]
pub struct EducationHierarchy {
    levels: Vec<EducationLevel>,
}

/// Maps a non-empty skill intersection to a domain label
#[derive(Debug, Clone)]
pub struct DomainRule {
    pub label: String,
    pub triggers: BTreeSet<String>,
}

/// Everything the profile extractor matches against
#[derive(Debug, Clone)]
pub struct Taxonomy {
    pub skills: SkillTaxonomy,
    pub education: EducationHierarchy,
    pub certification_keywords: Vec<String>,
    pub domain_rules: Vec<DomainRule>,
}

pub const GENERAL_DOMAIN: &str = "General";

const DEFAULT_SKILLS: &[&str] = &[
    // Programming
    "python", "java", "c", "c++", "sql", "r", "javascript",
    // Data / AI
    "data science", "machine learning", "deep learning",
    "nlp", "computer vision", "statistics", "data analytics",
    // Libraries / tools
    "pandas", "numpy", "scikit-learn", "tensorflow",
    "pytorch", "keras", "opencv", "matplotlib", "seaborn",
    // BI
    "excel", "power bi", "tableau",
    // Cloud / DevOps
    "aws", "azure", "gcp", "docker", "kubernetes", "git",
];

const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("ml", "machine learning"),
    ("dl", "deep learning"),
    ("natural language processing", "nlp"),
    ("cv", "computer vision"),
    ("sklearn", "scikit-learn"),
];

const DEFAULT_EDUCATION: &[(u8, &str, &[&str])] = &[
    (1, "SECONDARY (10TH)", &["10th", "ssc", "secondary school", "matriculation"]),
    (2, "HIGHER SECONDARY (12TH)", &["12th", "hsc", "higher secondary", "intermediate"]),
    (3, "DIPLOMA", &["diploma", "polytechnic"]),
    (
        4,
        "BACHELOR",
        &[
            "b.tech",
            "b.e",
            "b.sc",
            "bca",
            "bachelor of technology",
            "bachelor of engineering",
            "bachelor of science",
            "undergraduate",
        ],
    ),
    (
        5,
        "MASTER",
        &[
            "m.tech",
            "m.sc",
            "mba",
            "mca",
            "master of technology",
            "master of science",
            "postgraduate",
        ],
    ),
    (6, "PHD", &["phd", "doctor of philosophy", "doctoral"]),
];

const DEFAULT_CERTIFICATION_KEYWORDS: &[&str] = &[
    "certified",
    "certification",
    "coursera",
    "udemy",
    "aws certified",
    "google certified",
    "azure certified",
];

// Earlier rules win; a profile is never multi-labelled
const DEFAULT_DOMAIN_RULES: &[(&str, &[&str])] = &[
    ("Data Science / AI", &["machine learning", "deep learning", "nlp"]),
    ("Data Analytics", &["sql", "excel", "power bi", "tableau"]),
    ("Cloud / DevOps", &["aws", "docker", "kubernetes"]),
    ("Software Development", &["java", "c++", "javascript"]),
];

impl SkillTaxonomy {
    /// Build a taxonomy, rejecting aliases whose target is not canonical
    pub fn new<S, A>(canonical: S, aliases: A) -> Result<Self>
    where
        S: IntoIterator<Item = String>,
        A: IntoIterator<Item = (String, String)>,
    {
        let canonical: BTreeSet<String> = canonical
            .into_iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let mut alias_map = BTreeMap::new();
        for (alias, target) in aliases {
            let alias = alias.trim().to_lowercase();
            let target = target.trim().to_lowercase();
            if alias.is_empty() {
                continue;
            }
            if !canonical.contains(&target) {
                return Err(RankerError::Configuration(format!(
                    "Alias '{}' points to unknown skill '{}'",
                    alias, target
                )));
            }
            alias_map.insert(alias, target);
        }

        Ok(Self {
            canonical,
            aliases: alias_map,
        })
    }

    pub fn canonical(&self) -> impl Iterator<Item = &str> {
        self.canonical.iter().map(String::as_str)
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(a, c)| (a.as_str(), c.as_str()))
    }

    pub fn is_canonical(&self, skill: &str) -> bool {
        self.canonical.contains(skill)
    }

}

impl EducationHierarchy {
    pub fn new(levels: Vec<EducationLevel>) -> Result<Self> {
        if levels.windows(2).any(|pair| pair[0].rank >= pair[1].rank) {
            return Err(RankerError::Configuration(
                "Education ranks must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[EducationLevel] {
        &self.levels
    }
}

impl Taxonomy {
    /// Default reference data
    pub fn new() -> Result<Self> {
        Self::with_skills_config(&SkillsConfig::default())
    }

    /// Default reference data extended with configured skills and aliases
    pub fn with_skills_config(config: &SkillsConfig) -> Result<Self> {
        let canonical = DEFAULT_SKILLS
            .iter()
            .map(|s| s.to_string())
            .chain(config.additional_skills.iter().cloned());

        let aliases = DEFAULT_ALIASES
            .iter()
            .map(|(a, c)| (a.to_string(), c.to_string()))
            .chain(config.additional_aliases.iter().cloned());

        let skills = SkillTaxonomy::new(canonical, aliases)?;

        let education = EducationHierarchy::new(
            DEFAULT_EDUCATION
                .iter()
                .map(|(rank, label, keywords)| EducationLevel {
                    rank: *rank,
                    label: label.to_string(),
                    keywords: keywords.iter().map(|k| k.to_string()).collect(),
                })
                .collect(),
        )?;

        let domain_rules = DEFAULT_DOMAIN_RULES
            .iter()
            .map(|(label, triggers)| DomainRule {
                label: label.to_string(),
                triggers: triggers.iter().map(|t| t.to_string()).collect(),
            })
            .collect();

        Ok(Self {
            skills,
            education,
            certification_keywords: DEFAULT_CERTIFICATION_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            domain_rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_taxonomy_builds() {
        let taxonomy = Taxonomy::new().unwrap();

        assert!(taxonomy.skills.is_canonical("power bi"));
        assert!(taxonomy.skills.aliases().any(|pair| pair == ("sklearn", "scikit-learn")));
        assert_eq!(taxonomy.education.levels().len(), 6);
        assert_eq!(taxonomy.domain_rules[0].label, "Data Science / AI");
    }

    #[test]
    fn test_every_alias_targets_canonical_skill() {
        let taxonomy = Taxonomy::new().unwrap();
        for (_, canonical) in taxonomy.skills.aliases() {
            assert!(taxonomy.skills.is_canonical(canonical));
        }
    }

    #[test]
    fn test_alias_to_unknown_skill_rejected() {
        let config = SkillsConfig {
            additional_aliases: vec![("k8s".to_string(), "helm".to_string())],
            ..Default::default()
        };

        assert!(matches!(
            Taxonomy::with_skills_config(&config),
            Err(RankerError::Configuration(_))
        ));
    }

    #[test]
    fn test_additional_skills_are_normalized() {
        let config = SkillsConfig {
            additional_skills: vec!["  Rust ".to_string()],
            additional_aliases: vec![("rustlang".to_string(), "RUST".to_string())],
            ..Default::default()
        };

        let taxonomy = Taxonomy::with_skills_config(&config).unwrap();

        assert!(taxonomy.skills.is_canonical("rust"));
        assert!(taxonomy.skills.aliases().any(|pair| pair == ("rustlang", "rust")));
    }

    #[test]
    fn test_education_ranks_must_increase() {
        let levels = vec![
            EducationLevel { rank: 2, label: "B".into(), keywords: vec![] },
            EducationLevel { rank: 2, label: "C".into(), keywords: vec![] },
        ];
        assert!(EducationHierarchy::new(levels).is_err());
    }
}
