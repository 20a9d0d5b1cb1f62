//! Configuration management for the resume ranker

use crate::error::{Result, RankerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub processing: ProcessingConfig,
    pub scoring: ScoringConfig,
    pub skills: SkillsConfig,
    pub output: OutputConfig,
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Give name and certification extraction the line-preserving text.
    /// Skills, education and experience always use the single-line text.
    pub line_aware_extraction: bool,
    /// Worker pool size for concurrent ranking.
    pub max_concurrency: usize,
    /// Per-document timeout in seconds; 0 disables it.
    pub document_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub similarity_weight: f32,
    pub experience_weight: f32,
    pub skill_weight: f32,
    /// Years of experience at which the experience component saturates.
    pub experience_saturation_years: f32,
    /// Documents with similarity (0-10) below this are dropped.
    pub relevance_floor: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsConfig {
    pub match_mode: SkillMatchMode,
    pub additional_skills: Vec<String>,
    /// alias -> canonical skill
    pub additional_aliases: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillMatchMode {
    #[default]
    Substring,
    WordBoundary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
    pub show_omitted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub dimension: usize,
    /// Model2Vec repo id or local path, used with the `model2vec` feature.
    pub model2vec_model: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
    Markdown,
    Csv,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            line_aware_extraction: false,
            max_concurrency: 4,
            document_timeout_secs: 30,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            similarity_weight: 0.5,
            experience_weight: 0.2,
            skill_weight: 0.3,
            experience_saturation_years: 10.0,
            relevance_floor: 1.0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            color_output: true,
            show_omitted: false,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: 512,
            model2vec_model: "minishlab/M2V_base_output".to_string(),
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults out when missing
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| RankerError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| RankerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-ranker")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        let s = &self.scoring;
        for (name, w) in [
            ("similarity_weight", s.similarity_weight),
            ("experience_weight", s.experience_weight),
            ("skill_weight", s.skill_weight),
        ] {
            if !(0.0..=1.0).contains(&w) {
                return Err(RankerError::Configuration(format!(
                    "scoring.{} must be within [0, 1], got {}",
                    name, w
                )));
            }
        }
        if s.experience_saturation_years <= 0.0 {
            return Err(RankerError::Configuration(
                "scoring.experience_saturation_years must be positive".to_string(),
            ));
        }
        if !(0.0..=10.0).contains(&s.relevance_floor) {
            return Err(RankerError::Configuration(format!(
                "scoring.relevance_floor must be within [0, 10], got {}",
                s.relevance_floor
            )));
        }
        if self.embedding.dimension == 0 {
            return Err(RankerError::Configuration(
                "embedding.dimension must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scoring.relevance_floor, 1.0);
        assert_eq!(config.skills.match_mode, SkillMatchMode::Substring);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.skills.match_mode = SkillMatchMode::WordBoundary;
        config.skills.additional_skills = vec!["rust".to_string()];
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.skills.match_mode, SkillMatchMode::WordBoundary);
        assert_eq!(loaded.skills.additional_skills, vec!["rust".to_string()]);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scoring]\nskill_weight = 0.4\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.scoring.skill_weight, 0.4);
        assert_eq!(loaded.scoring.similarity_weight, 0.5);
        assert!(!loaded.processing.line_aware_extraction);
    }

    #[test]
    fn test_invalid_weight_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scoring]\nskill_weight = 1.5\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(RankerError::Configuration(_))
        ));
    }
}
