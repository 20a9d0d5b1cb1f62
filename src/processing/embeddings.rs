//! Text embeddings and the similarity metric used for the relevance gate

use crate::error::{Result, RankerError};
use siphasher::sip::SipHasher13;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use unicode_segmentation::UnicodeSegmentation;

#[cfg(feature = "model2vec")]
use model2vec_rs::model::StaticModel;

/// Fixed seed so the same text always lands on the same dimensions.
/// Changing it changes every embedding.
const HASH_SEED_K0: u64 = 0x0123_4567_89ab_cdef;
const HASH_SEED_K1: u64 = 0xfedc_ba98_7654_3210;

pub trait Embedder: Send + Sync {
    /// Deterministic, fixed-dimension embedding of the text
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn name(&self) -> &str;
}

/// Similarity between two embeddings on a 0-10 scale
pub trait SimilarityMetric: Send + Sync {
    fn similarity(&self, a: &[f32], b: &[f32]) -> Result<f32>;
}

/// Feature-hashing bag of words.
///
/// Each token's sublinear term frequency is added to a hashed bucket; the
/// vector is L2-normalized. All components are non-negative, so cosine
/// similarity stays within [0, 1].
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn bucket(&self, token: &str) -> usize {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        token.hash(&mut hasher);
        (hasher.finish() % self.dimension as u64) as usize
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(512)
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut counts: HashMap<String, u32> = HashMap::new();
        for word in text.unicode_words() {
            let token = word.to_lowercase();
            if token.chars().count() > 1 {
                *counts.entry(token).or_insert(0) += 1;
            }
        }

        let mut vector = vec![0.0f32; self.dimension];
        for (token, count) in &counts {
            vector[self.bucket(token)] += 1.0 + (*count as f32).ln();
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        Ok(vector)
    }

    fn name(&self) -> &str {
        "feature-hashing"
    }
}

/// Model2Vec static embeddings loaded from a local folder or the Hub
#[cfg(feature = "model2vec")]
pub struct Model2VecEmbedder {
    model: StaticModel,
    model_name: String,
}

#[cfg(feature = "model2vec")]
impl Model2VecEmbedder {
    pub fn from_pretrained(repo_or_path: &str) -> Result<Self> {
        log::info!("Loading Model2Vec embedding model: {}", repo_or_path);

        let model = StaticModel::from_pretrained(repo_or_path, None, None, None)
            .map_err(|e| RankerError::Embedding(format!("Failed to load model: {}", e)))?;

        Ok(Self {
            model,
            model_name: repo_or_path.to_string(),
        })
    }
}

#[cfg(feature = "model2vec")]
impl Embedder for Model2VecEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.model.encode_single(text))
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

/// Cosine similarity mapped onto 0-10 as `clamp(cos, 0, 1) * 10`.
///
/// Anti-correlated vectors score the same as orthogonal ones, so a
/// relevance floor of 1.0 means "cosine of at least 0.1".
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaledCosine;

impl ScaledCosine {
    pub fn cosine(a: &[f32], b: &[f32]) -> Result<f32> {
        if a.len() != b.len() {
            return Err(RankerError::Similarity(format!(
                "Embedding dimensions don't match: {} vs {}",
                a.len(),
                b.len()
            )));
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return Ok(0.0);
        }

        Ok(dot_product / (norm_a * norm_b))
    }
}

impl SimilarityMetric for ScaledCosine {
    fn similarity(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        let cosine = Self::cosine(a, b)?;
        Ok(cosine.clamp(0.0, 1.0) * 10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashing_embedder_is_deterministic_and_normalized() {
        let embedder = HashingEmbedder::new(64);

        let a = embedder.embed("python developer with sql").unwrap();
        let b = embedder.embed("python developer with sql").unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert_eq!(embedder.name(), "feature-hashing");
    }

    #[test]
    fn test_empty_text_gives_zero_vector() {
        let embedder = HashingEmbedder::new(16);
        let v = embedder.embed("").unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_similar_texts_score_higher() {
        let embedder = HashingEmbedder::default();
        let metric = ScaledCosine;

        let job = embedder.embed("data scientist python machine learning sql").unwrap();
        let close = embedder.embed("python machine learning engineer, sql and pandas").unwrap();
        let far = embedder.embed("pastry chef baking bread croissants").unwrap();

        let close_score = metric.similarity(&job, &close).unwrap();
        let far_score = metric.similarity(&job, &far).unwrap();

        assert!(close_score > far_score);
        assert!((0.0..=10.0).contains(&close_score));
    }

    #[test]
    fn test_scaled_cosine_bounds() {
        let metric = ScaledCosine;

        assert!((metric.similarity(&[1.0, 0.0], &[1.0, 0.0]).unwrap() - 10.0).abs() < 1e-5);
        assert_eq!(metric.similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 0.0);
        assert_eq!(metric.similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap(), 0.0);
        assert_eq!(metric.similarity(&[0.0, 0.0], &[1.0, 0.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_dimension_mismatch_is_error() {
        let metric = ScaledCosine;
        assert!(matches!(
            metric.similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0]),
            Err(RankerError::Similarity(_))
        ));
    }
}
