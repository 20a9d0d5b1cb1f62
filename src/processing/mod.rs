//! Normalization, profile extraction, scoring and ranking

pub mod annotation;
pub mod contacts;
pub mod embeddings;
pub mod profile_extractor;
pub mod ranker;
pub mod scoring;
pub mod taxonomy;
pub mod text_processor;
