//! Input processing module
//! Handles file detection, text extraction, and document discovery

pub mod file_detector;
pub mod manager;
pub mod text_extractor;

use crate::error::Result;
use std::path::Path;

pub use manager::{collect_documents, FileTextSource};

/// Source of raw document text (PDF parsing, OCR, plain files...).
/// An empty string means the document had no readable text.
pub trait TextSource: Send + Sync {
    fn extract_text(&self, path: &Path) -> Result<String>;
}
