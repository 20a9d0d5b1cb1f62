//! File-backed text source and document discovery

use crate::error::{Result, RankerError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use crate::input::TextSource;
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Reads documents from disk, routing by file extension.
///
/// Reads are uncached unless `with_cache(true)` is set; a ranking batch
/// reads each path once, so caching there only holds memory.
pub struct FileTextSource {
    cache: Mutex<HashMap<PathBuf, String>>,
    enable_cache: bool,
}

impl Default for FileTextSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FileTextSource {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            enable_cache: false,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    pub fn cache_size(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn read_uncached(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(RankerError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        match FileType::from_path(path) {
            FileType::Pdf => {
                debug!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path)
            }
            FileType::Text => {
                debug!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path)
            }
            FileType::Markdown => {
                debug!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path)
            }
            FileType::Unknown => Err(RankerError::UnsupportedFormat(format!(
                "Unsupported file type for: {}",
                path.display()
            ))),
        }
    }
}

impl TextSource for FileTextSource {
    fn extract_text(&self, path: &Path) -> Result<String> {
        if self.enable_cache {
            if let Ok(cache) = self.cache.lock() {
                if let Some(cached_text) = cache.get(path) {
                    debug!("Using cached text for: {}", path.display());
                    return Ok(cached_text.clone());
                }
            }
        }

        let text = self.read_uncached(path)?;

        if self.enable_cache {
            if let Ok(mut cache) = self.cache.lock() {
                cache.insert(path.to_path_buf(), text.clone());
            }
        }

        Ok(text)
    }
}

/// Expand directories into their supported files (non-recursive, sorted);
/// plain file arguments are kept as given, in order.
pub fn collect_documents(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(input)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file() && FileType::from_path(path).is_supported())
                .collect();
            found.sort();
            info!("Found {} documents in {}", found.len(), input.display());
            documents.extend(found);
        } else {
            documents.push(input.clone());
        }
    }

    Ok(documents)
}
