//! Text extraction from various file formats

use crate::error::{Result, RankerError};
use pulldown_cmark::{Event, Parser, Tag};
use std::fs;
use std::path::Path;

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> Result<String>;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path)?;

        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            RankerError::PdfExtraction(format!(
                "Failed to extract text from PDF '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path)?;
        // Scanned-then-OCRed text files are not always valid UTF-8
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path)?;
        Ok(Self::markdown_to_text(&String::from_utf8_lossy(&bytes)))
    }
}

impl MarkdownExtractor {
    /// Keep text and inline code, one line per block element
    pub fn markdown_to_text(markdown: &str) -> String {
        let mut text = String::new();

        for event in Parser::new(markdown) {
            match event {
                Event::Text(t) | Event::Code(t) => text.push_str(&t),
                Event::SoftBreak | Event::HardBreak => text.push('\n'),
                Event::End(Tag::Paragraph | Tag::Heading(..) | Tag::Item) => text.push('\n'),
                _ => {}
            }
        }

        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_to_text_strips_formatting() {
        let md = "# Jane Doe\n\n**Data Scientist**\n\n## Skills\n\n- Python\n- `SQL`\n";

        let text = MarkdownExtractor::markdown_to_text(md);

        assert_eq!(text, "Jane Doe\nData Scientist\nSkills\nPython\nSQL");
    }

    #[test]
    fn test_plain_text_tolerates_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        std::fs::write(&path, b"Jane \xFF Doe").unwrap();

        let text = PlainTextExtractor.extract(&path).unwrap();

        assert!(text.starts_with("Jane"));
        assert!(text.ends_with("Doe"));
    }

    #[test]
    fn test_markdown_tolerates_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.md");
        std::fs::write(&path, b"# Jane Doe\n\n- Python \xFF SQL\n").unwrap();

        let text = MarkdownExtractor.extract(&path).unwrap();

        assert!(text.starts_with("Jane Doe\nPython"));
        assert!(text.ends_with("SQL"));
    }
}
