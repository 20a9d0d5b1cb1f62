//! Text normalization for OCR output and job descriptions

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Cleans raw resume text for the extraction heuristics and embeddings.
///
/// The pipeline is order-sensitive: split-letter repair must run before
/// punctuation stripping, and lowercasing runs last so `page` headers are
/// matched case-insensitively on the original casing.
pub struct TextNormalizer {
    bullet_regex: Regex,
    split_letters_regex: Regex,
    page_header_regex: Regex,
    disallowed_regex: Regex,
    whitespace_regex: Regex,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    pub fn new() -> Self {
        let bullet_regex = Regex::new("[•●▪■◆►◦▸➤\u{FE0F}]+")
            .expect("Invalid bullet regex");

        // "d a t a" -> "da ta": one non-overlapping pass, longer runs stay partially split
        let split_letters_regex = Regex::new(r"\b([a-zA-Z])\s+([a-zA-Z])\b")
            .expect("Invalid split letters regex");

        let page_header_regex = Regex::new(r"(?i)\bpage\s*\d+\b")
            .expect("Invalid page header regex");

        // Letters, numbers, underscore, whitespace and @ . + , / : - survive
        let disallowed_regex = Regex::new(r"[^\p{L}\p{N}_\s@.+,/:-]")
            .expect("Invalid punctuation regex");

        let whitespace_regex = Regex::new(r"\s+").expect("Invalid whitespace regex");

        Self {
            bullet_regex,
            split_letters_regex,
            page_header_regex,
            disallowed_regex,
            whitespace_regex,
        }
    }

    /// Normalize text into a single lowercase, whitespace-collapsed line.
    /// Empty input yields an empty string.
    pub fn clean(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        // Accents fold away with their base letter instead of splitting the word
        let decomposed: String = text.nfkd().filter(|c| !is_combining_mark(*c)).collect();
        let cleaned = self.bullet_regex.replace_all(&decomposed, " ");
        let cleaned = self.split_letters_regex.replace_all(&cleaned, "$1$2");
        let cleaned = self.page_header_regex.replace_all(&cleaned, " ");
        let cleaned = self.disallowed_regex.replace_all(&cleaned, " ");
        let cleaned = self.whitespace_regex.replace_all(&cleaned, " ");

        cleaned.to_lowercase().trim().to_string()
    }

    /// Normalize each physical line on its own, keeping the line structure.
    pub fn clean_lines(&self, text: &str) -> String {
        text.lines()
            .map(|line| self.clean(line))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.clean(""), "");
        assert_eq!(normalizer.clean("   \n\t "), "");
        assert_eq!(normalizer.clean_lines(""), "");
    }

    #[test]
    fn test_bullets_and_whitespace() {
        let normalizer = TextNormalizer::new();
        let text = "• Python   ● SQL\n▪ Docker ➤ AWS";

        let cleaned = normalizer.clean(text);

        assert_eq!(cleaned, "python sql docker aws");
    }

    #[test]
    fn test_split_letter_repair_is_single_pass() {
        let normalizer = TextNormalizer::new();

        assert_eq!(normalizer.clean("m l engineer"), "ml engineer");
        // Longer runs are only partially repaired
        assert_eq!(normalizer.clean("d a t a"), "da ta");
    }

    #[test]
    fn test_page_headers_removed() {
        let normalizer = TextNormalizer::new();
        let text = "Experience PAGE 2 Skills page3 python";

        let cleaned = normalizer.clean(text);

        assert_eq!(cleaned, "experience skills python");
    }

    #[test]
    fn test_keeps_emails_and_dates() {
        let normalizer = TextNormalizer::new();
        let text = "Contact: Jane.Doe+cv@Mail.com | 2019-2021 (C++, Node.js)!";

        let cleaned = normalizer.clean(text);

        assert_eq!(cleaned, "contact: jane.doe+cv@mail.com 2019-2021 c++, node.js");
    }

    #[test]
    fn test_unicode_decomposition_strips_accents() {
        let normalizer = TextNormalizer::new();

        assert_eq!(normalizer.clean("José Müller"), "jose muller");
        // Compatibility forms fold to ASCII
        assert_eq!(normalizer.clean("ｐｙｔｈｏｎ"), "python");
    }

    #[test]
    fn test_output_invariants() {
        let normalizer = TextNormalizer::new();
        let samples = [
            "  Mixed CASE\ttext\n\nwith   gaps  ",
            "►►► Arrows ◆ and ■ squares ◦",
            "ALL CAPS HEADER\r\nSecond Line",
        ];

        for sample in samples {
            let cleaned = normalizer.clean(sample);
            assert_eq!(cleaned, cleaned.to_lowercase());
            assert!(!cleaned.contains("  "));
            assert!(!cleaned.contains('\n'));
            assert_eq!(cleaned, cleaned.trim());
            assert!(!cleaned.chars().any(|c| "•●▪■◆►◦▸➤".contains(c)));
        }
    }

    #[test]
    fn test_clean_lines_preserves_structure() {
        let normalizer = TextNormalizer::new();
        let text = "Jane Doe\n\n• AWS Certified Solutions Architect\n   \nPython, SQL";

        let cleaned = normalizer.clean_lines(text);

        assert_eq!(
            cleaned,
            "jane doe\naws certified solutions architect\npython, sql"
        );
    }
}
