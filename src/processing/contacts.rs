//! Contact details extraction

use regex::Regex;

pub trait ContactExtractor: Send + Sync {
    /// First email address in the text
    fn primary_email(&self, text: &str) -> Option<String>;

    /// Phone numbers in order of appearance, without duplicates
    fn phone_numbers(&self, text: &str) -> Vec<String>;
}

pub struct RegexContactExtractor {
    email_regex: Regex,
    phone_regex: Regex,
}

impl Default for RegexContactExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl RegexContactExtractor {
    pub fn new() -> Self {
        let email_regex = Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
            .expect("Invalid email regex");

        // Optional country code, then a 10 digit number with common separators
        let phone_regex = Regex::new(r"(?:\+\d{1,3}[-. ]?)?\(?\d{3}\)?[-. ]?\d{3}[-. ]?\d{4}\b")
            .expect("Invalid phone regex");

        Self {
            email_regex,
            phone_regex,
        }
    }
}

impl ContactExtractor for RegexContactExtractor {
    fn primary_email(&self, text: &str) -> Option<String> {
        self.email_regex
            .find(text)
            .map(|m| m.as_str().to_string())
    }

    fn phone_numbers(&self, text: &str) -> Vec<String> {
        let mut numbers: Vec<String> = Vec::new();
        for m in self.phone_regex.find_iter(text) {
            let number = m.as_str().trim().to_string();
            if !numbers.contains(&number) {
                numbers.push(number);
            }
        }
        numbers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_email_is_first_match() {
        let extractor = RegexContactExtractor::new();
        let text = "jane.doe@mail.com, alt: jd@work.org";

        assert_eq!(extractor.primary_email(text), Some("jane.doe@mail.com".to_string()));
        assert_eq!(extractor.primary_email("no contact"), None);
    }

    #[test]
    fn test_phone_numbers_deduplicated() {
        let extractor = RegexContactExtractor::new();
        let text = "phone: +91 98765 43210 or 555-123-4567, again 555-123-4567";

        let phones = extractor.phone_numbers(text);

        assert_eq!(phones, vec!["555-123-4567".to_string()]);
    }

    #[test]
    fn test_phone_with_country_code() {
        let extractor = RegexContactExtractor::new();

        let phones = extractor.phone_numbers("call +1 555.123.4567 today");

        assert_eq!(phones, vec!["+1 555.123.4567".to_string()]);
    }
}
