use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref YEAR: Regex = Regex::new(r"\b(\d{4})\b").unwrap();
}

/// Collapse whitespace runs to single spaces and trim the ends.
pub fn clean_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Reduce a value to printable ASCII so output artifacts stay portable.
pub fn printable(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .collect()
}

/// Keep only ASCII letters.
pub fn ascii_letters(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_alphabetic()).collect()
}

/// Find a standalone four-digit year inside a display date like "January 2004".
pub fn year_in_text(text: &str) -> Option<i32> {
    YEAR.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Stop-word list the extractor's term normalization depends on.
///
/// A missing or unreadable list is a setup-level failure: the owning process
/// exits before doing any work rather than hashing titles inconsistently.
#[derive(Debug, Clone)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    /// Load a stop-word list from a JSON array of strings.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stop-word list: {}", path.display()))?;
        let words: Vec<String> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse stop-word list: {}", path.display()))?;
        Ok(Self::from_words(words))
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(|w| w.into().to_lowercase()).collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Normalize a title into its hashable term form: lowercase, drop stop words,
/// strip each remaining word to ASCII letters, concatenate.
///
/// Both document titles and reference titles go through this function; identity
/// resolution only works if the two sides normalize identically.
pub fn hashable_terms(text: &str, stopwords: &Stopwords) -> String {
    text.split_whitespace()
        .map(|word| word.to_lowercase())
        .filter(|word| !stopwords.contains(word))
        .map(|word| ascii_letters(&word))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stopwords() -> Stopwords {
        Stopwords::from_words(["a", "an", "the", "of", "on"])
    }

    #[test]
    fn test_clean_whitespace() {
        assert_eq!(clean_whitespace("  foo \t bar\nbaz  "), "foo bar baz");
        assert_eq!(clean_whitespace(""), "");
    }

    #[test]
    fn test_printable_strips_control_and_non_ascii() {
        assert_eq!(printable("caf\u{e9} r\u{e9}sum\u{e9}\t!"), "caf rsum!");
        assert_eq!(printable("plain text"), "plain text");
    }

    #[test]
    fn test_year_in_text() {
        assert_eq!(year_in_text("January 2004"), Some(2004));
        assert_eq!(year_in_text("vol. 12, 1987, pp. 1-10"), Some(1987));
        assert_eq!(year_in_text("no year here"), None);
        // Five-digit runs are not years
        assert_eq!(year_in_text("12345"), None);
    }

    #[test]
    fn test_hashable_terms_drops_stopwords_and_punctuation() {
        let sw = stopwords();
        assert_eq!(
            hashable_terms("A Survey of Graph-Based Parsing", &sw),
            "surveygraphbasedparsing"
        );
    }

    #[test]
    fn test_hashable_terms_identical_for_styled_variants() {
        let sw = stopwords();
        let a = hashable_terms("The Theory of Parsing", &sw);
        let b = hashable_terms("theory PARSING", &sw);
        assert_eq!(a, b);
    }

    #[test]
    fn test_hashable_terms_all_stopwords_is_empty() {
        let sw = stopwords();
        assert_eq!(hashable_terms("the of an", &sw), "");
    }

    #[test]
    fn test_stopwords_case_insensitive_load() {
        let sw = Stopwords::from_words(["The"]);
        assert!(sw.contains("the"));
    }
}
