//! Text normalizer
//!
//! Turns raw title and body text into a canonical string of lowercase
//! ASCII letters separated by single spaces.

use regex::Regex;
use std::sync::LazyLock;

/// `http`, `https`, `ftp` or `www.` links through the next whitespace
static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:https?|ftp)://\S*|www\.\S*").unwrap());
static NON_LETTER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z\s]").unwrap());

/// Normalize a title and body as one document
pub fn normalize(title: &str, content: &str) -> String {
    let mut text = String::with_capacity(title.len() + content.len() + 1);
    text.push_str(title);
    text.push(' ');
    text.push_str(content);
    normalize_text(&text)
}

/// Normalize a single string
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let without_urls = URL_REGEX.replace_all(&lowered, " ");
    let letters_only = NON_LETTER_REGEX.replace_all(&without_urls, "");

    letters_only.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Length signals of a normalized text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStats {
    pub word_count: usize,
    pub char_count: usize,
}

impl TextStats {
    pub fn of(normalized: &str) -> Self {
        Self {
            word_count: normalized.split_whitespace().count(),
            char_count: normalized.chars().count(),
        }
    }
}
