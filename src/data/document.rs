//! Labeled news documents

use crate::nlp::{normalize, TextStats};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ground-truth class of an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    Real,
    Fake,
}

impl Label {
    /// Both classes in report order
    pub const ALL: [Label; 2] = [Label::Real, Label::Fake];

    /// Numeric target used by the models (`Fake` is the positive class)
    pub fn as_target(self) -> f64 {
        match self {
            Label::Real => 0.0,
            Label::Fake => 1.0,
        }
    }

    /// Inverse of [`Label::as_target`]
    pub fn from_target(value: f64) -> Self {
        if value >= 0.5 {
            Label::Fake
        } else {
            Label::Real
        }
    }

    /// Row/column position in a confusion matrix
    pub fn index(self) -> usize {
        match self {
            Label::Real => 0,
            Label::Fake => 1,
        }
    }

    /// Parse a dataset label cell
    ///
    /// Accepts `real`/`fake`, `true`/`false` (true means real) and `0`/`1`
    /// (1 means fake), case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "real" | "true" | "0" => Some(Label::Real),
            "fake" | "false" | "1" => Some(Label::Fake),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Real => write!(f, "Real"),
            Label::Fake => write!(f, "Fake"),
        }
    }
}

/// One row of the input table, before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    pub title: Option<String>,
    #[serde(alias = "text")]
    pub content: Option<String>,
    pub label: Option<String>,
}

impl RawRecord {
    pub fn new(title: &str, content: &str, label: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
            label: Some(label.to_string()),
        }
    }
}

/// A validated, normalized article
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    title: String,
    content: String,
    label: Label,
    normalized_text: String,
    stats: TextStats,
}

impl Document {
    /// Build a document, deriving the normalized text and its counts
    pub fn new(title: impl Into<String>, content: impl Into<String>, label: Label) -> Self {
        let title = title.into();
        let content = content.into();
        let normalized_text = normalize(&title, &content);
        let stats = TextStats::of(&normalized_text);

        Self {
            title,
            content,
            label,
            normalized_text,
            stats,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn normalized_text(&self) -> &str {
        &self.normalized_text
    }

    pub fn word_count(&self) -> usize {
        self.stats.word_count
    }

    pub fn char_count(&self) -> usize {
        self.stats.char_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parse() {
        assert_eq!(Label::parse("Real"), Some(Label::Real));
        assert_eq!(Label::parse(" FAKE "), Some(Label::Fake));
        assert_eq!(Label::parse("1"), Some(Label::Fake));
        assert_eq!(Label::parse("true"), Some(Label::Real));
        assert_eq!(Label::parse("satire"), None);
    }

    #[test]
    fn test_label_target_round_trip() {
        for label in Label::ALL {
            assert_eq!(Label::from_target(label.as_target()), label);
        }
    }

    #[test]
    fn test_document_derives_counts() {
        let doc = Document::new("Scientists find water on Mars", "NASA confirms new evidence", Label::Real);

        assert_eq!(doc.normalized_text(), "scientists find water on mars nasa confirms new evidence");
        assert_eq!(doc.word_count(), 9);
        assert_eq!(doc.char_count(), doc.normalized_text().chars().count());
    }

    #[test]
    fn test_empty_document_is_kept() {
        let doc = Document::new("123", "!!!", Label::Fake);
        assert_eq!(doc.normalized_text(), "");
        assert_eq!(doc.word_count(), 0);
        assert_eq!(doc.char_count(), 0);
    }
}
