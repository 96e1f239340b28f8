//! Fixed, ordered label sets. A label's index is its identity everywhere.

use serde::Serialize;

/// Symbol the sign label set uses for a word break.
pub const SPACE_SYMBOL: &str = "_";

/// Lip-reading vocabulary.
pub const LIP_WORDS: [&str; 10] = [
    "hello",
    "thank you",
    "yes",
    "no",
    "help",
    "please",
    "sorry",
    "goodbye",
    "welcome",
    "water",
];

/// An immutable, ordered list of symbol classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelSet {
    labels: Vec<String>,
    space: Option<usize>,
}

impl LabelSet {
    /// Build a label set. `space_symbol`, when present in `labels`, is emitted
    /// as a literal space.
    pub fn new(labels: Vec<String>, space_symbol: Option<&str>) -> Self {
        let space = space_symbol.and_then(|s| labels.iter().position(|l| l == s));
        Self { labels, space }
    }

    /// Fingerspelling labels: `0-9`, `A-Z`, then `_` for space.
    pub fn sign() -> Self {
        let labels = ('0'..='9')
            .chain('A'..='Z')
            .map(String::from)
            .chain(std::iter::once(SPACE_SYMBOL.to_string()))
            .collect();
        Self::new(labels, Some(SPACE_SYMBOL))
    }

    /// Lip-reading word labels.
    pub fn lip() -> Self {
        Self::new(LIP_WORDS.iter().map(|w| w.to_string()).collect(), None)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Display symbol for a label.
    pub fn symbol(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Text inserted downstream when the label is emitted.
    pub fn text_for(&self, index: usize) -> Option<&str> {
        if Some(index) == self.space {
            return Some(" ");
        }
        self.symbol(index)
    }

    pub fn index_of(&self, symbol: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == symbol)
    }

    pub fn space_index(&self) -> Option<usize> {
        self.space
    }

    pub fn is_space(&self, index: usize) -> bool {
        Some(index) == self.space
    }

    /// True for single ASCII digit labels.
    pub fn is_digit(&self, index: usize) -> bool {
        self.single_char(index)
            .is_some_and(|c| c.is_ascii_digit())
    }

    /// True for single ASCII letter labels.
    pub fn is_letter(&self, index: usize) -> bool {
        self.single_char(index)
            .is_some_and(|c| c.is_ascii_alphabetic())
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.labels.iter().map(String::as_str).enumerate()
    }

    fn single_char(&self, index: usize) -> Option<char> {
        let mut chars = self.symbol(index)?.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_labels_layout() {
        let labels = LabelSet::sign();
        assert_eq!(labels.len(), 37);
        assert_eq!(labels.symbol(0), Some("0"));
        assert_eq!(labels.symbol(9), Some("9"));
        assert_eq!(labels.symbol(10), Some("A"));
        assert_eq!(labels.symbol(35), Some("Z"));
        assert_eq!(labels.symbol(36), Some("_"));
        assert_eq!(labels.space_index(), Some(36));
    }

    #[test]
    fn test_space_text_is_blank() {
        let labels = LabelSet::sign();
        assert_eq!(labels.text_for(36), Some(" "));
        assert_eq!(labels.text_for(10), Some("A"));
        assert_eq!(labels.text_for(99), None);
    }

    #[test]
    fn test_digit_and_letter_classes() {
        let labels = LabelSet::sign();
        assert!(labels.is_digit(3));
        assert!(!labels.is_digit(12));
        assert!(labels.is_letter(12));
        assert!(!labels.is_letter(36));
        assert!(!labels.is_digit(36));
    }

    #[test]
    fn test_lip_labels_have_no_space() {
        let labels = LabelSet::lip();
        assert_eq!(labels.len(), 10);
        assert_eq!(labels.space_index(), None);
        assert_eq!(labels.index_of("thank you"), Some(1));
        assert!(!labels.is_letter(2));
    }

    #[test]
    fn test_unknown_space_symbol_is_ignored() {
        let labels = LabelSet::new(vec!["a".into(), "b".into()], Some("_"));
        assert_eq!(labels.space_index(), None);
    }
}
