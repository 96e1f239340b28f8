use crate::classify::LabelSet;

/// Accumulates emitted text into what the user has typed so far.
///
/// Symbol vocabularies (fingerspelling) concatenate: `H`, `I`, ` ` give `"HI "`.
/// Word vocabularies (lip reading) are joined with single spaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    text: String,
    separate_words: bool,
}

impl Transcript {
    pub fn new(separate_words: bool) -> Self {
        Self {
            text: String::new(),
            separate_words,
        }
    }

    /// Words are separated when the label set has no space label of its own.
    pub fn for_labels(labels: &LabelSet) -> Self {
        Self::new(labels.space_index().is_none())
    }

    pub fn push(&mut self, emitted: &str) {
        if emitted.is_empty() {
            return;
        }
        if self.separate_words && !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(emitted);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_text(self) -> String {
        self.text
    }
}
