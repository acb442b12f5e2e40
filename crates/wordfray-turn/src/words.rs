//! Local word validation.

use std::collections::HashSet;

/// Decides whether a full row is a real word before it's sent.
pub trait WordChecker {
    /// `word` is uppercase and exactly one row long.
    fn is_valid(&self, word: &str) -> bool;
}

/// Accepts everything and leaves validation to the server.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl WordChecker for AcceptAll {
    fn is_valid(&self, _word: &str) -> bool {
        true
    }
}

/// A fixed dictionary.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    /// Builds a list from newline-separated text. Blank lines are skipped;
    /// words are trimmed and uppercased.
    pub fn from_lines(text: &str) -> Self {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_uppercase)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl FromIterator<String> for WordList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self { words: iter.into_iter().collect() }
    }
}

impl WordChecker for WordList {
    fn is_valid(&self, word: &str) -> bool {
        self.words.contains(&word.to_uppercase())
    }
}
