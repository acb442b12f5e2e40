//! Letter knowledge accumulated from hints.

use std::collections::BTreeMap;

use wordfray_protocol::HintColor;

/// What the player knows about each letter so far.
///
/// Knowledge only improves across turns: a letter seen green stays green
/// whatever later hints say, and a gray never overwrites anything. One
/// exception: an explicit `None` hint overwrites like
/// `Green` does, even over a known green.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HintAggregator {
    known: BTreeMap<char, HintColor>,
}

impl HintAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds the hints of one submitted word in, position by position.
    ///
    /// Letters are compared case-insensitively and stored uppercase. Extra
    /// letters or colors beyond the shorter of the two are ignored.
    pub fn merge(&mut self, word: &str, colors: &[HintColor]) {
        for (letter, &color) in word.chars().zip(colors) {
            let letter = letter.to_ascii_uppercase();
            match color {
                HintColor::Yellow => {
                    if self.known.get(&letter) != Some(&HintColor::Green) {
                        self.known.insert(letter, HintColor::Yellow);
                    }
                }
                HintColor::Gray => {
                    self.known.entry(letter).or_insert(HintColor::Gray);
                }
                HintColor::Red => {}
                HintColor::Green | HintColor::None => {
                    self.known.insert(letter, color);
                }
            }
        }
    }

    pub fn get(&self, letter: char) -> Option<HintColor> {
        self.known.get(&letter.to_ascii_uppercase()).copied()
    }

    /// Every known letter, alphabetically.
    pub fn iter(&self) -> impl Iterator<Item = (char, HintColor)> + '_ {
        self.known.iter().map(|(&letter, &color)| (letter, color))
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}
